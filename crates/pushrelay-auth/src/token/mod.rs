//! Push token creation and verification.

pub mod claims;
pub mod codec;

pub use claims::PushClaims;
pub use codec::TokenCodec;
