//! # pushrelay-core
//!
//! Core crate for PushRelay. Contains the configuration schemas,
//! the pub/sub backend trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other PushRelay crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
