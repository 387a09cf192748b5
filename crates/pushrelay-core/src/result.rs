//! Convenience result type alias for PushRelay.

use crate::error::AppError;

/// A specialized `Result` type for PushRelay operations.
pub type AppResult<T> = Result<T, AppError>;
