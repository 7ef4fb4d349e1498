//! Convenience result type alias for Wolverine House.

use crate::error::AppError;

/// A specialized `Result` type for Wolverine operations.
pub type AppResult<T> = Result<T, AppError>;
