//! Shared types for the Bloom storefront
//!
//! Error codes, error types, and the unified API response envelope used
//! by the server and any future client crates.

pub mod error;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, InvalidErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
