//! Authentication and Authorization Module
//!
//! Handles JWT token generation/validation and auth middleware

mod extractor;
mod jwt;
mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{CurrentUserExt, require_admin, require_auth};
