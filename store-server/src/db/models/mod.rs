//! Database Models

// Serde helpers
pub mod serde_helpers;

// Accounts
pub mod user;

// Catalog
pub mod product;

// Orders
pub mod order;

// Re-exports
pub use user::{User, UserCreate, UserId, UserRole, UserUpdate};
pub use product::{Product, ProductCreate, ProductId, ProductStatus, ProductUpdate};
pub use order::{Order, OrderCreate, OrderId, OrderItem, OrderStatus, PaymentMethod};
