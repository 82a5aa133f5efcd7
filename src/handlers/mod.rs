pub mod brands;
pub mod categories;
pub mod common;
pub mod health;
pub mod products;
pub mod subcategories;
pub mod vehicles;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
