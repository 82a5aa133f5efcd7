//! SeaORM entities for the catalog tables.
//!
//! Rust field names are English; table, column and JSON names are the
//! lower-case Spanish ones the catalog API has always exposed.

pub mod brand;
pub mod category;
pub mod product;
pub mod subcategory;
pub mod vehicle;
