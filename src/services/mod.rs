// Catalog services
pub mod brands;
pub mod categories;
pub mod products;
pub mod subcategories;
pub mod vehicles;

// Product/vehicle code issuance
pub mod code_generator;
// Store flow shared by products and vehicles
pub mod coded_items;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Every catalog service, built once at start-up around the shared pool.
#[derive(Clone)]
pub struct CatalogServices {
    pub categories: categories::CategoryService,
    pub brands: brands::BrandService,
    pub subcategories: subcategories::SubcategoryService,
    pub products: products::ProductService,
    pub vehicles: vehicles::VehicleService,
}

impl CatalogServices {
    pub fn new(db: Arc<DatabaseConnection>, max_code_attempts: u32) -> Self {
        Self {
            categories: categories::CategoryService::new(db.clone()),
            brands: brands::BrandService::new(db.clone()),
            subcategories: subcategories::SubcategoryService::new(db.clone()),
            products: products::ProductService::new(db.clone(), max_code_attempts),
            vehicles: vehicles::VehicleService::new(db, max_code_attempts),
        }
    }
}
