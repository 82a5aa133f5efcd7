use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "1.0.0",
        description = r#"
# Catalog API

Product and vehicle catalog with categories, brands and subcategories.

## Generated codes

Products and vehicles receive an immutable code on creation, built from the
first two letters of the item, category and brand names plus a per-prefix
sequence number, e.g. `TAAMMA-3`. Any code sent by the client is ignored on
create and rejected on update.

## Error Handling

Errors share one body shape:

```json
{
  "error": "Bad Request",
  "message": "El nombre es obligatorio.",
  "request_id": "b7c1...",
  "timestamp": "2025-01-01T00:00:00Z"
}
```
        "#
    ),
    servers(
        (url = "http://localhost:4002", description = "Local development")
    ),
    tags(
        (name = "Productos", description = "Product catalog endpoints"),
        (name = "Vehiculos", description = "Vehicle catalog endpoints"),
        (name = "Categorias", description = "Category endpoints"),
        (name = "Marcas", description = "Brand endpoints"),
        (name = "Subcategorias", description = "Subcategory endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::change_product_estado,

        // Vehicles
        crate::handlers::vehicles::list_vehicles,
        crate::handlers::vehicles::get_vehicle,
        crate::handlers::vehicles::create_vehicle,
        crate::handlers::vehicles::update_vehicle,
        crate::handlers::vehicles::delete_vehicle,
        crate::handlers::vehicles::change_vehicle_estado,

        // Categories
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::categories::change_category_estado,

        // Brands
        crate::handlers::brands::list_brands,
        crate::handlers::brands::get_brand,
        crate::handlers::brands::create_brand,
        crate::handlers::brands::update_brand,
        crate::handlers::brands::delete_brand,
        crate::handlers::brands::change_brand_estado,

        // Subcategories
        crate::handlers::subcategories::list_subcategories,
        crate::handlers::subcategories::get_subcategory,
        crate::handlers::subcategories::create_subcategory,
        crate::handlers::subcategories::update_subcategory,
        crate::handlers::subcategories::delete_subcategory,
        crate::handlers::subcategories::change_subcategory_estado,

        // Health
        crate::handlers::health::health_check,
        crate::handlers::health::api_status,
    ),
    components(
        schemas(
            crate::entities::product::Model,
            crate::entities::vehicle::Model,
            crate::entities::category::Model,
            crate::entities::brand::Model,
            crate::entities::subcategory::Model,

            crate::services::products::CreateProductInput,
            crate::services::products::UpdateProductInput,
            crate::services::vehicles::CreateVehicleInput,
            crate::services::vehicles::UpdateVehicleInput,
            crate::services::categories::CreateCategoryInput,
            crate::services::categories::UpdateCategoryInput,
            crate::services::brands::CreateBrandInput,
            crate::services::brands::UpdateBrandInput,
            crate::services::subcategories::CreateSubcategoryInput,
            crate::services::subcategories::UpdateSubcategoryInput,

            crate::handlers::common::EstadoRequest,
            crate::handlers::common::MessageResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::StatusResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
