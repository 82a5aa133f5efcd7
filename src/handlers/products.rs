use crate::{
    entities::product,
    errors::ServiceError,
    handlers::common::{
        created_response, message_response, success_response, EstadoRequest, IdPath, JsonBody,
        MessageResponse,
    },
    services::products::{CreateProductInput, UpdateProductInput},
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use uuid::Uuid;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/estado", patch(change_product_estado))
}

/// List every product, oldest first
#[utoipa::path(
    get,
    path = "/api/productos",
    responses(
        (status = 200, description = "Products", body = [product::Model]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Productos"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.products.list().await?;
    Ok(success_response(products))
}

/// Fetch one product
#[utoipa::path(
    get,
    path = "/api/productos/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = product::Model),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Productos"
)]
pub async fn get_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.get(id).await?;
    Ok(success_response(product))
}

/// Create a product; `codigoprod` is always generated server-side
#[utoipa::path(
    post,
    path = "/api/productos",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = product::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code could not be reserved", body = crate::errors::ErrorResponse),
        (status = 500, description = "Referenced category or brand missing", body = crate::errors::ErrorResponse)
    ),
    tag = "Productos"
)]
pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.create(payload).await?;
    Ok(created_response(product))
}

/// Partially update a product
#[utoipa::path(
    put,
    path = "/api/productos/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated", body = product::Model),
        (status = 400, description = "Invalid payload or code change attempted", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Productos"
)]
pub async fn update_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.update(id, payload).await?;
    Ok(success_response(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/productos/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Productos"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(message_response("Producto eliminado correctamente"))
}

/// Activate or deactivate a product; `estado` must be a JSON boolean
#[utoipa::path(
    patch,
    path = "/api/productos/{id}/estado",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = EstadoRequest,
    responses(
        (status = 200, description = "State changed", body = product::Model),
        (status = 400, description = "Estado is not a boolean", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Productos"
)]
pub async fn change_product_estado(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<EstadoRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let estado = payload.strict()?;
    let product = state.services.products.set_active(id, estado).await?;
    Ok(success_response(product))
}
