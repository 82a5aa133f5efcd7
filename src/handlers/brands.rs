use crate::{
    entities::brand,
    errors::ServiceError,
    handlers::common::{
        created_response, message_response, success_response, EstadoRequest, IdPath, JsonBody,
        MessageResponse,
    },
    services::brands::{CreateBrandInput, UpdateBrandInput},
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use uuid::Uuid;

/// Creates the router for brand endpoints
pub fn brands_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/:id", get(get_brand).put(update_brand).delete(delete_brand))
        .route("/:id/estado", patch(change_brand_estado))
}

#[utoipa::path(
    get,
    path = "/api/marcas",
    responses((status = 200, description = "Brands", body = [brand::Model])),
    tag = "Marcas"
)]
pub async fn list_brands(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.brands.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/marcas/{id}",
    params(("id" = Uuid, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand", body = brand::Model),
        (status = 404, description = "Brand not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn get_brand(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.brands.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/marcas",
    request_body = CreateBrandInput,
    responses(
        (status = 201, description = "Brand created", body = brand::Model),
        (status = 400, description = "Missing or duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateBrandInput>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(created_response(state.services.brands.create(payload).await?))
}

#[utoipa::path(
    put,
    path = "/api/marcas/{id}",
    params(("id" = Uuid, Path, description = "Brand id")),
    request_body = UpdateBrandInput,
    responses(
        (status = 200, description = "Brand updated", body = brand::Model),
        (status = 400, description = "Invalid or duplicate name", body = crate::errors::ErrorResponse),
        (status = 404, description = "Brand not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn update_brand(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateBrandInput>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(
        state.services.brands.update(id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/marcas/{id}",
    params(("id" = Uuid, Path, description = "Brand id")),
    responses(
        (status = 200, description = "Brand deleted", body = MessageResponse),
        (status = 404, description = "Brand not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.brands.delete(id).await?;
    Ok(message_response("Marca eliminada correctamente"))
}

#[utoipa::path(
    patch,
    path = "/api/marcas/{id}/estado",
    params(("id" = Uuid, Path, description = "Brand id")),
    request_body = EstadoRequest,
    responses(
        (status = 200, description = "State changed", body = brand::Model),
        (status = 400, description = "Estado missing", body = crate::errors::ErrorResponse),
        (status = 404, description = "Brand not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn change_brand_estado(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<EstadoRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let estado = payload.loose()?;
    Ok(success_response(
        state.services.brands.set_active(id, estado).await?,
    ))
}
