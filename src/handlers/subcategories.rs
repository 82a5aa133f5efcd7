use crate::{
    entities::subcategory,
    errors::ServiceError,
    handlers::common::{
        created_response, message_response, success_response, EstadoRequest, IdPath, JsonBody,
        MessageResponse,
    },
    services::subcategories::{CreateSubcategoryInput, UpdateSubcategoryInput},
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use uuid::Uuid;

/// Creates the router for subcategory endpoints
pub fn subcategories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subcategories).post(create_subcategory))
        .route(
            "/:id",
            get(get_subcategory)
                .put(update_subcategory)
                .delete(delete_subcategory),
        )
        .route("/:id/estado", patch(change_subcategory_estado))
}

#[utoipa::path(
    get,
    path = "/api/subcategorias",
    responses((status = 200, description = "Subcategories", body = [subcategory::Model])),
    tag = "Subcategorias"
)]
pub async fn list_subcategories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.subcategories.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/subcategorias/{id}",
    params(("id" = Uuid, Path, description = "Subcategory id")),
    responses(
        (status = 200, description = "Subcategory", body = subcategory::Model),
        (status = 404, description = "Subcategory not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategorias"
)]
pub async fn get_subcategory(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.subcategories.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/subcategorias",
    request_body = CreateSubcategoryInput,
    responses(
        (status = 201, description = "Subcategory created", body = subcategory::Model),
        (status = 400, description = "Missing or duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategorias"
)]
pub async fn create_subcategory(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateSubcategoryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let subcategory = state.services.subcategories.create(payload).await?;
    Ok(created_response(subcategory))
}

#[utoipa::path(
    put,
    path = "/api/subcategorias/{id}",
    params(("id" = Uuid, Path, description = "Subcategory id")),
    request_body = UpdateSubcategoryInput,
    responses(
        (status = 200, description = "Subcategory updated", body = subcategory::Model),
        (status = 400, description = "Invalid or duplicate name", body = crate::errors::ErrorResponse),
        (status = 404, description = "Subcategory not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategorias"
)]
pub async fn update_subcategory(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateSubcategoryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let subcategory = state.services.subcategories.update(id, payload).await?;
    Ok(success_response(subcategory))
}

#[utoipa::path(
    delete,
    path = "/api/subcategorias/{id}",
    params(("id" = Uuid, Path, description = "Subcategory id")),
    responses(
        (status = 200, description = "Subcategory deleted", body = MessageResponse),
        (status = 404, description = "Subcategory not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategorias"
)]
pub async fn delete_subcategory(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.subcategories.delete(id).await?;
    Ok(message_response("Subcategoría eliminada correctamente"))
}

/// Activate or deactivate a subcategory; `estado` must be a JSON boolean
#[utoipa::path(
    patch,
    path = "/api/subcategorias/{id}/estado",
    params(("id" = Uuid, Path, description = "Subcategory id")),
    request_body = EstadoRequest,
    responses(
        (status = 200, description = "State changed", body = subcategory::Model),
        (status = 400, description = "Estado is not a boolean", body = crate::errors::ErrorResponse),
        (status = 404, description = "Subcategory not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Subcategorias"
)]
pub async fn change_subcategory_estado(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<EstadoRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let estado = payload.strict()?;
    Ok(success_response(
        state.services.subcategories.set_active(id, estado).await?,
    ))
}
