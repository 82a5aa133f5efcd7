use crate::{
    entities::category,
    errors::ServiceError,
    handlers::common::{
        created_response, message_response, success_response, EstadoRequest, IdPath, JsonBody,
        MessageResponse,
    },
    services::categories::{CreateCategoryInput, UpdateCategoryInput},
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use uuid::Uuid;

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/:id/estado", patch(change_category_estado))
}

/// List categories by name
#[utoipa::path(
    get,
    path = "/api/categorias",
    responses((status = 200, description = "Categories", body = [category::Model])),
    tag = "Categorias"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.categories.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/categorias/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = category::Model),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categorias"
)]
pub async fn get_category(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.categories.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/categorias",
    request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Category created", body = category::Model),
        (status = 400, description = "Missing or duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "Categorias"
)]
pub async fn create_category(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCategoryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.categories.create(payload).await?;
    Ok(created_response(category))
}

#[utoipa::path(
    put,
    path = "/api/categorias/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateCategoryInput,
    responses(
        (status = 200, description = "Category updated", body = category::Model),
        (status = 400, description = "Invalid or duplicate name", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categorias"
)]
pub async fn update_category(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateCategoryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = state.services.categories.update(id, payload).await?;
    Ok(success_response(category))
}

#[utoipa::path(
    delete,
    path = "/api/categorias/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categorias"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.categories.delete(id).await?;
    Ok(message_response("Categoría eliminada correctamente"))
}

#[utoipa::path(
    patch,
    path = "/api/categorias/{id}/estado",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = EstadoRequest,
    responses(
        (status = 200, description = "State changed", body = category::Model),
        (status = 400, description = "Estado missing", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categorias"
)]
pub async fn change_category_estado(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<EstadoRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let estado = payload.loose()?;
    Ok(success_response(
        state.services.categories.set_active(id, estado).await?,
    ))
}
