use crate::{
    entities::vehicle,
    errors::ServiceError,
    handlers::common::{
        created_response, message_response, success_response, EstadoRequest, IdPath, JsonBody,
        MessageResponse,
    },
    services::vehicles::{CreateVehicleInput, UpdateVehicleInput},
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use uuid::Uuid;

/// Creates the router for vehicle endpoints
pub fn vehicles_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/:id/estado", patch(change_vehicle_estado))
}

#[utoipa::path(
    get,
    path = "/api/vehiculos",
    responses(
        (status = 200, description = "Vehicles", body = [vehicle::Model]),
        (status = 500, description = "Store failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Vehiculos"
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.vehicles.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/vehiculos/{id}",
    params(("id" = Uuid, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "Vehicle", body = vehicle::Model),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Vehiculos"
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(state.services.vehicles.get(id).await?))
}

/// Create a vehicle; `codigovehic` is always generated server-side
#[utoipa::path(
    post,
    path = "/api/vehiculos",
    request_body = CreateVehicleInput,
    responses(
        (status = 201, description = "Vehicle created", body = vehicle::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code could not be reserved", body = crate::errors::ErrorResponse),
        (status = 500, description = "Referenced category or brand missing", body = crate::errors::ErrorResponse)
    ),
    tag = "Vehiculos"
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateVehicleInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let vehicle = state.services.vehicles.create(payload).await?;
    Ok(created_response(vehicle))
}

#[utoipa::path(
    put,
    path = "/api/vehiculos/{id}",
    params(("id" = Uuid, Path, description = "Vehicle id")),
    request_body = UpdateVehicleInput,
    responses(
        (status = 200, description = "Vehicle updated", body = vehicle::Model),
        (status = 400, description = "Invalid payload or code change attempted", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Vehiculos"
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<UpdateVehicleInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let vehicle = state.services.vehicles.update(id, payload).await?;
    Ok(success_response(vehicle))
}

#[utoipa::path(
    delete,
    path = "/api/vehiculos/{id}",
    params(("id" = Uuid, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "Vehicle deleted", body = MessageResponse),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Vehiculos"
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.vehicles.delete(id).await?;
    Ok(message_response("Vehículo eliminado correctamente"))
}

/// Activate or deactivate a vehicle; any present `estado` is coerced
#[utoipa::path(
    patch,
    path = "/api/vehiculos/{id}/estado",
    params(("id" = Uuid, Path, description = "Vehicle id")),
    request_body = EstadoRequest,
    responses(
        (status = 200, description = "State changed", body = vehicle::Model),
        (status = 400, description = "Estado missing", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Vehiculos"
)]
pub async fn change_vehicle_estado(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    JsonBody(payload): JsonBody<EstadoRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let estado = payload.loose()?;
    Ok(success_response(
        state.services.vehicles.set_active(id, estado).await?,
    ))
}
