use crate::{
    common::{coerce_estado, deserialize_present},
    errors::ServiceError,
};
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Confirmation body returned by delete endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Producto eliminado correctamente")]
    pub message: String,
}

pub fn message_response(message: impl Into<String>) -> Response {
    success_response(MessageResponse {
        message: message.into(),
    })
}

/// `Json` extractor whose rejections use the service error body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ServiceError {
    ServiceError::ValidationError(format!("Cuerpo JSON inválido: {}", rejection.body_text()))
}

/// `/:id` segment parsed as a UUID; a malformed id gets the service error body.
pub struct IdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<Uuid>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(IdPath(id)),
            Err(rejection) => Err(path_rejection_to_error(rejection)),
        }
    }
}

fn path_rejection_to_error(rejection: PathRejection) -> ServiceError {
    ServiceError::ValidationError(format!("Identificador inválido: {}", rejection.body_text()))
}

/// Body of every `PATCH /:id/estado` endpoint
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EstadoRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = bool)]
    pub estado: Option<Value>,
}

impl EstadoRequest {
    /// Requires a JSON boolean.
    pub fn strict(&self) -> Result<bool, ServiceError> {
        match self.estado {
            Some(Value::Bool(estado)) => Ok(estado),
            _ => Err(ServiceError::ValidationError(
                "El estado debe ser boolean (true/false).".into(),
            )),
        }
    }

    /// Accepts any present value and coerces it.
    pub fn loose(&self) -> Result<bool, ServiceError> {
        self.estado.as_ref().map(coerce_estado).ok_or_else(|| {
            ServiceError::ValidationError("El campo 'estado' es obligatorio.".into())
        })
    }
}
