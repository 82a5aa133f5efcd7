//! Catalog API Library
//!
//! Products, vehicles and their lookup collections (categories, brands,
//! subcategories) behind a JSON HTTP surface. Products and vehicles receive a
//! generated, immutable code on creation.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{http::HeaderValue, Router};
use sea_orm::DatabaseConnection;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::config::{AppConfig, AppConfigError};
use crate::services::CatalogServices;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub services: CatalogServices,
}

impl AppState {
    /// Wires every service around one shared connection pool.
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Self {
        let services = CatalogServices::new(db.clone(), config.code_generation_max_attempts);
        Self {
            db,
            config,
            services,
        }
    }
}

/// Catalog collections, mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/productos", handlers::products::products_routes())
        .nest("/vehiculos", handlers::vehicles::vehicles_routes())
        .nest("/categorias", handlers::categories::categories_routes())
        .nest("/marcas", handlers::brands::brands_routes())
        .nest("/subcategorias", handlers::subcategories::subcategories_routes())
}

/// Builds the CORS layer from configuration.
///
/// Explicit origins win; otherwise permissive CORS is only allowed in
/// development or when explicitly enabled.
pub fn cors_layer(cfg: &AppConfig) -> Result<CorsLayer, AppConfigError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        let layer = CorsLayer::new().allow_origin(origins);
        // Wildcard methods/headers are rejected by tower-http alongside credentials.
        return Ok(if cfg.cors_allow_credentials {
            layer
                .allow_methods(tower_http::cors::AllowMethods::mirror_request())
                .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
                .allow_credentials(true)
        } else {
            layer.allow_methods(Any).allow_headers(Any)
        });
    }

    if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        return Ok(CorsLayer::permissive());
    }

    ::tracing::error!("Missing CORS configuration detected; set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true");
    Err(AppConfigError::Cors(
        "set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true".to_string(),
    ))
}

/// Full application router: catalog API, health/status and Swagger UI,
/// wrapped in request-id, tracing, timeout and CORS layers.
pub fn build_router(state: AppState) -> Result<Router, AppConfigError> {
    let cors = cors_layer(&state.config)?;
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Ok(Router::<AppState>::new()
        .nest("/api", api_routes())
        .merge(handlers::health::health_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state))
}

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::db::DbPool;
    pub use crate::errors::{ErrorResponse, ServiceError};
    pub use crate::services::CatalogServices;
    pub use crate::{build_router, AppState};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: &str) -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            0,
            environment.into(),
        )
    }

    #[test]
    fn production_without_origins_is_rejected() {
        assert!(matches!(
            cors_layer(&config("production")),
            Err(AppConfigError::Cors(_))
        ));
    }

    #[test]
    fn explicit_origins_are_accepted_with_credentials() {
        let mut cfg = config("production");
        cfg.cors_allowed_origins = Some("https://catalogo.example, ".into());
        cfg.cors_allow_credentials = true;
        assert!(cors_layer(&cfg).is_ok());
    }

    #[test]
    fn development_falls_back_to_permissive() {
        assert!(cors_layer(&config("development")).is_ok());
    }
}
