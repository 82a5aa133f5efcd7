#![allow(dead_code)]

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use catalog_api::{config::AppConfig, db, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper harness for spinning up the full router backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        // One connection so every request sees the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.cors_allowed_origins = Some("http://localhost:3000".to_string());

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(std::sync::Arc::new(pool), cfg);
        let router = catalog_api::build_router(state.clone()).expect("router builds");

        Self { router, state }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a request and decode the JSON response, returning status and body.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status().as_u16();
        (status, response_json(response).await)
    }

    /// Creates a category and brand and returns their ids.
    pub async fn seed_lookups(&self, category: &str, brand: &str) -> (String, String) {
        let (status, category) = self
            .json(
                Method::POST,
                "/api/categorias",
                Some(json!({ "nombre": category })),
            )
            .await;
        assert_eq!(status, 201, "seed category: {category}");
        let (status, brand) = self
            .json(Method::POST, "/api/marcas", Some(json!({ "nombre": brand })))
            .await;
        assert_eq!(status, 201, "seed brand: {brand}");

        (
            category["idcategoria"].as_str().expect("category id").to_string(),
            brand["idmarca"].as_str().expect("brand id").to_string(),
        )
    }

    /// Creates a subcategory and returns its id.
    pub async fn seed_subcategory(&self, name: &str) -> String {
        let (status, subcategory) = self
            .json(
                Method::POST,
                "/api/subcategorias",
                Some(json!({ "nombre": name })),
            )
            .await;
        assert_eq!(status, 201, "seed subcategory: {subcategory}");
        subcategory["idsubcategoria"]
            .as_str()
            .expect("subcategory id")
            .to_string()
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json response")
}
