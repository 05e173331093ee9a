//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `ASTRO_ENABLE_SWAGGER=false`)
//! - Liveness and readiness checks
//! - Object listing, statistics and `/analysis` routes
//! - `/admin` routes (optionally protected by bearer token)

mod admin;
mod analysis;
pub mod doc;
mod health;
mod objects;

use crate::middleware::{cors, trace};
use crate::state::AppState;
use axum::{Router, middleware};
use std::sync::Arc;
use utoipa_swagger_ui::SwaggerUi;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .merge(objects::router())
        .nest("/analysis", analysis::router())
        .nest("/admin", admin::router(state.clone()));

    let mut app = Router::new().merge(api_router);

    // Enabled by default; disable with ASTRO_ENABLE_SWAGGER=false.
    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(cors::cors_layer(&state))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use uuid::Uuid;

    use crate::middleware::trace::{X_PROCESS_TIME, X_REQUEST_ID, X_TRACE_ID};
    use crate::test_support::{TestApp, get};

    #[tokio::test]
    async fn every_response_carries_a_trace_id() {
        let app = TestApp::with_sample_rows();
        for uri in ["/health", "/objects?page=0", "/nope"] {
            let (_, headers, _) = app.send(get(uri)).await;
            let id = headers.get(X_TRACE_ID).expect("trace id header");
            assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok(), "{uri}");
        }
    }

    #[tokio::test]
    async fn incoming_trace_id_is_reused() {
        let app = TestApp::with_sample_rows();
        let id = Uuid::new_v4().to_string();
        let (_, headers, _) = app.send(get("/health").header(X_TRACE_ID, id.as_str())).await;
        assert_eq!(headers[X_TRACE_ID], id.as_str());
    }

    #[tokio::test]
    async fn request_id_is_echoed_with_process_time() {
        let app = TestApp::with_sample_rows();
        let (_, headers, _) = app
            .send(get("/health").header(X_REQUEST_ID, "client-req-42"))
            .await;
        assert_eq!(headers[X_REQUEST_ID], "client-req-42");
        let elapsed = headers[X_PROCESS_TIME].to_str().unwrap();
        assert!(elapsed.ends_with("ms"), "{elapsed}");
        assert!(elapsed.trim_end_matches("ms").parse::<f64>().is_ok(), "{elapsed}");
    }

    #[tokio::test]
    async fn request_id_defaults_to_trace_id() {
        let app = TestApp::with_sample_rows();
        let (_, headers, _) = app.send(get("/health")).await;
        assert_eq!(headers[X_REQUEST_ID], headers[X_TRACE_ID]);
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let app = TestApp::with_sample_rows();
        let (status, _, body) = app.send(get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        for path in ["/objects", "/stats", "/ready", "/analysis/spectral-breakdown", "/admin/dataset/refresh"] {
            assert!(body["paths"][path].is_object(), "{path} missing");
        }
    }

    #[tokio::test]
    async fn swagger_can_be_disabled() {
        let app = TestApp::builder().swagger(false).build();
        let (status, _, _) = app.send(get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
