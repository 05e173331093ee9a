use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";
pub static X_REQUEST_ID: &str = "x-request-id";
pub static X_PROCESS_TIME: &str = "x-process-time";

/// Tag each request with a trace id (reused from the caller when it is a
/// valid UUID) and log its start, status and latency inside one span.
///
/// Callers that correlate by `x-request-id` get their value echoed back, or
/// the trace id when they sent none. `x-process-time` reports handler time
/// as `"<ms>ms"`.
pub async fn trace_middleware(mut req: Request, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);
    // A hyphenated UUID is always a valid header value.
    let trace_header = HeaderValue::from_str(&trace_id.to_string()).ok();
    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .filter(|v| !v.is_empty())
        .cloned()
        .or_else(|| trace_header.clone());

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = request_id.as_ref().and_then(|v| v.to_str().ok()).unwrap_or_default(),
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        if let Some(value) = &trace_header {
            req.headers_mut().insert(X_TRACE_ID, value.clone());
        }

        let mut response = next.run(req).await;

        let latency = start_time.elapsed();
        let headers = response.headers_mut();
        if let Some(value) = trace_header {
            headers.insert(X_TRACE_ID, value);
        }
        if let Some(value) = request_id {
            headers.insert(X_REQUEST_ID, value);
        }
        let process_time = format!("{:.2}ms", latency.as_secs_f64() * 1000.0);
        if let Ok(value) = HeaderValue::from_str(&process_time) {
            headers.insert(X_PROCESS_TIME, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = latency.as_millis(),
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}
