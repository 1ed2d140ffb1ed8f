use crate::api::{AdminUser, AppState};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

/// GET /admin/metrics
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || {
            (
                StatusCode::NOT_FOUND,
                "Metrics not enabled or failed to initialize".to_string(),
            )
        },
        |handle| (StatusCode::OK, handle.render()),
    )
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().path().to_string();

    let matched_path = req
        .extensions()
        .get::<axum::extract::MatchedPath>()
        .map(|mp| mp.as_str().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %uri,
        route = matched_path.clone(),
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let status = response.status().as_u16();

        // Matched route keeps label cardinality bounded.
        let metrics_path = matched_path.as_deref().unwrap_or(&uri);

        let labels = [
            ("method", method.clone()),
            ("path", metrics_path.to_string()),
            ("status", status.to_string()),
        ];

        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = duration_ms,
            status_code = status,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Response headers shared by every page.
#[derive(Clone)]
pub struct SecurityHeaders {
    csp: HeaderValue,
}

impl SecurityHeaders {
    /// `script_sources` are extra origins allowed to serve scripts, such as
    /// the CDN of the charting library.
    pub fn new(script_sources: &[String]) -> anyhow::Result<Self> {
        let policy = content_security_policy(script_sources);
        let csp = HeaderValue::from_str(&policy)
            .map_err(|e| anyhow::anyhow!("Invalid Content-Security-Policy {policy:?}: {e}"))?;
        Ok(Self { csp })
    }
}

fn content_security_policy(script_sources: &[String]) -> String {
    let mut script_src = String::from("'self'");
    for source in script_sources {
        script_src.push(' ');
        script_src.push_str(source);
    }

    format!(
        "default-src 'self'; script-src {script_src}; style-src 'self' 'unsafe-inline'; \
         frame-ancestors 'none'; base-uri 'self'; form-action 'self'"
    )
}

pub async fn security_headers_middleware(
    State(security): State<SecurityHeaders>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert("content-security-policy", security.csp);

    response
}
