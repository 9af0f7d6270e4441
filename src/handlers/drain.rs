//! Log drain webhook handler
//!
//! The response contract is fixed: 200 OK with body "OK" for every delivery,
//! whatever happened inside the pipeline. Vercel retries non-200 responses
//! aggressively, so surfacing internal failures here would turn one bad
//! delivery into a redelivery storm. Outcomes are visible in logs only.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::AppState;

const SIGNATURE_HEADER: &str = "x-vercel-signature";
const VERIFY_HEADER: &str = "x-vercel-verify";

/// Accept one drain delivery.
///
/// The body is consumed as raw bytes before any parsing, so signature
/// verification sees exactly what was sent on the wire. The verification
/// token header rides on every response; Vercel checks it once when the
/// drain endpoint is registered.
pub async fn ingest(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let report = state.ingestor.process(&body, signature).await;
    tracing::debug!(
        accepted = report.accepted,
        received = report.received,
        parse_failures = report.parse_failures,
        inserted = report.inserted,
        "drain delivery acknowledged"
    );

    (
        StatusCode::OK,
        [(VERIFY_HEADER, state.config.verify_token.clone())],
        "OK",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::error::SinkError;
    use crate::logic::pipeline::Ingestor;
    use crate::models::BotLogRow;
    use crate::sink::BotLogSink;
    use crate::{create_router, AppState};

    struct NullSink;

    #[async_trait]
    impl BotLogSink for NullSink {
        async fn insert_batch(&self, _rows: &[BotLogRow]) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn test_state() -> AppState {
        let config = Config {
            port: 0,
            gcp_project: "test-project".to_string(),
            dataset_id: "bot_traffic".to_string(),
            table_id: "bot_logs".to_string(),
            drain_secret: "drain-secret".to_string(),
            verify_token: "verify-me".to_string(),
            timezone: chrono_tz::America::Vancouver,
            bigquery_access_token: None,
        };
        let ingestor = Arc::new(Ingestor::new(
            Arc::new(NullSink),
            config.drain_secret.clone(),
            config.timezone,
        ));
        AppState { config, ingestor }
    }

    async fn post_drain(body: &str, signature: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder().method("POST").uri("/api/v1/drain");
        if let Some(sig) = signature {
            request = request.header(SIGNATURE_HEADER, sig);
        }
        create_router(test_state())
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_drain_acknowledges_with_verify_header() {
        let response = post_drain("", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(VERIFY_HEADER).unwrap(),
            "verify-me"
        );

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_drain_returns_200_even_for_bad_signature_and_garbage() {
        let response = post_drain("definitely not ndjson", Some("deadbeef")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }
}
