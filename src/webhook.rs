//! HTTP surface of the webhook service

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::handler::EventHandler;
use crate::signature::{self, SIGNATURE_HEADER};
use crate::types::WebhookRequest;

pub const HEALTH_TEXT: &str = "LINE Bot is running! (Dainichi Kerosene Heater)";

#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<EventHandler>,
    pub channel_secret: Arc<str>,
}

impl AppState {
    pub fn new(handler: EventHandler, channel_secret: &str) -> Self {
        Self {
            handler: Arc::new(handler),
            channel_secret: Arc::from(channel_secret),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/webhook", get(health_check).post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    HEALTH_TEXT
}

async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
    if let Err(e) = signature::verify(&state.channel_secret, &body, signature) {
        warn!("Rejected webhook: {}", e);
        let status = match e {
            Error::MissingSignature => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNAUTHORIZED,
        };
        return status.into_response();
    }

    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!("Failed to parse webhook body: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    info!(
        "Received webhook for {} with {} event(s)",
        request.destination,
        request.events.len()
    );

    match state.handler.handle_batch(request.events).await {
        Ok(outcomes) => {
            let failed = outcomes.iter().filter(|o| o.is_failed()).count();
            let results: Vec<Value> = outcomes.iter().map(|o| o.to_json()).collect();
            info!(
                "Webhook handled: {} event(s), {} failed",
                results.len(),
                failed
            );
            (StatusCode::OK, Json(results)).into_response()
        }
        Err(e) => {
            error!("Error handling webhook: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatchFailurePolicy, HandlerConfig};
    use crate::testing::RecordingApi;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    const SECRET: &str = "channel-secret";

    fn app(api: Arc<RecordingApi>, policy: BatchFailurePolicy) -> Router {
        let config = HandlerConfig {
            batch_policy: policy,
            ..HandlerConfig::default()
        };
        router(AppState::new(EventHandler::new(api, config), SECRET))
    }

    fn signed_post(body: &str, signature: Option<String>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn batch_body() -> String {
        json!({
            "destination": "U0000",
            "events": [
                {"type": "message", "replyToken": "t1",
                 "message": {"type": "text", "id": "1", "text": "Dainichi?"}},
                {"type": "message", "replyToken": "t2",
                 "message": {"type": "text", "id": "2", "text": "hi"}},
                {"type": "postback", "replyToken": "t3",
                 "postback": {"data": "action=dainichi_products"}},
                {"type": "unfollow"}
            ]
        })
        .to_string()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app(Arc::new(RecordingApi::new()), BatchFailurePolicy::Isolate);
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, HEALTH_TEXT.as_bytes());
    }

    #[tokio::test]
    async fn test_valid_batch_returns_per_event_results() {
        let api = Arc::new(RecordingApi::new());
        let app = app(api.clone(), BatchFailurePolicy::Isolate);
        let body = batch_body();
        let signature = signature::sign(SECRET, body.as_bytes());

        let response = app.oneshot(signed_post(&body, Some(signature))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let results: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(results, json!([{}, null, {}, null]));

        let mut tokens = api.reply_tokens();
        tokens.sort();
        assert_eq!(tokens, vec!["t1", "t3"]);
    }

    #[tokio::test]
    async fn test_missing_signature_is_rejected() {
        let api = Arc::new(RecordingApi::new());
        let app = app(api.clone(), BatchFailurePolicy::Isolate);
        let response = app.oneshot(signed_post(&batch_body(), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_signature_is_rejected() {
        let api = Arc::new(RecordingApi::new());
        let app = app(api.clone(), BatchFailurePolicy::Isolate);
        let body = batch_body();
        let wrong = signature::sign("another-secret", body.as_bytes());
        let response = app.oneshot(signed_post(&body, Some(wrong))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app(Arc::new(RecordingApi::new()), BatchFailurePolicy::Isolate);
        let body = "{\"events\": 42}";
        let signature = signature::sign(SECRET, body.as_bytes());
        let response = app.oneshot(signed_post(body, Some(signature))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_fail_fast_failure_is_empty_500() {
        let api = Arc::new(RecordingApi::new().failing_reply("t3"));
        let app = app(api, BatchFailurePolicy::FailFast);
        let body = batch_body();
        let signature = signature::sign(SECRET, body.as_bytes());

        let response = app.oneshot(signed_post(&body, Some(signature))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_isolated_failure_is_reported_inline() {
        let api = Arc::new(RecordingApi::new().failing_reply("t3"));
        let app = app(api, BatchFailurePolicy::Isolate);
        let body = batch_body();
        let signature = signature::sign(SECRET, body.as_bytes());

        let response = app.oneshot(signed_post(&body, Some(signature))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let results: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(results[0], json!({}));
        assert!(results[2]["error"].is_string());
    }
}
