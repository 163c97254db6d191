use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use super::app_state::AppState;
use super::{rest_api, ws_handler};

/// Build the axum router with all HTTP and WebSocket routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Single-user local service; any origin may read it.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", axum::routing::get(ws_handler::ws_upgrade))
        .route("/api/servers", axum::routing::get(rest_api::list_servers))
        .route(
            "/api/participants",
            axum::routing::get(rest_api::list_participants),
        )
        .route(
            "/api/channels/{id}/messages",
            axum::routing::get(rest_api::get_channel_messages).post(rest_api::submit_message),
        )
        .route(
            "/api/channels/{id}/typing",
            axum::routing::get(rest_api::get_typing),
        )
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ChatTurn, CompletionProvider};
    use crate::engine::chat_engine::ChatEngine;
    use crate::engine::orchestrator::TurnSettings;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::util::ServiceExt;

    struct StubProvider;

    #[async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, _prompt: &str, _history: &[ChatTurn]) -> Result<String, String> {
            Ok("stub reply".into())
        }
    }

    fn test_router() -> Router {
        let engine = Arc::new(ChatEngine::new(
            Arc::new(StubProvider),
            TurnSettings::default(),
        ));
        engine.seed_welcome();
        build_router(Arc::new(AppState { engine }))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_servers() {
        let response = test_router()
            .oneshot(Request::get("/api/servers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let servers = json.as_array().unwrap();
        assert_eq!(servers.len(), 3);
        assert_eq!(servers[0]["channels"][1]["name"], "ai-chat");
    }

    #[tokio::test]
    async fn test_get_messages_includes_grouping_flag() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(
                Request::get("/api/channels/chan-1/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let messages = json.as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["grouped_with_previous"], false);
    }

    #[tokio::test]
    async fn test_get_messages_unknown_channel_is_404() {
        let response = test_router()
            .oneshot(
                Request::get("/api/channels/chan-999/messages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_and_reject_empty() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(
                Request::post("/api/channels/chan-1/messages")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"content":"hello there"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(
                Request::post("/api/channels/chan-1/messages")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"content":"  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_typing_starts_false() {
        let response = test_router()
            .oneshot(
                Request::get("/api/channels/chan-1/typing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["typing"], false);
    }
}
