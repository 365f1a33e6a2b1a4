//! Axum router assembly.

use axum::routing::get;
use axum::Router;

use wirehome_app::ports::Storage;

use crate::state::AppState;

/// Build the top-level axum [`Router`] with API routes under `/api/v1`.
pub fn build<S>(state: AppState<S>) -> Router
where
    S: Storage + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", crate::api::routes())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wirehome_app::diagnostics::OperationsPerSecondCounter;
    use wirehome_app::message_bus::{MessageBus, MessageBusConfig, MESSAGES_PUBLISHED_COUNTER};
    use wirehome_app::services::{
        ComponentGroupRegistry, ComponentRegistry, GlobalVariablesService, NotificationsService,
    };
    use wirehome_app::shutdown::SystemCancellationToken;
    use wirehome_app::system_status::SystemStatusService;
    use wirehome_domain::error::Result;

    /// Keeps nothing — good enough to route requests through the registries.
    struct NullStorage;

    impl Storage for NullStorage {
        fn try_read(&self, _path: &[&str]) -> Result<Option<Value>> {
            Ok(None)
        }
        fn write(&self, _value: &Value, _path: &[&str]) -> Result<()> {
            Ok(())
        }
        fn enumerate_directories(&self, _pattern: &str, _path: &[&str]) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn delete_directory(&self, _path: &[&str]) -> Result<()> {
            Ok(())
        }
    }

    fn test_state() -> AppState<NullStorage> {
        let bus = Arc::new(MessageBus::new(
            MessageBusConfig::default(),
            Arc::new(OperationsPerSecondCounter::new(MESSAGES_PUBLISHED_COUNTER)),
            SystemCancellationToken::new(),
        ));
        AppState::new(
            Arc::clone(&bus),
            Arc::new(ComponentRegistry::new(NullStorage, Arc::clone(&bus))),
            Arc::new(ComponentGroupRegistry::new(NullStorage, Arc::clone(&bus))),
            Arc::new(GlobalVariablesService::new(Arc::clone(&bus))),
            Arc::new(NotificationsService::new(Arc::clone(&bus))),
            Arc::new(SystemStatusService::new()),
        )
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = build(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_map_missing_component_to_not_found() {
        let app = build(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/components/ghost.1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_resolve_repository_file_uri() {
        let app = build(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/repository/wirehome.example@1.0.0/script.py/uri")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: String =
            serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes())
                .unwrap();
        assert_eq!(body, "/repository/wirehome.example/1.0.0/script.py");
    }

    #[tokio::test]
    async fn should_reject_malformed_package_uid() {
        let app = build(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/repository/no-version/script.py/uri")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
