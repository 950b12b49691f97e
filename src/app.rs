use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, DatabaseConfig, SecurityConfig, StoreBackend};
use crate::database::{DatabaseManager, EntityStore, MemoryStore, PgStore};
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::observer::{DomainEvent, NotificationDispatcher};
use crate::services::{AccountService, ProposalLifecycle};

/// Shared handles every handler receives
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub lifecycle: ProposalLifecycle,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, config: &AppConfig) -> Self {
        let dispatcher = NotificationDispatcher::with_default_observers(store.clone(), &config.notifications);
        Self {
            lifecycle: ProposalLifecycle::new(store.clone()),
            accounts: AccountService::new(store.clone(), config.security.clone()),
            dispatcher: Arc::new(dispatcher),
            store,
        }
    }

    /// Fire notifications for a write that has already been persisted.
    /// The outcome is logged by the dispatcher and never reaches the caller.
    pub async fn notify(&self, event: DomainEvent) {
        let _ = self.dispatcher.dispatch(&event).await;
    }
}

/// Open the configured store, applying migrations for Postgres when enabled
pub async fn build_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn EntityStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(config).await?;
            if config.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(auth_routes(state.clone()))
        .merge(data_routes())
        .with_state(state);

    // Global middleware
    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    app
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/token/refresh", post(auth::refresh))
        .route("/api/set-role", post(auth::set_role))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn data_routes() -> Router<AppState> {
    use handlers::data::{contracts, messages, notifications, profiles, projects, proposals, reviews, skills};

    Router::new()
        .route("/api/profiles", get(profiles::list).post(profiles::create))
        .route(
            "/api/profiles/:id",
            get(profiles::get)
                .put(profiles::update)
                .patch(profiles::update)
                .delete(profiles::delete),
        )
        .route("/api/skills", get(skills::list).post(skills::create))
        .route(
            "/api/skills/:id",
            get(skills::get).put(skills::update).patch(skills::update).delete(skills::delete),
        )
        .route("/api/projects", get(projects::list).post(projects::create))
        .route(
            "/api/projects/:id",
            get(projects::get)
                .put(projects::update)
                .patch(projects::update)
                .delete(projects::delete),
        )
        .route("/api/proposals", get(proposals::list).post(proposals::create))
        .route(
            "/api/proposals/:id",
            get(proposals::get)
                .put(proposals::update)
                .patch(proposals::update)
                .delete(proposals::delete),
        )
        .route("/api/proposals/:id/accept", post(proposals::accept))
        .route("/api/proposals/:id/reject", post(proposals::reject))
        .route("/api/contracts", get(contracts::list).post(contracts::create))
        .route(
            "/api/contracts/:id",
            get(contracts::get)
                .put(contracts::update)
                .patch(contracts::update)
                .delete(contracts::delete),
        )
        .route("/api/messages", get(messages::list).post(messages::create))
        .route(
            "/api/messages/:id",
            get(messages::get)
                .put(messages::update)
                .patch(messages::update)
                .delete(messages::delete),
        )
        .route("/api/reviews", get(reviews::list).post(reviews::create))
        .route(
            "/api/reviews/:id",
            get(reviews::get)
                .put(reviews::update)
                .patch(reviews::update)
                .delete(reviews::delete),
        )
        .route("/api/notifications", get(notifications::list))
        .route(
            "/api/notifications/:id",
            get(notifications::get)
                .patch(notifications::update)
                .delete(notifications::delete),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Marketplace API",
            "version": version,
            "description": "Freelance marketplace backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "accounts": "/api/register, /api/login, /api/token/refresh, /api/set-role (public)",
                "auth": "/api/auth/whoami (protected)",
                "profiles": "/api/profiles[/:id]",
                "skills": "/api/skills[/:id]",
                "projects": "/api/projects[/:id]",
                "proposals": "/api/proposals[/:id][/accept|/reject]",
                "contracts": "/api/contracts[/:id]",
                "messages": "/api/messages[/:id]",
                "reviews": "/api/reviews[/:id]",
                "notifications": "/api/notifications[/:id]",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "notifications": state.dispatcher.is_enabled()
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    use crate::database::models::Role;
    use crate::testing;

    fn app_over(store: Arc<MemoryStore>) -> Router {
        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Memory;
        config.api.enable_request_logging = false;
        config.notifications = testing::notifications_on();
        router(AppState::new(store, &config), &config)
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn failed_notification_insert_still_answers_created() {
        let store = Arc::new(MemoryStore::new());
        let client = testing::profile(&store, "carol", Role::Client).await;
        let fred = testing::profile(&store, "fred", Role::Freelancer).await;
        let fiona = testing::profile(&store, "fiona", Role::Freelancer).await;
        store.fail_notifications_for(fiona.id).await;
        let app = app_over(store.clone());

        let (status, body) = post_json(
            &app,
            "/api/projects",
            json!({"owner": client.id, "title": "Logo design"}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["title"], "Logo design");

        // The project is kept and the inbox is partial
        assert_eq!(store.list_projects().await.unwrap().len(), 1);
        assert_eq!(store.list_notifications(Some(fred.id)).await.unwrap().len(), 1);
        assert!(store.list_notifications(Some(fiona.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn review_is_kept_when_its_notification_cannot_be_stored() {
        let store = Arc::new(MemoryStore::new());
        let client = testing::profile(&store, "carol", Role::Client).await;
        let fred = testing::profile(&store, "fred", Role::Freelancer).await;
        let project = testing::project(&store, &client, "Shop").await;
        store.fail_notifications_for(fred.id).await;
        let app = app_over(store.clone());

        let (status, body) = post_json(
            &app,
            "/api/reviews",
            json!({"reviewer": client.id, "reviewee": fred.id, "project": project.id, "rating": 5}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["data"]["reviewee_name"], "fred");

        assert_eq!(store.list_reviews().await.unwrap().len(), 1);
        assert!(store.list_notifications(Some(fred.id)).await.unwrap().is_empty());
    }
}
