use axum::{
    extract::{DefaultBodyLimit, FromRef, State},
    http::{header, HeaderValue, Method, Uri},
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenIssuer;
use crate::config::AppConfig;
use crate::database::{
    Database, MemoryProjectRepository, MemoryUserRepository, PgProjectRepository, PgUserRepository,
};
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_admin_middleware, ApiResponse, ApiResult};
use crate::services::{ProjectService, UserService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub users: UserService,
    pub tokens: Arc<TokenIssuer>,
    /// `None` when serving from the in-memory store
    pub database: Option<Database>,
}

impl AppState {
    pub fn in_memory(tokens: Arc<TokenIssuer>, config: &AppConfig) -> Self {
        let projects = Arc::new(MemoryProjectRepository::new());
        let users = Arc::new(MemoryUserRepository::new());

        Self {
            projects: ProjectService::new(projects, users.clone(), config.projects.clone()),
            users: UserService::new(users, tokens.clone(), config.security.bcrypt_cost),
            tokens,
            database: None,
        }
    }

    pub fn postgres(database: Database, tokens: Arc<TokenIssuer>, config: &AppConfig) -> Self {
        let projects = Arc::new(PgProjectRepository::new(database.pool().clone()));
        let users = Arc::new(PgUserRepository::new(database.pool().clone()));

        Self {
            projects: ProjectService::new(projects, users.clone(), config.projects.clone()),
            users: UserService::new(users, tokens.clone(), config.security.bcrypt_cost),
            tokens,
            database: Some(database),
        }
    }
}

impl FromRef<AppState> for ProjectService {
    fn from_ref(state: &AppState) -> Self {
        state.projects.clone()
    }
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}

impl FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/user", user_routes(state.tokens.clone()))
        .nest("/api/project", project_routes(state.tokens.clone()))
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config.security.cors_origins))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        )
        .with_state(state);

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn user_routes(tokens: Arc<TokenIssuer>) -> Router<AppState> {
    Router::new()
        .route("/logout", post(protected::user::logout))
        .route("/me", get(protected::user::me))
        .route_layer(middleware::from_fn_with_state(tokens, jwt_auth_middleware))
        // Routes below are added after the layer and stay public
        .route("/register", post(public::register))
        .route("/login", post(public::login))
}

fn project_routes(tokens: Arc<TokenIssuer>) -> Router<AppState> {
    use protected::project;

    let admin = Router::new()
        .route("/getAllProjects", get(elevated::project::get_all_projects))
        .route_layer(middleware::from_fn(require_admin_middleware));

    Router::new()
        .route("/createProject", post(project::create_project))
        .route("/getProjectById/:projectId", get(project::get_project_by_id))
        .route("/getProjectsOfAUser", get(project::get_projects_of_a_user))
        .route("/updateProject/:projectId", patch(project::update_project))
        .route("/deleteProject/:projectId", delete(project::delete_project))
        .route(
            "/addMembersToProject/:projectId/user/:userId",
            patch(project::add_members_to_project),
        )
        .route(
            "/getAllProjectsUserIsMemberOf/:userId",
            get(project::get_all_projects_user_is_member_of),
        )
        .merge(admin)
        // Outermost route layer, so it runs before require_admin_middleware
        .route_layer(middleware::from_fn_with_state(tokens, jwt_auth_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    // Cookies only travel cross-origin with credentials enabled
    base.allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
}

async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "name": "ProjectHub API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "user": ["/api/user/register", "/api/user/login", "/api/user/logout", "/api/user/me"],
            "project": "/api/project/*"
        }
    })))
}

async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let database = match &state.database {
        None => "in-memory",
        Some(db) => {
            db.health_check().await.map_err(|e| {
                tracing::error!("Health check failed: {}", e);
                ApiError::service_unavailable("Database is unreachable")
            })?;
            "connected"
        }
    };

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "database": database
    })))
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
