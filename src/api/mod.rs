use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AssetService, AuthService, S3AssetService, SeaOrmAuthService, TokenAuthority,
};

mod assets;
pub mod auth;
mod error;
mod lists;
mod movies;
mod observability;
mod system;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub tokens: TokenAuthority,

    pub auth: Arc<dyn AuthService>,

    pub assets: Arc<dyn AssetService>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    if config.jwt_secret.is_empty() {
        anyhow::bail!("Token-signing secret is not configured");
    }

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let tokens = TokenAuthority::new(&config.jwt_secret);

    let auth = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        tokens.clone(),
        config.security.clone(),
    )) as Arc<dyn AuthService>;

    let assets = Arc::new(S3AssetService::new(&config.storage)) as Arc<dyn AssetService>;

    Ok(Arc::new(AppState {
        config,
        store,
        tokens,
        auth,
        assets,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users/find/{id}", get(users::find_user))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_requests))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/stats", get(users::user_stats))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        .route("/movies", get(movies::list_movies))
        .route("/movies", post(movies::create_movie))
        .route("/movies/find/{id}", get(movies::find_movie))
        .route("/movies/random", get(movies::random_movie))
        .route("/movies/{id}", put(movies::update_movie))
        .route("/movies/{id}", delete(movies::delete_movie))
        .route("/lists", get(lists::sample_lists))
        .route("/lists", post(lists::create_list))
        .route("/lists/find/{id}", get(lists::get_list))
        .route("/lists/{id}", put(lists::update_list))
        .route("/lists/{id}", delete(lists::delete_list))
        .route("/assets/videos/upload-url", get(assets::video_upload_url))
        .route("/assets/videos/delete-url", get(assets::video_delete_url))
        .route("/assets/posters/upload-url", get(assets::poster_upload_url))
        .route("/assets/posters/delete-url", get(assets::poster_delete_url))
        .route(
            "/assets/profile-images/upload-url",
            get(assets::profile_image_upload_url),
        )
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::require_auth))
}
