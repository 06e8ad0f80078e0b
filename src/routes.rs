// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, exam, files, game, group, item},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public read routes and authenticated write routes per resource.
/// * Uploaded images served from the upload directory under `/files`.
/// * Global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(require_auth.clone()),
        );

    let exam_routes = Router::new()
        .route("/", get(exam::list_exams))
        .route("/{id}", get(exam::get_exam))
        .route("/{id}/groups", get(exam::list_exam_groups))
        .route("/{id}/items", get(exam::list_exam_items))
        .route("/{id}/leaderboard", get(exam::get_leaderboard))
        .merge(
            Router::new()
                .route("/", post(exam::create_exam))
                .route("/{id}", put(exam::update_exam).delete(exam::delete_exam))
                .layer(require_auth.clone()),
        );

    let group_routes = Router::new()
        .route("/", post(group::create_group))
        .route("/{id}", put(group::update_group).delete(group::delete_group))
        .layer(require_auth.clone());

    let item_routes = Router::new()
        .route("/{id}", get(item::get_item))
        .merge(
            Router::new()
                .route("/", post(item::create_item))
                .route("/{id}", put(item::update_item).delete(item::delete_item))
                .layer(require_auth.clone()),
        );

    let game_routes = Router::new()
        .route("/{exam_id}", get(game::get_round))
        .merge(
            Router::new()
                .route("/result", post(game::submit_result))
                .layer(require_auth.clone()),
        );

    let file_routes = Router::new()
        .route("/", post(files::upload_file))
        .layer(DefaultBodyLimit::max(files::MAX_UPLOAD_BYTES))
        .layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api/groups", group_routes)
        .nest("/api/items", item_routes)
        .nest("/api/game", game_routes)
        .nest("/api/files", file_routes)
        .nest_service("/files", ServeDir::new(&state.config.upload_dir))
        // Global Middleware (ServiceBuilder applies top to bottom)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
