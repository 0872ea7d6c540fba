//! Yatube server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;
use yatube_api::{AppState, auth_middleware, router as api_router};
use yatube_common::{Config, JwtKeys, LocalStorage};
use yatube_core::{CommentService, FollowService, GroupService, PostService, UserService};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

/// Room for JSON framing around a base64 image.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "yatube=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;
    init_tracing(&config);

    info!("Starting yatube server...");

    let public_url = Url::parse(&config.server.url)?;

    // Connect to database
    let db = Arc::new(yatube_db::init(&config.database).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    yatube_db::migrate(&db).await?;
    info!("Migrations completed");

    // Create repositories
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    // Create services
    let keys = JwtKeys::from_config(&config.auth);
    let storage = Arc::new(LocalStorage::from_config(&config));

    let state = AppState {
        user_service: UserService::new(user_repo.clone(), keys),
        post_service: PostService::new(
            post_repo.clone(),
            group_repo.clone(),
            storage,
            config.media.max_image_bytes,
        ),
        comment_service: CommentService::new(comment_repo, post_repo),
        group_service: GroupService::new(group_repo),
        follow_service: FollowService::new(follow_repo, user_repo),
        pagination: config.pagination.clone(),
        public_url,
    };

    // Build router
    let mut app = Router::new().nest("/api/v1", api_router());

    // Serve uploaded files ourselves unless they live on another host
    let media_path = config.media.base_url.trim_end_matches('/');
    if media_path.starts_with('/') {
        info!(path = %media_path, "Serving media files");
        app = app.nest_service(media_path, ServeDir::new(&config.media.base_path));
    }

    let body_limit = config.media.max_image_bytes / 3 * 4 + BODY_OVERHEAD_BYTES;

    let app = app
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_secs,
                )))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
