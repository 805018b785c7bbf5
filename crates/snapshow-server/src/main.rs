use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use snapshow_api::auth::{self, AppState, AppStateInner};
use snapshow_api::files::{self, MAX_FILE_SIZE};
use snapshow_api::middleware::{jwt_secret, optional_auth, require_auth};
use snapshow_api::storage::Storage;
use snapshow_api::{comments, moderation, notifications, photos, users, votes};
use snapshow_db::Database;
use snapshow_types::roles::Role;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapshow=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = jwt_secret();
    let db_path = std::env::var("SNAPSHOW_DB_PATH").unwrap_or_else(|_| "snapshow.db".into());
    let upload_dir = std::env::var("SNAPSHOW_UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());
    let host = std::env::var("SNAPSHOW_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("SNAPSHOW_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database and storage
    let db = Database::open(&PathBuf::from(&db_path))?;
    seed_admin(&db)?;
    let storage = Storage::new(PathBuf::from(&upload_dir)).await?;
    let serve_uploads = ServeDir::new(storage.dir());

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        storage,
    });

    // Routes
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(app_state.clone());

    let public_routes = Router::new()
        .route("/photos", get(photos::gallery))
        .route("/photos/leaderboard", get(photos::leaderboard))
        .route("/photos/winners", get(photos::previous_winners))
        .route("/photos/{photo_id}", get(photos::photo_detail))
        .layer(middleware::from_fn(optional_auth))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/files", post(files::upload_file))
        .route("/photos", post(photos::submit_photo))
        .route("/photos/{photo_id}", patch(photos::update_photo))
        .route("/photos/{photo_id}/vote", post(votes::cast_vote))
        .route("/photos/{photo_id}/comments", post(comments::post_comment))
        .route("/users/me", get(users::profile))
        .route("/users/me", patch(users::update_profile))
        .route("/users/me/avatar", post(files::upload_avatar))
        .route("/notifications", get(notifications::list_unread))
        .route("/notifications/{notification_id}/read", post(notifications::mark_read))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/admin/photos", get(moderation::list_photos))
        .route("/admin/users", get(moderation::list_users))
        .route("/admin/photos/{photo_id}/approve", post(moderation::approve))
        .route("/admin/photos/{photo_id}/reject", post(moderation::reject))
        .route("/admin/photos/{photo_id}/revert", post(moderation::revert))
        .layer(middleware::from_fn(require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(auth_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", serve_uploads)
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Snapshow server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Admin accounts never come from registration; ensure one exists at
/// startup.
fn seed_admin(db: &Database) -> anyhow::Result<()> {
    let email =
        std::env::var("SNAPSHOW_ADMIN_EMAIL").unwrap_or_else(|_| "admin@snapshow.local".into());
    if db.get_user_by_email(&email)?.is_some() {
        return Ok(());
    }

    let password = std::env::var("SNAPSHOW_ADMIN_PASSWORD").unwrap_or_else(|_| {
        warn!("SNAPSHOW_ADMIN_PASSWORD not set, using the default dev password");
        "admin123".into()
    });
    let hash = auth::hash_password(&password)?;

    db.create_user(
        &Uuid::new_v4().to_string(),
        "Admin",
        &email,
        &hash,
        Role::Admin.as_str(),
    )?;
    info!("Seeded admin account {}", email);

    Ok(())
}
