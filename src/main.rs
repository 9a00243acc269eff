use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use training_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, rate_limit},
    routes,
    store::PgCollectionStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgCollectionStore::new(pool));
    let app_state = AppState::new(store);

    let public_api = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/quiz", get(routes::quiz::get_quiz))
        .route("/api/quiz/active", get(routes::quiz::get_active_quizzes))
        .route("/api/quiz/submit", post(routes::quiz::submit_quiz))
        .route("/api/quiz/attempts", get(routes::quiz::get_attempts))
        .route("/api/lessons", get(routes::lessons::list_lessons))
        .route(
            "/api/program-siswa",
            get(routes::lessons::get_program_siswa),
        )
        .route("/api/siswa/search", get(routes::lessons::search_siswa))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::per_minute(config.api_rpm),
            rate_limit::rate_limit_middleware,
        ));

    let auth_api = Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/mitra", post(routes::auth::mitra_login))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::per_minute(config.login_rpm),
            rate_limit::rate_limit_middleware,
        ));

    let admin_api = Router::new()
        .route(
            "/api/admin/quiz",
            get(routes::admin::get_quizzes)
                .post(routes::admin::save_quiz)
                .delete(routes::admin::delete_quiz),
        )
        .route(
            "/api/admin/program",
            get(routes::admin::get_programs)
                .post(routes::admin::add_program)
                .delete(routes::admin::delete_program),
        )
        .route(
            "/api/admin/program-siswa",
            get(routes::admin::get_program_siswa)
                .post(routes::admin::save_program_siswa)
                .patch(routes::admin::update_program_siswa)
                .delete(routes::admin::delete_program_siswa),
        )
        .route(
            "/api/admin/program-siswa/import",
            post(routes::admin::import_program_siswa),
        )
        .route(
            "/api/admin/scoredetail",
            get(routes::admin::get_score_details)
                .patch(routes::admin::update_score_detail)
                .delete(routes::admin::delete_score_detail),
        )
        .route(
            "/api/admin/mitra",
            get(routes::admin::get_mitra)
                .post(routes::admin::save_mitra)
                .delete(routes::admin::delete_mitra),
        )
        .route("/api/admin/mitra/import", post(routes::admin::import_mitra))
        .route(
            "/api/admin/sync/scores",
            get(routes::sync::get_sync_scores).post(routes::sync::push_scores),
        )
        .route("/api/admin/sync/backfill", post(routes::sync::backfill))
        .layer(axum::middleware::from_fn(auth::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::per_minute(config.admin_rpm),
            rate_limit::rate_limit_middleware,
        ));

    let app = public_api
        .merge(auth_api)
        .merge(admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
