use std::path::PathBuf;

use axum::Router;
use clap::Parser;
use course_server::{api, utils::init_log};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to database file
    #[arg(short, long, default_value = "database/course.db")]
    database: PathBuf,
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    #[arg(short, long, default_value = "8080")]
    port: u16,
    /// Log directory, stdout when unset
    #[arg(short, long)]
    log: Option<PathBuf>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        course_server::api::user::register,
        course_server::api::user::login,
        course_server::api::user::logout,
        course_server::api::user::user_info,
        course_server::api::user::enroll,
        course_server::api::user::my_courses,
        course_server::api::catalog::get_courses,
        course_server::api::catalog::get_course_detail,
        course_server::api::progress::mark,
        course_server::api::progress::summary,
        course_server::api::admin::create_course,
        course_server::api::admin::delete_course,
        course_server::api::admin::create_chapter,
        course_server::api::admin::create_video,
        course_server::api::admin::delete_video,
        course_server::api::admin::list_users,
        course_server::api::admin::delete_user,
    ),
    components(schemas(
        course_server::catalog::Course,
        course_server::catalog::CourseDetail,
        course_server::catalog::ChapterView,
        course_server::catalog::VideoView,
        course_server::embed::EmbedRef,
        course_server::progress::ProgressRecord,
        course_server::progress::ProgressSummary,
        course_server::progress::CourseProgress,
        course_server::user::UserInfo,
        course_server::user::Role,
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_log(args.log.clone());

    if let Some(parent) = args.database.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Cascading deletes depend on the pragma being set on every connection
    let options = SqliteConnectOptions::new()
        .filename(&args.database)
        .create_if_missing(true)
        .foreign_keys(true);
    let database = SqlitePool::connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&database).await?;

    let session_store = SqliteStore::new(database.clone());
    session_store.migrate().await?;
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::days(5)));

    let api = api::get_api_router().with_state(database);
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!("Starting server at http://{addr}");
    tracing::info!("Swagger UI available at http://{addr}/swagger-ui/");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
