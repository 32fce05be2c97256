use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dikitivi::config::Config;
use dikitivi::db::{create_pool, init_db, queries, seed_config_rows, AppState};
use dikitivi::handlers;
use dikitivi::models::{CreateBook, CreateMedia, CreateUser};
use dikitivi::sms::SmsService;

#[derive(Parser, Debug)]
#[command(name = "dikitivi")]
#[command(about = "Media streaming platform backend with gateway payments")]
struct Cli {
    /// Seed the database with dev data (user, media, books)
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Seeds the database with dev data for testing.
/// Only runs in dev mode and when the database is empty.
fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    let users = queries::list_users(&conn).expect("Failed to list users");
    if !users.is_empty() {
        tracing::info!("Database already has data, skipping seed");
        return;
    }

    let user = queries::create_user(
        &conn,
        &CreateUser {
            name: "Dev Viewer".to_string(),
            email: Some("dev@dikitivi.local".to_string()),
            phone: Some("+243820000000".to_string()),
        },
    )
    .expect("Failed to create dev user");

    let media = queries::create_media(
        &conn,
        &CreateMedia {
            title: "Launch Concert".to_string(),
            description: Some("Opening night recording".to_string()),
            media_url: Some("https://cdn.dikitivi.local/launch.mp4".to_string()),
            cover_url: None,
            for_youth: false,
        },
    )
    .expect("Failed to create dev media");

    let book = queries::create_book(
        &conn,
        &CreateBook {
            title: "Field Notes".to_string(),
            author: Some("A. Kalala".to_string()),
            file_url: Some("https://cdn.dikitivi.local/field-notes.pdf".to_string()),
            cover_url: None,
        },
    )
    .expect("Failed to create dev book");

    tracing::info!("Seeded dev user {} ({})", user.id, user.name);
    tracing::info!("Seeded dev media {} and book {}", media.id, book.id);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dikitivi=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
        seed_config_rows(&conn).expect("Failed to seed config rows");
    }

    let state = AppState {
        db: db_pool,
        base_url: config.base_url.clone(),
        gateway: config.gateway.clone(),
        sms: Arc::new(SmsService::new(config.sms.clone())),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set DIKITIVI_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    if !state.sms.is_enabled() {
        tracing::info!("SMS credentials not configured, running in log-only mode");
    }

    let app = handlers::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("DikiTivi server listening on {}", addr);

    // connect_info feeds the session handler's client ip extraction
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
