use actix_web::{middleware as actix_middleware, App, HttpServer};
use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vulnapi::app::{self, AppState};
use vulnapi::config::{ServerConfig, DEFAULT_CONFIG_PATH};
use vulnapi::db::{seed, Database};
use vulnapi::mode::ModeController;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (for development)
    // Try loading from current directory first, then from server/ directory
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("server/.env").ok();
    }

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting VulnAPI...");
    log::info!("Protocol version: {}", vulnapi_protocol::protocol_version());

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = ServerConfig::load(&config_path)
        .with_context(|| format!("failed to load configuration from '{config_path}'"))?;

    let controller = ModeController::from_config(&config.security);
    if controller.is_vulnerable() {
        log::warn!("Running in VULNERABLE mode. Do not expose this server to untrusted networks.");
    } else {
        log::info!("Running in secure mode");
    }

    if let Some(path) = config.database.file_path() {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
    }

    log::info!("Opening database at {}...", config.database.url);
    let db = Database::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to open database")?;
    db.init_schema()
        .await
        .context("failed to initialise database schema")?;

    if config.bootstrap.populate_on_start && db.users().count().await? == 0 {
        let report = seed::populate(&db, &config.bootstrap, &mut StdRng::from_entropy())
            .await
            .context("failed to write bootstrap population")?;
        log::info!(
            "Bootstrap population: {} users, {} books",
            report.users,
            report.books
        );
    }

    let state = AppState::new(db, controller, config.bootstrap.clone());

    let host = config.server.host.clone();
    let port = config.server.port;
    log::info!("Starting HTTP server at {}:{}...", host, port);

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(actix_middleware::Logger::default())
            .configure(move |cfg| app::configure(cfg, &state))
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
