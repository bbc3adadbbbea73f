//! `todo-server` binary entry point.

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use todo_server::{AppState, TodoConfig, routes};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("todo=info,actix_web=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    let config = TodoConfig::load_with_dotenv().map_err(std::io::Error::other)?;
    let state = AppState::build(&config)
        .await
        .map_err(std::io::Error::other)?;

    if let Err(e) = state.backend.auth.cleanup_expired_sessions().await {
        tracing::warn!(error = %e, "Expired session cleanup failed");
    }

    let addr = (config.server.host.clone(), config.server.port);
    tracing::info!(host = %addr.0, port = addr.1, "Starting todo server...");

    let app_data = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .configure(routes::config)
            .default_service(web::route().to(routes::not_found))
            .wrap(Logger::default())
    })
    .bind(addr)?
    .run()
    .await?;

    tracing::info!("Todo server stopped.");
    Ok(())
}
