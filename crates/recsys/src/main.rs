//! Recommendation service
//!
//! Port: 8083

use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use media_gateway_recsys::server::{configure_routes, AppState};
use media_gateway_recsys::{ContentRecommender, RecsysConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .json()
        .init();

    let config = Arc::new(RecsysConfig::load()?);
    info!("Loading artifacts from {}", config.data.dir.display());

    let recommender = Arc::new(ContentRecommender::from_config(&config)?);
    let bind_addr = config.bind_addr();
    info!("Starting recommendation service on {}", bind_addr);

    let workers = config.server.workers;
    let state = web::Data::new(AppState {
        config: Arc::clone(&config),
        recommender,
    });

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(configure_routes)
    });
    if let Some(workers) = workers {
        server = server.workers(workers);
    }

    server.bind(&bind_addr)?.run().await?;
    Ok(())
}
