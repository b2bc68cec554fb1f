mod app;
mod cors;
mod health;
mod seed;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use common::env_config::Config;
use db::Store;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init store, backend chosen by the DATABASE_URL scheme
    let store: Arc<dyn Store> = db::setup(&config.database_url, config.is_production())
        .await
        .expect("Failed to set up database");

    if config.seed_demo_data {
        if let Err(err) = seed::seed_demo_data(store.as_ref()).await {
            log::error!("Failed to seed demo data: {}", err);
        }
    }

    log::info!(
        "Listening on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .wrap(logger::middleware()) // 3rd
            .wrap(extractor::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .configure(app::configure)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
