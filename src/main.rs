use actix_files::Files;
use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use log::info;
use env_logger::Env;
use actix_web::middleware::Logger;
use std::collections::HashMap;
use std::sync::Arc;

use velomatchr::config::Config;
use velomatchr::db;
use velomatchr::routes;
use velomatchr::services::mailer::{MailTransport, SmtpMailer};
use velomatchr::services::mx::{DnsMxLookup, MxLookup};
use velomatchr::services::photos::PUBLIC_PATH;
use velomatchr::services::relationships::RelationshipsClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::load();

    // Initialize the database pool
    let pool = db::connect(&config.database_url, config.database_max_connections)
        .await
        .expect("Failed to connect to the database");
    db::migrate(&pool).await.expect("Failed to run database migrations");

    let mailer: Arc<dyn MailTransport> =
        Arc::new(SmtpMailer::from_config(&config).expect("Invalid SMTP configuration"));
    let mx: Arc<dyn MxLookup> =
        Arc::new(DnsMxLookup::from_system_conf().expect("Failed to read resolver configuration"));
    let relationships = RelationshipsClient::new(&config.api_url);

    std::fs::create_dir_all(&config.photo_dir)?;

    let bind_address = config.bind_address();
    let workers = config.workers;
    info!("VeloMatchr API listening on {} with {} workers", bind_address, workers);

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "velomatchr".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .expect("Failed to create Prometheus metrics");

    let photo_dir = config.photo_dir.clone();
    if config.cors_enabled {
        info!("CORS enabled for all origins");
    }
    let config = web::Data::new(config);
    let mailer = web::Data::from(mailer);
    let mx = web::Data::from(mx);
    let relationships = web::Data::new(relationships);

    HttpServer::new(move || {
        App::new()
            .wrap(routes::cors(&config))
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .app_data(mailer.clone())
            .app_data(mx.clone())
            .app_data(relationships.clone())
            .app_data(web::JsonConfig::default().limit(5 * 1024 * 1024))
            .service(Files::new(PUBLIC_PATH, &photo_dir))
            .configure(routes::configure)
    })
    .workers(workers)
    .bind(&bind_address)?
    .run()
    .await
}
