/// Media Service - HTTP Server
///
/// Serves the upload and delivery API. Transcoding itself runs in the
/// separate `transcode-worker` binary; the two sides share only the
/// database and the Redis job queue.
use std::io;
use std::sync::Arc;

use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use auth_token::JwtKeys;
use media_service::db::PgVideoStore;
use media_service::services::RedisJobQueue;
use media_service::{configure_api, AppState, Config};
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    let bind_address = format!("{}:{}", config.app.host, config.app.port);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    let queue = RedisJobQueue::connect(&config.queue.redis_url, &config.queue.queue_name)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Redis unavailable: {e}")))?;

    let keys = JwtKeys::from_secret(&config.auth.jwt_secret);
    let state = web::Data::new(AppState::new(
        config.clone(),
        Arc::new(PgVideoStore::new(db_pool)),
        Arc::new(queue),
    ));

    tracing::info!("Media service listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(actix_middleware::Logger::default())
            .wrap(actix_cors::Cors::permissive())
            .configure(configure_api(keys.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
