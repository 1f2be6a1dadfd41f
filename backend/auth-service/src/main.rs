/// Auth Service - HTTP Server
use std::io;

use actix_web::{middleware as actix_middleware, web, App, HttpServer};
use auth_service::services::{AuthService, EmailService};
use auth_service::{routes, AppState, Config};
use auth_token::JwtKeys;
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

    let email = EmailService::new(&config.email)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("{e}")))?;
    if !email.is_enabled() {
        tracing::warn!("running without SMTP; activation and reset mails are logged only");
    }

    let keys = JwtKeys::from_secret(&config.jwt.secret);
    let state = web::Data::new(AppState {
        auth: AuthService::new(db_pool, keys, email),
        config: config.clone(),
    });

    tracing::info!("Auth service listening on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(actix_middleware::Logger::default())
            .wrap(actix_cors::Cors::permissive())
            .configure(routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
