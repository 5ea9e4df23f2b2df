use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{http, App, HttpServer};
use tracker::api::app::{create_app, Services};
use tracker::config::Config;
use tracker::infra::db;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let pool = db::pg(&config.database_url).await?;
    db::migrate(&pool).await?;

    let services = Services::from_config(pool, &config)?;
    let frontend_origin = config.frontend_origin.clone();

    log::info!(host = config.host.as_str(), port = config.port; "Start server");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::CONTENT_TYPE,
                http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(create_app(services.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
