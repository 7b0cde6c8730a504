use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use taskdesk::{
    auth::{AuthMiddleware, TokenService},
    config::Config,
    db, routes,
};

fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600),
        None => Cors::default(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pool = db::connect(&config.database).await.map_err(|e| {
        log::error!("failed to connect to database: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    db::run_migrations(&pool).await.map_err(|e| {
        log::error!("failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let tokens = web::Data::new(TokenService::from_config(&config.jwt));
    let cookie_settings = web::Data::new(config.cookie_settings());
    let pool = web::Data::new(pool);
    let allowed_origin = config.cors_allowed_origin.clone();

    log::info!("Starting taskdesk server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(tokens.clone())
            .app_data(cookie_settings.clone())
            .wrap(AuthMiddleware)
            .wrap(cors(allowed_origin.as_deref()))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
