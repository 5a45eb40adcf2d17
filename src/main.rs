use actix_files::Files;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use tera::Tera;

use pushkind_cart::config::ServerConfig;
use pushkind_cart::repository::DieselRepository;
use pushkind_cart::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let config = ServerConfig::from_env();

    // Key derivation needs at least 32 bytes of master key.
    let secret_key = match &config.secret_key {
        Some(key) if key.len() >= 32 => Key::derive_from(key.as_bytes()),
        Some(_) => {
            log::warn!("SECRET_KEY is shorter than 32 bytes, using a random key instead");
            Key::generate()
        }
        None => {
            log::warn!("SECRET_KEY is not set, carts will not survive a restart");
            Key::generate()
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = match Tera::new(&config.templates_glob()) {
        Ok(t) => t,
        Err(e) => {
            log::error!("Parsing error(s): {e}");
            std::process::exit(1);
        }
    };

    let cookie_domain = config.domain.as_ref().map(|domain| format!(".{domain}"));
    let cookie_secure = config.cookie_secure;

    log::info!("Starting server on {}:{}", config.address, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(cookie_secure)
                    .cookie_domain(cookie_domain.clone())
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .configure(routes::configure)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
    })
    .bind((config.address.clone(), config.port))?
    .run()
    .await
}
