//! Load categories and products from a CSV file into the shop database.
//!
//! Usage: `import-catalog <catalog.csv>`; the database is taken from
//! `DATABASE_URL` (default `app.db`).

use std::env;
use std::fs::File;

use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;

use pushkind_cart::config::ServerConfig;
use pushkind_cart::forms::catalog::{CatalogFormError, parse_catalog};
use pushkind_cart::repository::DieselRepository;
use pushkind_cart::services::catalog::import_catalog;

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok();

    let Some(path) = env::args().nth(1) else {
        log::error!("Usage: import-catalog <catalog.csv>");
        std::process::exit(2);
    };

    let config = ServerConfig::from_env();

    let rows = match File::open(&path)
        .map_err(CatalogFormError::from)
        .and_then(parse_catalog)
    {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to read {path}: {e}");
            std::process::exit(1);
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

    match import_catalog(&repo, &rows) {
        Ok(summary) => log::info!(
            "Imported {} products into {} new categories ({} skipped)",
            summary.products_created,
            summary.categories_created,
            summary.products_skipped
        ),
        Err(e) => {
            log::error!("Catalog import failed: {e}");
            std::process::exit(1);
        }
    }
}
