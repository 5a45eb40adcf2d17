//! Helpers for integration tests.
#![allow(dead_code)]

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use pushkind_cart::domain::category::NewCategory;
use pushkind_cart::domain::product::{NewProduct, Product};
use pushkind_cart::repository::{CatalogWriter, DieselRepository};
use pushkind_common::db::{DbPool, establish_connection_pool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

/// Seeds a "Tea" category with two products priced 10.00 and 2.50.
pub fn seed_catalog(repo: &DieselRepository) -> (Product, Product) {
    let category = repo
        .create_category(&NewCategory::new("Tea"))
        .expect("create category");
    let green = repo
        .create_product(&NewProduct::new(category.id, "Green Tea", 1000))
        .expect("create green tea");
    let black = repo
        .create_product(&NewProduct::new(category.id, "Black Tea", 250))
        .expect("create black tea");
    (green, black)
}
