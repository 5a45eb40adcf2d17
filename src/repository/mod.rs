use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::cart::{Cart, CartItem, CartLine, CartTotals};
use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{
    CatalogEntry, ImportSummary, NewProduct, Product, ProductImage, ProductListQuery,
};

pub mod cart;
pub mod catalog;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only access to the catalog.
pub trait CatalogReader {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>>;
    fn get_product_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    fn list_product_images(&self, product_id: i32) -> RepositoryResult<Vec<ProductImage>>;
}

/// Catalog maintenance used by the import tool.
pub trait CatalogWriter {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    /// Delete a category together with its products, their images and every
    /// cart line referencing them.
    fn delete_category(&self, category_id: i32) -> RepositoryResult<()>;
    /// Load a batch of entries in a single transaction. Entries whose product
    /// slug is already taken are skipped; any other failure rolls back the
    /// whole batch.
    fn import_catalog(&self, entries: &[CatalogEntry]) -> RepositoryResult<ImportSummary>;
}

/// Read-only operations over carts.
pub trait CartReader {
    fn get_cart_by_session_key(&self, session_key: &str) -> RepositoryResult<Option<Cart>>;
    /// Lines of the cart joined with their products, newest-added first.
    fn list_cart_lines(&self, cart_id: i32) -> RepositoryResult<Vec<CartLine>>;
    /// Totals aggregated from the current cart rows.
    fn cart_totals(&self, cart_id: i32) -> RepositoryResult<CartTotals>;
}

/// Mutating operations over carts. Every call runs in its own write
/// transaction.
pub trait CartWriter {
    /// Insert a cart for `session_key`, or return the existing one when a
    /// concurrent request created it first.
    fn create_cart(&self, session_key: &str) -> RepositoryResult<Cart>;
    /// Insert a line or increment the quantity of the existing one.
    fn add_product_to_cart(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> RepositoryResult<CartItem>;
    /// Replace the quantity of a line. Zero deletes it and returns `None`.
    fn set_cart_item_quantity(
        &self,
        cart_id: i32,
        item_id: i32,
        quantity: i32,
    ) -> RepositoryResult<Option<CartItem>>;
    fn remove_cart_item(&self, cart_id: i32, item_id: i32) -> RepositoryResult<()>;
    /// Delete every line of the cart, returning how many were removed.
    fn clear_cart(&self, cart_id: i32) -> RepositoryResult<usize>;
}
