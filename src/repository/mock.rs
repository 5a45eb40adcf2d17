use mockall::mock;

use super::{CartReader, CartWriter, CatalogReader, CatalogWriter};
use crate::domain::{
    cart::{Cart, CartItem, CartLine, CartTotals},
    category::{Category, NewCategory},
    product::{
        CatalogEntry, ImportSummary, NewProduct, Product, ProductImage, ProductListQuery,
    },
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub CatalogReader {}

    impl CatalogReader for CatalogReader {
        fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
        fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>>;
        fn get_product_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
        fn list_product_images(&self, product_id: i32) -> RepositoryResult<Vec<ProductImage>>;
    }
}

mock! {
    pub CatalogWriter {}

    impl CatalogWriter for CatalogWriter {
        fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn delete_category(&self, category_id: i32) -> RepositoryResult<()>;
        fn import_catalog(&self, entries: &[CatalogEntry]) -> RepositoryResult<ImportSummary>;
    }
}

mock! {
    pub CartReader {}

    impl CartReader for CartReader {
        fn get_cart_by_session_key(&self, session_key: &str) -> RepositoryResult<Option<Cart>>;
        fn list_cart_lines(&self, cart_id: i32) -> RepositoryResult<Vec<CartLine>>;
        fn cart_totals(&self, cart_id: i32) -> RepositoryResult<CartTotals>;
    }
}

mock! {
    pub CartWriter {}

    impl CartWriter for CartWriter {
        fn create_cart(&self, session_key: &str) -> RepositoryResult<Cart>;
        fn add_product_to_cart(&self, cart_id: i32, product_id: i32, quantity: i32) -> RepositoryResult<CartItem>;
        fn set_cart_item_quantity(&self, cart_id: i32, item_id: i32, quantity: i32) -> RepositoryResult<Option<CartItem>>;
        fn remove_cart_item(&self, cart_id: i32, item_id: i32) -> RepositoryResult<()>;
        fn clear_cart(&self, cart_id: i32) -> RepositoryResult<usize>;
    }
}
