use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::category::{Category as DomainCategory, NewCategory as DomainNewCategory};
use crate::domain::product::{
    CatalogEntry, ImportSummary, NewProduct as DomainNewProduct, Product as DomainProduct, ProductImage as DomainProductImage,
    ProductListQuery,
};
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::models::product::{
    NewProduct as DbNewProduct, NewProductImage as DbNewProductImage, Product as DbProduct,
    ProductImage as DbProductImage,
};
use crate::repository::{CatalogReader, CatalogWriter, DieselRepository};

impl CatalogReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let categories = categories::table
            .order(categories::name.asc())
            .load::<DbCategory>(&mut conn)?;

        Ok(categories.into_iter().map(DomainCategory::from).collect())
    }

    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::slug.eq(slug))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(DomainCategory::from))
    }

    fn get_product_by_slug(&self, slug: &str) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::slug.eq(slug))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(DomainProduct::from))
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut count_query = products::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(category_id) = query.category_id {
            count_query = count_query.filter(products::category_id.eq(category_id));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(category_id) = query.category_id {
            items = items.filter(products::category_id.eq(category_id));
        }

        items = items.order((products::created_at.desc(), products::id.desc()));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let products = items.load::<DbProduct>(&mut conn)?;

        Ok((
            total,
            products.into_iter().map(DomainProduct::from).collect(),
        ))
    }

    fn list_product_images(&self, product_id: i32) -> RepositoryResult<Vec<DomainProductImage>> {
        use crate::schema::product_images;

        let mut conn = self.conn()?;

        let images = product_images::table
            .filter(product_images::product_id.eq(product_id))
            .order(product_images::id.asc())
            .load::<DbProductImage>(&mut conn)?;

        Ok(images.into_iter().map(DomainProductImage::from).collect())
    }
}

impl CatalogWriter for DieselRepository {
    fn create_category(
        &self,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let insertable = DbNewCategory::from(new_category);

        let created = diesel::insert_into(categories::table)
            .values(&insertable)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(created.into())
    }

    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            insert_product(conn, new_product).map(DomainProduct::from)
        })
    }

    fn delete_category(&self, category_id: i32) -> RepositoryResult<()> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            delete_products_of_category(conn, category_id)?;

            let deleted = diesel::delete(categories::table.filter(categories::id.eq(category_id)))
                .execute(conn)?;

            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
    }

    fn import_catalog(&self, entries: &[CatalogEntry]) -> RepositoryResult<ImportSummary> {
        use crate::schema::{categories, products};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<ImportSummary, RepositoryError, _>(|conn| {
            let mut summary = ImportSummary::default();
            let mut category_ids: HashMap<&str, i32> = HashMap::new();

            for entry in entries {
                let slug = entry.category.slug.as_str();
                let category_id = match category_ids.get(slug) {
                    Some(id) => *id,
                    None => {
                        let existing = categories::table
                            .filter(categories::slug.eq(slug))
                            .select(categories::id)
                            .first::<i32>(conn)
                            .optional()?;
                        let id = match existing {
                            Some(id) => id,
                            None => {
                                summary.categories_created += 1;
                                diesel::insert_into(categories::table)
                                    .values(&DbNewCategory::from(&entry.category))
                                    .returning(categories::id)
                                    .get_result::<i32>(conn)?
                            }
                        };
                        category_ids.insert(slug, id);
                        id
                    }
                };

                let taken = products::table
                    .filter(products::slug.eq(&entry.product.slug))
                    .select(products::id)
                    .first::<i32>(conn)
                    .optional()?
                    .is_some();
                if taken {
                    log::warn!("Skipping product `{}`: slug already exists", entry.product.slug);
                    summary.products_skipped += 1;
                    continue;
                }

                let product = DomainNewProduct {
                    category_id,
                    ..entry.product.clone()
                };
                insert_product(conn, &product)?;
                summary.products_created += 1;
            }

            Ok(summary)
        })
    }
}

fn insert_product(
    conn: &mut SqliteConnection,
    new_product: &DomainNewProduct,
) -> RepositoryResult<DbProduct> {
    use crate::schema::{product_images, products};

    let insertable = DbNewProduct::from(new_product);

    let created = diesel::insert_into(products::table)
        .values(&insertable)
        .get_result::<DbProduct>(conn)?;

    if !new_product.images.is_empty() {
        let images: Vec<DbNewProductImage> = new_product
            .images
            .iter()
            .map(|image| DbNewProductImage {
                product_id: created.id,
                image: image.as_str(),
            })
            .collect();

        diesel::insert_into(product_images::table)
            .values(&images)
            .execute(conn)?;
    }

    Ok(created)
}

/// Foreign keys are not guaranteed to be enforced on every SQLite connection,
/// so the cascade is spelled out.
fn delete_products_of_category(
    conn: &mut SqliteConnection,
    category_id: i32,
) -> RepositoryResult<()> {
    use crate::schema::{cart_items, product_images, products};

    let product_ids = products::table
        .filter(products::category_id.eq(category_id))
        .select(products::id)
        .load::<i32>(conn)?;

    if product_ids.is_empty() {
        return Ok(());
    }

    diesel::delete(cart_items::table.filter(cart_items::product_id.eq_any(&product_ids)))
        .execute(conn)?;
    diesel::delete(product_images::table.filter(product_images::product_id.eq_any(&product_ids)))
        .execute(conn)?;
    diesel::delete(products::table.filter(products::id.eq_any(&product_ids))).execute(conn)?;

    Ok(())
}
