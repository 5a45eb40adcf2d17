use chrono::{Local, NaiveDateTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

use crate::domain::category::NewCategory;
use crate::domain::slug::slugify;

/// Domain representation of a catalog product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Category the product belongs to.
    pub category_id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// Unique URL-safe identifier derived from the name.
    pub slug: String,
    /// Price represented in cents.
    pub price_cents: i64,
    /// Longer description shown on the product page. May be empty.
    pub description: String,
    /// Path of the main product image.
    pub main_image: String,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

/// Extra gallery image attached to a product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image: String,
}

/// Payload required to insert a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Category the product belongs to.
    pub category_id: i32,
    /// Human-readable name of the product.
    pub name: String,
    /// URL-safe identifier; derived from `name` unless set explicitly.
    pub slug: String,
    /// Price represented in cents.
    pub price_cents: i64,
    /// Longer description shown on the product page.
    pub description: String,
    /// Path of the main product image.
    pub main_image: String,
    /// Extra gallery images stored alongside the product.
    pub images: Vec<String>,
    /// Timestamp captured when the product payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a new product payload with a slug derived from the name.
    pub fn new(category_id: i32, name: impl Into<String>, price_cents: i64) -> Self {
        let name = name.into();
        Self {
            category_id,
            slug: slugify(&name),
            name,
            price_cents,
            description: String::new(),
            main_image: String::new(),
            images: Vec::new(),
            updated_at: Local::now().naive_utc(),
        }
    }

    /// Override the derived slug. Blank values keep the derived one.
    pub fn with_slug(mut self, slug: impl AsRef<str>) -> Self {
        let slug = slugify(slug.as_ref());
        if !slug.is_empty() {
            self.slug = slug;
        }
        self
    }

    /// Attach a descriptive text to the product payload.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach the main image path to the product payload.
    pub fn with_main_image(mut self, main_image: impl Into<String>) -> Self {
        self.main_image = main_image.into();
        self
    }

    /// Attach an extra gallery image to the product payload.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.images.push(image.into());
        self
    }
}

/// One product of a bulk catalog load together with the category it goes
/// into. The category is matched by slug and created when missing, so
/// `product.category_id` is ignored.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub category: NewCategory,
    pub product: NewProduct,
}

/// Counters reported after a catalog import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories_created: usize,
    pub products_created: usize,
    /// Products whose slug already existed and were left untouched.
    pub products_skipped: usize,
}

/// Query definition used to list catalog products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Optional category filter.
    pub category_id: Option<i32>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    /// Construct a query that targets the whole catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the results to a single category.
    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
