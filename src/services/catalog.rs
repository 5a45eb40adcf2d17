use pushkind_common::pagination::DEFAULT_ITEMS_PER_PAGE;
use serde::{Deserialize, Serialize};

use crate::domain::category::{Category, NewCategory};
use crate::domain::price::format_cents;
pub use crate::domain::product::ImportSummary;
use crate::domain::product::{CatalogEntry, Product, ProductImage, ProductListQuery};
use crate::forms::catalog::{CatalogFormError, CatalogRow};
use crate::repository::{CatalogReader, CatalogWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the catalog pages.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
}

/// Data required to render the catalog listing.
pub struct CatalogPageData {
    /// Products of the current page displayed in the grid.
    pub products: Vec<ProductView>,
    /// Current page (1-based).
    pub page: usize,
    /// Number of pages available for the current filter.
    pub total_pages: usize,
    /// All categories, used for the navigation menu.
    pub categories: Vec<Category>,
    /// Category the listing is filtered to, when any.
    pub category: Option<Category>,
}

/// Data required to render a single product page.
pub struct ProductPageData {
    pub product: ProductView,
    pub images: Vec<ProductImage>,
    pub categories: Vec<Category>,
}

/// View model exposed to the catalog templates.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub price: String,
    pub description: String,
    pub main_image: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            price: format_cents(product.price_cents),
            name: product.name,
            slug: product.slug,
            description: product.description,
            main_image: product.main_image,
        }
    }
}

/// Loads the catalog listing, optionally filtered to one category.
pub fn load_catalog_page<R>(
    repo: &R,
    category_slug: Option<&str>,
    query: CatalogQuery,
) -> ServiceResult<CatalogPageData>
where
    R: CatalogReader + ?Sized,
{
    let category = match category_slug {
        Some(slug) => Some(
            repo.get_category_by_slug(slug)?
                .ok_or(ServiceError::NotFound)?,
        ),
        None => None,
    };

    let page = query.page.unwrap_or(1).max(1);
    let mut list_query = ProductListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(category) = &category {
        list_query = list_query.category(category.id);
    }

    let (total, items) = repo.list_products(list_query)?;
    let categories = repo.list_categories()?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    let products = items.into_iter().map(ProductView::from).collect();

    Ok(CatalogPageData {
        products,
        page,
        total_pages,
        categories,
        category,
    })
}

/// Loads a single product together with its gallery images.
pub fn load_product_page<R>(repo: &R, slug: &str) -> ServiceResult<ProductPageData>
where
    R: CatalogReader + ?Sized,
{
    let product = repo
        .get_product_by_slug(slug)?
        .ok_or(ServiceError::NotFound)?;

    let images = repo.list_product_images(product.id)?;
    let categories = repo.list_categories()?;

    Ok(ProductPageData {
        product: product.into(),
        images,
        categories,
    })
}

/// Creates the categories and products described by parsed catalog rows.
///
/// Categories are matched by slug and created when missing. Products whose
/// slug is already taken are skipped. The rows are loaded in one transaction,
/// so a failure leaves the catalog unchanged.
pub fn import_catalog<R>(repo: &R, rows: &[CatalogRow]) -> ServiceResult<ImportSummary>
where
    R: CatalogWriter + ?Sized,
{
    let mut entries = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let mut category = NewCategory::new(row.category.clone());
        if let Some(slug) = &row.category_slug {
            category = category.with_slug(slug);
        }
        if category.slug.is_empty() {
            return Err(ServiceError::Catalog(CatalogFormError::EmptySlug {
                row: index + 2,
                value: row.category.clone(),
            }));
        }

        // The repository resolves the category id.
        let product = row.to_new_product(0);
        if product.slug.is_empty() {
            return Err(ServiceError::Catalog(CatalogFormError::EmptySlug {
                row: index + 2,
                value: row.name.clone(),
            }));
        }

        entries.push(CatalogEntry { category, product });
    }

    let summary = repo.import_catalog(&entries)?;
    log::info!(
        "Catalog import: {} products created, {} skipped, {} new categories",
        summary.products_created,
        summary.products_skipped,
        summary.categories_created
    );

    Ok(summary)
}
