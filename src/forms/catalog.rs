use std::io::Read;

use csv::Trim;
use pushkind_common::routes::empty_string_as_none;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::price::CENTS_PER_UNIT;
use crate::domain::product::NewProduct;

/// Maximum allowed length for category and product names.
const NAME_MAX_LEN: usize = 100;

/// Separator between extra gallery images in the `images` column.
const IMAGES_SEPARATOR: char = '|';

/// Result type returned by the catalog import helpers.
pub type CatalogFormResult<T> = Result<T, CatalogFormError>;

/// Errors that can occur while parsing a catalog CSV file.
#[derive(Debug, Error)]
pub enum CatalogFormError {
    #[error("row {row} is missing a category name")]
    MissingCategory { row: usize },
    #[error("row {row} is missing a product name")]
    MissingName { row: usize },
    #[error("row {row}: name is longer than 100 characters")]
    NameTooLong { row: usize },
    #[error("row {row} has invalid price `{value}`")]
    InvalidPrice { row: usize, value: String },
    #[error("row {row}: cannot derive a slug from `{value}`")]
    EmptySlug { row: usize, value: String },
    #[error("upload contains no products")]
    EmptyUpload,
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One parsed catalog row. The product is attached to its category by name
/// once the category has been resolved.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    pub category: String,
    pub category_slug: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub price_cents: i64,
    pub description: String,
    pub main_image: String,
    pub images: Vec<String>,
}

impl CatalogRow {
    /// Build the insert payload for the product once its category is known.
    pub fn to_new_product(&self, category_id: i32) -> NewProduct {
        let mut product = NewProduct::new(category_id, self.name.clone(), self.price_cents)
            .with_description(self.description.clone())
            .with_main_image(self.main_image.clone());

        if let Some(slug) = &self.slug {
            product = product.with_slug(slug);
        }

        for image in &self.images {
            product = product.with_image(image.clone());
        }

        product
    }
}

#[derive(Deserialize)]
struct CatalogCsvRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category_slug: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    slug: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    main_image: Option<String>,
    #[serde(default)]
    images: Option<String>,
}

/// Parse a catalog CSV with a header row into validated rows.
pub fn parse_catalog<R: Read>(reader: R) -> CatalogFormResult<Vec<CatalogRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();

    // Row numbers are 1-based and skip the header line.
    for (index, record) in csv_reader.deserialize::<CatalogCsvRow>().enumerate() {
        let row = index + 2;
        let record = record?;

        let category = record
            .category
            .map(|value| sanitize_inline_text(&value))
            .filter(|value| !value.is_empty())
            .ok_or(CatalogFormError::MissingCategory { row })?;

        let name = record
            .name
            .map(|value| sanitize_inline_text(&value))
            .filter(|value| !value.is_empty())
            .ok_or(CatalogFormError::MissingName { row })?;

        if name.chars().count() > NAME_MAX_LEN || category.chars().count() > NAME_MAX_LEN {
            return Err(CatalogFormError::NameTooLong { row });
        }

        let raw_price = record.price.unwrap_or_default();
        let price_cents = parse_price(&raw_price).ok_or(CatalogFormError::InvalidPrice {
            row,
            value: raw_price.clone(),
        })?;

        let candidate = NewProduct::new(0, name.clone(), price_cents)
            .with_slug(record.slug.as_deref().unwrap_or_default());
        if candidate.slug.is_empty() {
            return Err(CatalogFormError::EmptySlug { row, value: name });
        }

        let images = record
            .images
            .unwrap_or_default()
            .split(IMAGES_SEPARATOR)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();

        rows.push(CatalogRow {
            category,
            category_slug: record.category_slug,
            name,
            slug: record.slug,
            price_cents,
            description: record.description.unwrap_or_default(),
            main_image: record.main_image.unwrap_or_default(),
            images,
        });
    }

    if rows.is_empty() {
        return Err(CatalogFormError::EmptyUpload);
    }

    Ok(rows)
}

/// Parse a non-negative decimal price with at most two fractional digits
/// into cents.
pub fn parse_price(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    let (units, fraction) = match trimmed.split_once('.') {
        Some((units, fraction)) => (units, fraction),
        None => (trimmed, ""),
    };

    if units.is_empty() || !units.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    if fraction.len() > 2 || !fraction.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let units = units.parse::<i64>().ok()?;
    let cents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse::<i64>().ok()?,
    };

    units.checked_mul(CENTS_PER_UNIT)?.checked_add(cents)
}

fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}
