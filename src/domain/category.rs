use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::slug::slugify;

/// Domain representation of a catalog category.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    /// Unique identifier of the category.
    pub id: i32,
    /// Human-readable name of the category.
    pub name: String,
    /// Unique URL-safe identifier derived from the name.
    pub slug: String,
    /// Timestamp for when the category record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the category record.
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// Human-readable name of the category.
    pub name: String,
    /// URL-safe identifier; derived from `name` unless set explicitly.
    pub slug: String,
    /// Timestamp captured when the category payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewCategory {
    /// Build a new category payload whose slug is derived from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            slug: slugify(&name),
            name,
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
}
