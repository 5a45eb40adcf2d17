use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, ProductImage as DomainProductImage,
};
use crate::models::category::Category;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Category))]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub slug: String,
    pub price_cents: i64,
    pub description: String,
    pub main_image: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub category_id: i32,
    pub name: &'a str,
    pub slug: &'a str,
    pub price_cents: i64,
    pub description: &'a str,
    pub main_image: &'a str,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Product))]
#[diesel(table_name = crate::schema::product_images)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub image: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage<'a> {
    pub product_id: i32,
    pub image: &'a str,
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        Self {
            id: value.id,
            category_id: value.category_id,
            name: value.name,
            slug: value.slug,
            price_cents: value.price_cents,
            description: value.description,
            main_image: value.main_image,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<ProductImage> for DomainProductImage {
    fn from(value: ProductImage) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            image: value.image,
        }
    }
}

impl<'a> From<&'a DomainNewProduct> for NewProduct<'a> {
    fn from(value: &'a DomainNewProduct) -> Self {
        Self {
            category_id: value.category_id,
            name: value.name.as_str(),
            slug: value.slug.as_str(),
            price_cents: value.price_cents,
            description: value.description.as_str(),
            main_image: value.main_image.as_str(),
            updated_at: value.updated_at,
        }
    }
}
