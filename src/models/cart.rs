use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::cart::{Cart as DomainCart, CartItem as DomainCartItem};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::carts)]
pub struct Cart {
    pub id: i32,
    pub session_key: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::carts)]
pub struct NewCart<'a> {
    pub session_key: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Cart))]
#[diesel(table_name = crate::schema::cart_items)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub added_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::cart_items)]
pub struct NewCartItem {
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub added_at: NaiveDateTime,
}

impl From<Cart> for DomainCart {
    fn from(value: Cart) -> Self {
        Self {
            id: value.id,
            session_key: value.session_key,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<CartItem> for DomainCartItem {
    fn from(value: CartItem) -> Self {
        Self {
            id: value.id,
            cart_id: value.cart_id,
            product_id: value.product_id,
            quantity: value.quantity,
            added_at: value.added_at,
        }
    }
}
