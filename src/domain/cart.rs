use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Largest quantity accepted by a single add request.
pub const MAX_QUANTITY: i32 = 999;

/// Shopping cart bound to an anonymous session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Cart {
    /// Unique identifier of the cart.
    pub id: i32,
    /// Session key the cart belongs to.
    pub session_key: String,
    /// Timestamp for when the cart was first created.
    pub created_at: NaiveDateTime,
    /// Timestamp of the last mutation of the cart contents.
    pub updated_at: NaiveDateTime,
}

/// One product line in a cart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    /// Always positive; a line with zero quantity is deleted instead.
    pub quantity: i32,
    pub added_at: NaiveDateTime,
}

/// Cart item joined with the product it references.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    /// Price of the line: quantity multiplied by the product price.
    pub fn total_cents(&self) -> i64 {
        i64::from(self.item.quantity) * self.product.price_cents
    }
}

/// Aggregated cart figures.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of quantities across all lines.
    pub total_items: i64,
    /// Sum of `quantity * price` across all lines, in cents.
    pub subtotal_cents: i64,
}

impl CartTotals {
    /// Fold the totals over the supplied lines.
    pub fn from_lines(lines: &[CartLine]) -> Self {
        lines.iter().fold(Self::default(), |acc, line| Self {
            total_items: acc.total_items + i64::from(line.item.quantity),
            subtotal_cents: acc.subtotal_cents + line.total_cents(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

/// Snapshot of a cart with its lines ordered newest-added first.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CartContents {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl CartContents {
    /// Build the snapshot, computing totals from `lines`.
    pub fn new(cart: Cart, lines: Vec<CartLine>) -> Self {
        let totals = CartTotals::from_lines(&lines);
        Self {
            cart,
            lines,
            totals,
        }
    }
}
