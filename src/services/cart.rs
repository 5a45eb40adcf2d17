use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::cart::{Cart, CartContents, CartItem, CartLine, CartTotals};
use crate::domain::price::{cents_to_f64, format_cents};
use crate::domain::product::Product;
use crate::forms::cart::{AddToCartForm, UpdateCartItemForm};
use crate::repository::{CartReader, CartWriter, CatalogReader};
use crate::services::session::{CartBinding, SessionState};
use crate::services::{ServiceError, ServiceResult};

/// Result of a successful add-to-cart request.
pub struct AddToCartOutcome {
    /// Line that now holds the product.
    pub item: CartItem,
    /// Product that was added.
    pub product: Product,
    /// Cart totals after the addition.
    pub totals: CartTotals,
}

/// Loads the cart of the current session with lines newest first.
pub fn load_cart<R, S>(repo: &R, binding: &CartBinding<'_, S>) -> ServiceResult<CartContents>
where
    R: CartReader + CartWriter + ?Sized,
    S: SessionState + ?Sized,
{
    let cart = binding.cart(repo)?;
    contents_of(repo, cart)
}

/// Returns the item count and subtotal of the current session's cart.
pub fn cart_totals<R, S>(repo: &R, binding: &CartBinding<'_, S>) -> ServiceResult<CartTotals>
where
    R: CartReader + CartWriter + ?Sized,
    S: SessionState + ?Sized,
{
    let cart = binding.cart(repo)?;
    repo.cart_totals(cart.id).map_err(ServiceError::from)
}

/// Adds a product, identified by slug, to the current session's cart.
pub fn add_to_cart<R, S>(
    repo: &R,
    binding: &CartBinding<'_, S>,
    product_slug: &str,
    form: AddToCartForm,
) -> ServiceResult<AddToCartOutcome>
where
    R: CatalogReader + CartReader + CartWriter + ?Sized,
    S: SessionState + ?Sized,
{
    let cart = binding.cart(repo)?;

    let product = repo
        .get_product_by_slug(product_slug)?
        .ok_or(ServiceError::NotFound)?;

    let quantity = form.into_quantity()?;

    let item = repo.add_product_to_cart(cart.id, product.id, quantity)?;
    let totals = repo.cart_totals(cart.id)?;

    log::info!(
        "Added {quantity} x product {} to cart {} (line quantity {})",
        product.id,
        cart.id,
        item.quantity
    );

    Ok(AddToCartOutcome {
        item,
        product,
        totals,
    })
}

/// Replaces the quantity of a line in the current session's cart.
///
/// A quantity of zero removes the line.
pub fn update_cart_item<R, S>(
    repo: &R,
    binding: &CartBinding<'_, S>,
    item_id: i32,
    form: UpdateCartItemForm,
) -> ServiceResult<CartContents>
where
    R: CartReader + CartWriter + ?Sized,
    S: SessionState + ?Sized,
{
    let cart = binding.cart(repo)?;

    let quantity = form.into_quantity()?;

    match repo.set_cart_item_quantity(cart.id, item_id, quantity)? {
        Some(item) => log::debug!("Cart {} line {} set to {}", cart.id, item.id, item.quantity),
        None => log::debug!("Cart {} line {item_id} removed by zero quantity", cart.id),
    }

    contents_of(repo, cart)
}

/// Removes a line from the current session's cart.
pub fn remove_cart_item<R, S>(
    repo: &R,
    binding: &CartBinding<'_, S>,
    item_id: i32,
) -> ServiceResult<CartContents>
where
    R: CartReader + CartWriter + ?Sized,
    S: SessionState + ?Sized,
{
    let cart = binding.cart(repo)?;

    repo.remove_cart_item(cart.id, item_id)?;

    contents_of(repo, cart)
}

/// Deletes every line of the current session's cart.
pub fn clear_cart<R, S>(repo: &R, binding: &CartBinding<'_, S>) -> ServiceResult<Cart>
where
    R: CartReader + CartWriter + ?Sized,
    S: SessionState + ?Sized,
{
    let cart = binding.cart(repo)?;

    let removed = repo.clear_cart(cart.id)?;
    log::info!("Cleared {removed} lines from cart {}", cart.id);

    Ok(cart.clone())
}

fn contents_of<R>(repo: &R, cart: &Cart) -> ServiceResult<CartContents>
where
    R: CartReader + ?Sized,
{
    let lines = repo.list_cart_lines(cart.id)?;
    Ok(CartContents::new(cart.clone(), lines))
}

/// JSON body returned by the count endpoint.
#[derive(Debug, Serialize, PartialEq)]
pub struct CartCountView {
    pub total_items: i64,
    pub subtotal: f64,
}

impl From<CartTotals> for CartCountView {
    fn from(value: CartTotals) -> Self {
        Self {
            total_items: value.total_items,
            subtotal: cents_to_f64(value.subtotal_cents),
        }
    }
}

/// View model exposed to the cart templates.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: i32,
    pub items: Vec<CartLineView>,
    pub total_items: i64,
    pub subtotal: String,
    pub is_empty: bool,
}

/// Single line rendered in the cart templates.
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub id: i32,
    pub quantity: i32,
    pub added_at: NaiveDateTime,
    pub product_name: String,
    pub product_slug: String,
    pub main_image: String,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.item.id,
            quantity: line.item.quantity,
            added_at: line.item.added_at,
            product_name: line.product.name.clone(),
            product_slug: line.product.slug.clone(),
            main_image: line.product.main_image.clone(),
            unit_price: format_cents(line.product.price_cents),
            line_total: format_cents(line.total_cents()),
        }
    }
}

impl From<&CartContents> for CartView {
    fn from(contents: &CartContents) -> Self {
        Self {
            id: contents.cart.id,
            items: contents.lines.iter().map(CartLineView::from).collect(),
            total_items: contents.totals.total_items,
            subtotal: format_cents(contents.totals.subtotal_cents),
            is_empty: contents.lines.is_empty(),
        }
    }
}
