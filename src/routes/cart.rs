use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::routes::{redirect, render_template};
use serde_json::json;
use tera::{Context, Tera};

use crate::domain::cart::CartContents;
use crate::forms::cart::{AddToCartForm, CartFormError, UpdateCartItemForm};
use crate::repository::DieselRepository;
use crate::routes::{alerts, form_or_default, is_htmx};
use crate::services::cart::{CartCountView, CartView};
use crate::services::session::CartBinding;
use crate::services::{ServiceError, cart as cart_service};

const CART_MODAL_TEMPLATE: &str = "cart/cart_modal.html";
const CART_SUMMARY_TEMPLATE: &str = "cart/cart_summary.html";
const CART_EMPTY_TEMPLATE: &str = "cart/cart_empty.html";

const INVALID_FORM_MESSAGE: &str = "Invalid form data";
const INVALID_QUANTITY_MESSAGE: &str = "Invalid quantity";

#[get("/cart/modal")]
pub async fn show_cart_modal(
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let binding = CartBinding::new(&session);

    match cart_service::load_cart(repo.get_ref(), &binding) {
        Ok(contents) => render_cart(&tera, CART_MODAL_TEMPLATE, &contents, &flash_messages),
        Err(err) => {
            log::error!("Failed to load cart: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/cart/summary")]
pub async fn show_cart_summary(
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let binding = CartBinding::new(&session);

    match cart_service::load_cart(repo.get_ref(), &binding) {
        Ok(contents) => render_cart(&tera, CART_SUMMARY_TEMPLATE, &contents, &flash_messages),
        Err(err) => {
            log::error!("Failed to load cart summary: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/cart/count")]
pub async fn cart_count(session: Session, repo: web::Data<DieselRepository>) -> impl Responder {
    let binding = CartBinding::new(&session);

    match cart_service::cart_totals(repo.get_ref(), &binding) {
        Ok(totals) => HttpResponse::Ok().json(CartCountView::from(totals)),
        Err(err) => {
            log::error!("Failed to count cart items: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/cart/add/{slug}")]
pub async fn add_to_cart(
    req: HttpRequest,
    path: web::Path<String>,
    session: Session,
    repo: web::Data<DieselRepository>,
    form: Result<web::Form<AddToCartForm>, actix_web::Error>,
) -> impl Responder {
    let form = match form_or_default(&req, form, INVALID_FORM_MESSAGE) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let slug = path.into_inner();
    let binding = CartBinding::new(&session);

    match cart_service::add_to_cart(repo.get_ref(), &binding, &slug, form) {
        Ok(outcome) => {
            let message = format!("{} added to cart", outcome.product.name);
            if is_htmx(&req) {
                FlashMessage::success(message).send();
                redirect("/cart/modal")
            } else {
                HttpResponse::Ok().json(json!({
                    "success": true,
                    "total_items": outcome.totals.total_items,
                    "message": message,
                    "cart_item_id": outcome.item.id,
                }))
            }
        }
        Err(ServiceError::Form(err)) => form_error_response(INVALID_FORM_MESSAGE, &err),
        Err(ServiceError::NotFound) => {
            HttpResponse::NotFound().json(json!({ "error": "Product not found" }))
        }
        Err(err) => {
            log::error!("Failed to add product {slug} to cart: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/cart/update/{item_id}")]
pub async fn update_cart_item(
    req: HttpRequest,
    path: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    form: Result<web::Form<UpdateCartItemForm>, actix_web::Error>,
) -> impl Responder {
    let form = match form_or_default(&req, form, INVALID_QUANTITY_MESSAGE) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let item_id = path.into_inner();
    let binding = CartBinding::new(&session);

    match cart_service::update_cart_item(repo.get_ref(), &binding, item_id, form) {
        Ok(contents) => render_cart(&tera, CART_MODAL_TEMPLATE, &contents, &flash_messages),
        Err(ServiceError::Form(err)) => form_error_response(INVALID_QUANTITY_MESSAGE, &err),
        Err(ServiceError::NotFound) => {
            HttpResponse::NotFound().json(json!({ "error": "Item not found" }))
        }
        Err(err) => {
            log::error!("Failed to update cart item {item_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/cart/remove/{item_id}")]
pub async fn remove_cart_item(
    path: web::Path<i32>,
    session: Session,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let item_id = path.into_inner();
    let binding = CartBinding::new(&session);

    match cart_service::remove_cart_item(repo.get_ref(), &binding, item_id) {
        Ok(contents) => render_cart(&tera, CART_MODAL_TEMPLATE, &contents, &flash_messages),
        Err(ServiceError::NotFound) => {
            HttpResponse::BadRequest().json(json!({ "error": "Item not found" }))
        }
        Err(err) => {
            log::error!("Failed to remove cart item {item_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/cart/clear")]
pub async fn clear_cart(
    req: HttpRequest,
    session: Session,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let binding = CartBinding::new(&session);

    match cart_service::clear_cart(repo.get_ref(), &binding) {
        Ok(cart) => {
            if is_htmx(&req) {
                let mut context = Context::new();
                context.insert("cart_id", &cart.id);
                render_template(&tera, CART_EMPTY_TEMPLATE, &context)
            } else {
                HttpResponse::Ok().json(json!({
                    "success": true,
                    "message": "Cart cleared",
                }))
            }
        }
        Err(err) => {
            log::error!("Failed to clear cart: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn render_cart(
    tera: &Tera,
    template: &str,
    contents: &CartContents,
    flash_messages: &IncomingFlashMessages,
) -> HttpResponse {
    let mut context = Context::new();
    context.insert("cart", &CartView::from(contents));
    context.insert("alerts", &alerts(flash_messages));
    render_template(tera, template, &context)
}

fn form_error_response(message: &str, err: &CartFormError) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "error": message,
        "errors": err.field_errors(),
    }))
}
