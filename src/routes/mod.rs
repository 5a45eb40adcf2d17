use actix_web::http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use actix_web::{HttpRequest, HttpResponse, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde_json::json;

pub mod cart;
pub mod catalog;

/// Register every shop handler on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(catalog::show_catalog)
        .service(catalog::show_category)
        .service(catalog::show_product)
        .service(cart::show_cart_modal)
        .service(cart::show_cart_summary)
        .service(cart::cart_count)
        .service(cart::add_to_cart)
        .service(cart::update_cart_item)
        .service(cart::remove_cart_item)
        .service(cart::clear_cart);
}

/// Header set by htmx on every request it issues.
pub const HX_REQUEST_HEADER: &str = "HX-Request";

/// Whether the request came from the interactive htmx client and expects an
/// HTML fragment rather than JSON.
pub fn is_htmx(req: &HttpRequest) -> bool {
    req.headers()
        .get(HX_REQUEST_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Unwrap an extracted urlencoded form.
///
/// A request without a body reads as an empty form. Any other extraction
/// failure (wrong content type, undecodable body) becomes a JSON 400 with the
/// same `{error, errors}` shape as a validation failure.
pub fn form_or_default<T: Default>(
    req: &HttpRequest,
    form: Result<web::Form<T>, actix_web::Error>,
    message: &str,
) -> Result<T, HttpResponse> {
    match form {
        Ok(web::Form(form)) => Ok(form),
        Err(_) if has_no_body(req) => Ok(T::default()),
        Err(err) => {
            log::debug!("Rejected form body: {err}");
            Err(HttpResponse::BadRequest().json(json!({
                "error": message,
                "errors": { "form": [err.to_string()] },
            })))
        }
    }
}

fn has_no_body(req: &HttpRequest) -> bool {
    let headers = req.headers();
    if headers.contains_key(CONTENT_TYPE) || headers.contains_key(TRANSFER_ENCODING) {
        return false;
    }

    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .is_none_or(|length| length == 0)
}

/// Flash message texts to show in the next rendered page.
pub fn alerts(flash_messages: &IncomingFlashMessages) -> Vec<String> {
    flash_messages
        .iter()
        .map(|message| message.content().to_string())
        .collect()
}
