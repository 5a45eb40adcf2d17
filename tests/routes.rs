use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use serde_json::Value;
use tera::Tera;

use pushkind_cart::routes;

mod common;

const SESSION_COOKIE: &str = "id";

fn tera() -> Tera {
    Tera::new("templates/**/*").expect("templates parse")
}

macro_rules! shop_app {
    ($repo:expr) => {{
        let key = Key::generate();
        let message_store = CookieMessageStore::builder(key.clone()).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        test::init_service(
            App::new()
                .wrap(message_framework)
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), key)
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::new(tera()))
                .app_data(web::Data::new($repo))
                .configure(routes::configure),
        )
        .await
    }};
}

fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .expect("session cookie set")
        .into_owned()
}

#[test]
fn templates_parse() {
    let tera = tera();
    let names: Vec<&str> = tera.get_template_names().collect();
    for expected in [
        "base.html",
        "catalog/index.html",
        "catalog/product.html",
        "cart/cart_modal.html",
        "cart/cart_summary.html",
        "cart/cart_empty.html",
    ] {
        assert!(names.contains(&expected), "missing template {expected}");
    }
}

#[actix_web::test]
async fn catalog_pages_render() {
    let test_db = common::TestDb::new("routes_catalog_pages_render.db");
    let repo = test_db.repo();
    common::seed_catalog(&repo);
    let app = shop_app!(repo);

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("Green Tea"));
    assert!(html.contains("10.00"));

    let req = test::TestRequest::get().uri("/category/tea").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/product/black-tea").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("2.50"));

    let req = test::TestRequest::get().uri("/product/oolong").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/category/coffee").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn cart_json_flow() {
    let test_db = common::TestDb::new("routes_cart_json_flow.db");
    let repo = test_db.repo();
    common::seed_catalog(&repo);
    let app = shop_app!(repo);

    let req = test::TestRequest::post()
        .uri("/cart/add/green-tea")
        .set_form([("quantity", "2")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total_items"], 2);
    let item_id = body["cart_item_id"].as_i64().expect("item id");

    let req = test::TestRequest::get()
        .uri("/cart/count")
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["subtotal"], 20.0);

    let req = test::TestRequest::post()
        .uri(&format!("/cart/update/{item_id}"))
        .cookie(cookie.clone())
        .set_form([("quantity", "3")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("30.00"));

    let req = test::TestRequest::post()
        .uri("/cart/clear")
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Cart cleared");

    let req = test::TestRequest::get()
        .uri("/cart/count")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["subtotal"], 0.0);
}

#[actix_web::test]
async fn cart_error_responses() {
    let test_db = common::TestDb::new("routes_cart_error_responses.db");
    let repo = test_db.repo();
    common::seed_catalog(&repo);
    let app = shop_app!(repo);

    let req = test::TestRequest::post()
        .uri("/cart/add/oolong")
        .set_form([("quantity", "1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let cookie = session_cookie(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Product not found");

    let req = test::TestRequest::post()
        .uri("/cart/add/green-tea")
        .cookie(cookie.clone())
        .set_form([("quantity", "0")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid form data");
    assert!(body["errors"]["quantity"].is_array());

    let req = test::TestRequest::post()
        .uri("/cart/update/9999")
        .cookie(cookie.clone())
        .set_form([("quantity", "2")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Item not found");

    let req = test::TestRequest::post()
        .uri("/cart/update/9999")
        .cookie(cookie.clone())
        .set_form([("quantity", "abc")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid quantity");

    let req = test::TestRequest::post()
        .uri("/cart/remove/9999")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Item not found");
}

#[actix_web::test]
async fn htmx_requests_get_fragments() {
    let test_db = common::TestDb::new("routes_htmx_requests_get_fragments.db");
    let repo = test_db.repo();
    common::seed_catalog(&repo);
    let app = shop_app!(repo);

    let req = test::TestRequest::post()
        .uri("/cart/add/black-tea")
        .insert_header((routes::HX_REQUEST_HEADER, "true"))
        .set_form([("quantity", "4")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers()
            .get(actix_web::http::header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/cart/modal")
    );
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::get()
        .uri("/cart/modal")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("Black Tea"));
    assert!(html.contains("10.00"));

    let req = test::TestRequest::get()
        .uri("/cart/summary")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/cart/clear")
        .cookie(cookie)
        .insert_header((routes::HX_REQUEST_HEADER, "true"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Your cart is empty."));
}

#[actix_web::test]
async fn add_without_body_defaults_to_one() {
    let test_db = common::TestDb::new("routes_add_without_body_defaults_to_one.db");
    let repo = test_db.repo();
    common::seed_catalog(&repo);
    let app = shop_app!(repo);

    let req = test::TestRequest::post()
        .uri("/cart/add/green-tea")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total_items"], 1);
}

#[actix_web::test]
async fn non_form_bodies_get_json_errors() {
    let test_db = common::TestDb::new("routes_non_form_bodies_get_json_errors.db");
    let repo = test_db.repo();
    common::seed_catalog(&repo);
    let app = shop_app!(repo);

    let req = test::TestRequest::post()
        .uri("/cart/add/green-tea")
        .set_json(serde_json::json!({ "quantity": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid form data");
    assert!(body["errors"]["form"].is_array());

    let req = test::TestRequest::post()
        .uri("/cart/update/1")
        .set_json(serde_json::json!({ "quantity": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid quantity");

    // No body on update means no quantity.
    let req = test::TestRequest::post().uri("/cart/update/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid quantity");
    assert!(body["errors"]["quantity"].is_array());
}

#[actix_web::test]
async fn merged_quantity_can_be_resubmitted() {
    let test_db = common::TestDb::new("routes_merged_quantity_can_be_resubmitted.db");
    let repo = test_db.repo();
    common::seed_catalog(&repo);
    let app = shop_app!(repo);

    let req = test::TestRequest::post()
        .uri("/cart/add/black-tea")
        .set_form([("quantity", "999")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::post()
        .uri("/cart/add/black-tea")
        .cookie(cookie.clone())
        .set_form([("quantity", "999")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_items"], 1998);
    let item_id = body["cart_item_id"].as_i64().expect("item id");

    let req = test::TestRequest::post()
        .uri(&format!("/cart/update/{item_id}"))
        .cookie(cookie.clone())
        .set_form([("quantity", "1998")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/cart/count")
        .cookie(cookie)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_items"], 1998);
    assert_eq!(body["subtotal"], 4995.0);
}
