use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use pushkind_common::routes::render_template;
use tera::{Context, Tera};

use crate::repository::DieselRepository;
use crate::routes::alerts;
use crate::services::catalog::{CatalogPageData, CatalogQuery};
use crate::services::{ServiceError, catalog as catalog_service};

#[get("/")]
pub async fn show_catalog(
    params: web::Query<CatalogQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match catalog_service::load_catalog_page(repo.get_ref(), None, params.into_inner()) {
        Ok(data) => render_catalog(&tera, data, &flash_messages),
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/category/{slug}")]
pub async fn show_category(
    path: web::Path<String>,
    params: web::Query<CatalogQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let slug = path.into_inner();

    match catalog_service::load_catalog_page(repo.get_ref(), Some(&slug), params.into_inner()) {
        Ok(data) => render_catalog(&tera, data, &flash_messages),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to list products of category {slug}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/product/{slug}")]
pub async fn show_product(
    path: web::Path<String>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let slug = path.into_inner();

    match catalog_service::load_product_page(repo.get_ref(), &slug) {
        Ok(data) => {
            let mut context = Context::new();
            context.insert("product", &data.product);
            context.insert("images", &data.images);
            context.insert("categories", &data.categories);
            context.insert("alerts", &alerts(&flash_messages));
            render_template(&tera, "catalog/product.html", &context)
        }
        Err(ServiceError::NotFound) => HttpResponse::NotFound().finish(),
        Err(err) => {
            log::error!("Failed to load product {slug}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn render_catalog(
    tera: &Tera,
    data: CatalogPageData,
    flash_messages: &IncomingFlashMessages,
) -> HttpResponse {
    let mut context = Context::new();
    context.insert("products", &data.products);
    context.insert("page", &data.page);
    context.insert("total_pages", &data.total_pages);
    context.insert("categories", &data.categories);
    context.insert("category", &data.category);
    context.insert("alerts", &alerts(flash_messages));
    render_template(tera, "catalog/index.html", &context)
}
