use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ProductService;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::errors::AppError;

use super::{blocking_error, object, objects};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInventoryRequest {
    pub name: String,
    pub description: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    /// Defaults to `true`.
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInventoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<i32>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: String,
    pub quantity: i32,
    pub active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<Product> for InventoryResponse {
    fn from(p: Product) -> Self {
        InventoryResponse {
            id: p.id,
            name: p.name,
            slug: p.slug,
            description: p.description,
            price: p.price.to_string(),
            quantity: p.quantity,
            active: p.active,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

fn parse_price(raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim()).map_err(|_| AppError::BadRequest {
        field: Some("price"),
        message: "A valid number is required.".to_string(),
    })
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /inventories
#[utoipa::path(
    get,
    path = "/inventories",
    responses(
        (status = 200, description = "All inventory items, wrapped as {\"objects\": [...]}", body = [InventoryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inventories"
)]
pub async fn list_inventories(
    service: web::Data<ProductService>,
) -> Result<HttpResponse, AppError> {
    let products = web::block(move || service.list_products())
        .await
        .map_err(blocking_error)??;

    Ok(objects(
        products.into_iter().map(InventoryResponse::from).collect(),
    ))
}

/// POST /inventories
#[utoipa::path(
    post,
    path = "/inventories",
    request_body = CreateInventoryRequest,
    responses(
        (status = 201, description = "Inventory created", body = InventoryResponse),
        (status = 400, description = "Invalid payload or the inventory exists"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inventories"
)]
pub async fn create_inventory(
    service: web::Data<ProductService>,
    body: web::Json<CreateInventoryRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let new = NewProduct::new(
        &body.name,
        parse_price(&body.price)?,
        body.description,
        body.quantity,
        body.active,
    )?;

    let product = web::block(move || service.create_product(new))
        .await
        .map_err(blocking_error)??;

    Ok(object(&mut HttpResponse::Created(), InventoryResponse::from(product)))
}

/// GET /inventories/{slug}
#[utoipa::path(
    get,
    path = "/inventories/{slug}",
    params(
        ("slug" = String, Path, description = "Inventory slug"),
    ),
    responses(
        (status = 200, description = "Inventory found", body = InventoryResponse),
        (status = 404, description = "Inventory not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inventories"
)]
pub async fn get_inventory(
    service: web::Data<ProductService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();

    let product = web::block(move || service.get_product(&slug))
        .await
        .map_err(blocking_error)??;

    Ok(object(&mut HttpResponse::Ok(), InventoryResponse::from(product)))
}

/// PUT /inventories/{slug}
#[utoipa::path(
    put,
    path = "/inventories/{slug}",
    params(
        ("slug" = String, Path, description = "Inventory slug"),
    ),
    request_body = UpdateInventoryRequest,
    responses(
        (status = 200, description = "Inventory updated", body = InventoryResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Inventory not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inventories"
)]
pub async fn update_inventory(
    service: web::Data<ProductService>,
    path: web::Path<String>,
    body: web::Json<UpdateInventoryRequest>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();
    let body = body.into_inner();
    let price = body.price.as_deref().map(parse_price).transpose()?;
    let changes = ProductChanges::new(
        body.name.as_deref(),
        price,
        body.description,
        body.quantity,
        body.active,
    )?;

    let product = web::block(move || service.update_product(&slug, changes))
        .await
        .map_err(blocking_error)??;

    Ok(object(&mut HttpResponse::Ok(), InventoryResponse::from(product)))
}

/// DELETE /inventories/{slug}
#[utoipa::path(
    delete,
    path = "/inventories/{slug}",
    params(
        ("slug" = String, Path, description = "Inventory slug"),
    ),
    responses(
        (status = 204, description = "Inventory deleted"),
        (status = 400, description = "Inventory is referenced by existing orders"),
        (status = 404, description = "Inventory not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "inventories"
)]
pub async fn delete_inventory(
    service: web::Data<ProductService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let slug = path.into_inner();

    web::block(move || service.delete_product(&slug))
        .await
        .map_err(blocking_error)??;

    Ok(HttpResponse::NoContent().finish())
}
