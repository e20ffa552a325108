use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::OrderService;
use crate::domain::order::{LineItemRequest, OrderLineView, OrderView};
use crate::errors::AppError;

use super::inventories::InventoryResponse;
use super::{blocking_error, object, objects};

// ── Request / response DTOs ──────────────────────────────────────────────────

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderedItemRequest {
    /// Inventory id
    pub product: Uuid,
    /// Defaults to 1; must be at least 1.
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

impl OrderedItemRequest {
    fn into_line(self) -> Result<LineItemRequest, AppError> {
        Ok(LineItemRequest::new(self.product, self.quantity)?)
    }
}

fn into_lines(items: Vec<OrderedItemRequest>) -> Result<Vec<LineItemRequest>, AppError> {
    items.into_iter().map(OrderedItemRequest::into_line).collect()
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub email: String,
    /// `false` creates the order without holding any stock.
    pub status: Option<bool>,
    #[serde(default)]
    pub ordered_items: Vec<OrderedItemRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub email: Option<String>,
    pub status: Option<bool>,
    /// Replaces the whole line-item set when present.
    pub ordered_items: Option<Vec<OrderedItemRequest>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveOrderItemRequest {
    pub item_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderedItemResponse {
    pub id: Uuid,
    pub product: InventoryResponse,
    pub quantity: i32,
}

impl From<OrderLineView> for OrderedItemResponse {
    fn from(line: OrderLineView) -> Self {
        OrderedItemResponse {
            id: line.id,
            product: line.product.into(),
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub email: String,
    pub status: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub ordered_items: Vec<OrderedItemResponse>,
    /// Sum of price × quantity over the line items, as a decimal string.
    pub total_price: String,
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        OrderResponse {
            id: view.order.id,
            email: view.order.email,
            status: view.order.status,
            created_at: view.order.created_at.to_rfc3339(),
            updated_at: view.order.updated_at.to_rfc3339(),
            ordered_items: view.lines.into_iter().map(Into::into).collect(),
            total_price: view.total_price.to_string(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All orders, wrapped as {\"objects\": [...]}", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(service: web::Data<OrderService>) -> Result<HttpResponse, AppError> {
    let views = web::block(move || service.list_orders())
        .await
        .map_err(blocking_error)??;

    Ok(objects(
        views.into_iter().map(OrderResponse::from).collect(),
    ))
}

/// POST /orders
///
/// Creates the order and reserves stock for every line item in one
/// transaction. If any line cannot be reserved nothing is written.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Validation or stock failure"),
        (status = 404, description = "Inventory not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let lines = into_lines(body.ordered_items)?;

    let view = web::block(move || service.create_order(&body.email, body.status, lines))
        .await
        .map_err(blocking_error)??;

    Ok(object(&mut HttpResponse::Created(), OrderResponse::from(view)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let view = web::block(move || service.get_order(order_id))
        .await
        .map_err(blocking_error)??;

    Ok(object(&mut HttpResponse::Ok(), OrderResponse::from(view)))
}

/// PUT /orders/{id}
///
/// Partial update. `ordered_items`, when given, replaces the current set:
/// old reservations are released before the new ones are taken.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Validation or stock failure"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let body = body.into_inner();
    let lines = body.ordered_items.map(into_lines).transpose();

    let view = web::block(move || -> Result<OrderView, AppError> {
        match lines {
            Ok(lines) => {
                Ok(service.update_order(order_id, body.email.as_deref(), body.status, lines)?)
            }
            // A missing order takes precedence over a malformed line.
            Err(e) => {
                service.get_order(order_id)?;
                Err(e)
            }
        }
    })
    .await
    .map_err(blocking_error)??;

    Ok(object(&mut HttpResponse::Ok(), OrderResponse::from(view)))
}

/// DELETE /orders/{id}
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 204, description = "Order deleted and its stock returned"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    web::block(move || service.delete_order(order_id))
        .await
        .map_err(blocking_error)??;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /orders/{id}/order_item
#[utoipa::path(
    post,
    path = "/orders/{id}/order_item",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = OrderedItemRequest,
    responses(
        (status = 201, description = "Line item added", body = OrderResponse),
        (status = 400, description = "Duplicate product, inactive product or not enough stock"),
        (status = 404, description = "Order or inventory not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn add_order_item(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
    body: web::Json<OrderedItemRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let line = body.into_inner().into_line()?;

    let view = web::block(move || service.add_line_item(order_id, line))
        .await
        .map_err(blocking_error)??;

    Ok(object(&mut HttpResponse::Created(), OrderResponse::from(view)))
}

/// DELETE /orders/{id}/order_item
#[utoipa::path(
    delete,
    path = "/orders/{id}/order_item",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = RemoveOrderItemRequest,
    responses(
        (status = 200, description = "Line item removed and its stock returned", body = OrderResponse),
        (status = 404, description = "Order or line item not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn remove_order_item(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
    body: web::Json<RemoveOrderItemRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let item_id = body.into_inner().item_id;

    let view = web::block(move || service.remove_line_item(order_id, item_id))
        .await
        .map_err(blocking_error)??;

    Ok(object(&mut HttpResponse::Ok(), OrderResponse::from(view)))
}
