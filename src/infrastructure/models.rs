use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::order::{NewOrder, Order, OrderChanges, OrderedItem};
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::schema::{inventories, ordered_items, orders};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = inventories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: BigDecimal,
    pub description: String,
    pub quantity: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            slug: row.slug,
            price: row.price,
            description: row.description,
            quantity: row.quantity,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = inventories)]
pub struct NewProductRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
    pub price: &'a BigDecimal,
    pub description: &'a str,
    pub quantity: i32,
    pub active: bool,
}

impl<'a> From<&'a NewProduct> for NewProductRow<'a> {
    fn from(p: &'a NewProduct) -> Self {
        NewProductRow {
            id: Uuid::new_v4(),
            name: &p.name,
            slug: &p.slug,
            price: &p.price,
            description: &p.description,
            quantity: p.quantity,
            active: p.active,
        }
    }
}

/// `None` fields are left out of the UPDATE; `updated_at` is always set.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = inventories)]
pub struct ProductChangeset<'a> {
    pub name: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub price: Option<&'a BigDecimal>,
    pub description: Option<&'a str>,
    pub quantity: Option<i32>,
    pub active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a ProductChanges> for ProductChangeset<'a> {
    fn from(c: &'a ProductChanges) -> Self {
        ProductChangeset {
            name: c.name.as_deref(),
            slug: c.slug.as_deref(),
            price: c.price.as_ref(),
            description: c.description.as_deref(),
            quantity: c.quantity,
            active: c.active,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub email: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            email: row.email,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub status: bool,
}

impl<'a> From<&'a NewOrder> for NewOrderRow<'a> {
    fn from(o: &'a NewOrder) -> Self {
        NewOrderRow {
            id: Uuid::new_v4(),
            email: &o.email,
            status: o.status,
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset<'a> {
    pub email: Option<&'a str>,
    pub status: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a OrderChanges> for OrderChangeset<'a> {
    fn from(c: &'a OrderChanges) -> Self {
        OrderChangeset {
            email: c.email.as_deref(),
            status: c.status,
            updated_at: Utc::now(),
        }
    }
}

#[derive(
    Debug, Clone, Queryable, Selectable, Identifiable, Associations, Insertable,
)]
#[diesel(table_name = ordered_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderedItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<OrderedItemRow> for OrderedItem {
    fn from(row: OrderedItemRow) -> Self {
        OrderedItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
        }
    }
}

impl From<&OrderedItem> for OrderedItemRow {
    fn from(item: &OrderedItem) -> Self {
        OrderedItemRow {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            created_at: item.created_at,
        }
    }
}
