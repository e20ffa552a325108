use std::collections::HashSet;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{DomainError, Resource};
use super::product::Product;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub email: String,
    /// `true` while the order's line items are counted against stock.
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A requested `(product, quantity)` pair with a positive quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl LineItemRequest {
    pub fn new(product_id: Uuid, quantity: i32) -> Result<Self, DomainError> {
        if quantity < 1 {
            return Err(DomainError::invalid_field(
                "quantity",
                "Ensure this value is greater than or equal to 1.",
            ));
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub email: String,
    pub status: bool,
}

impl NewOrder {
    pub fn new(email: &str, status: Option<bool>) -> Result<Self, DomainError> {
        Ok(Self {
            email: validate_email(email)?,
            status: status.unwrap_or(true),
        })
    }
}

/// Scalar fields of an order that a full update may change.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub email: Option<String>,
    pub status: Option<bool>,
}

impl OrderChanges {
    pub fn new(email: Option<&str>, status: Option<bool>) -> Result<Self, DomainError> {
        Ok(Self {
            email: email.map(validate_email).transpose()?,
            status,
        })
    }
}

fn validate_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(DomainError::invalid_field("email", "This field may not be blank."));
    }
    if !email.contains('@') {
        return Err(DomainError::invalid_field(
            "email",
            "Enter a valid email address.",
        ));
    }
    Ok(email.to_string())
}

/// Rejects a request set that names the same product twice.
pub fn ensure_distinct_products(items: &[LineItemRequest]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.product_id) {
            return Err(DomainError::DuplicateLineItem(item.product_id));
        }
    }
    Ok(())
}

/// One line-item mutation the order went through; each one is reconciled
/// against stock by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItemChange {
    Removed(OrderedItem),
    Added(OrderedItem),
}

/// An order together with its line items. At most one line item per product.
#[derive(Debug, Clone)]
pub struct OrderAggregate {
    pub order: Order,
    items: Vec<OrderedItem>,
}

impl OrderAggregate {
    pub fn new(order: Order, items: Vec<OrderedItem>) -> Self {
        Self { order, items }
    }

    pub fn items(&self) -> &[OrderedItem] {
        &self.items
    }

    pub fn into_parts(self) -> (Order, Vec<OrderedItem>) {
        (self.order, self.items)
    }

    pub fn contains_product(&self, product_id: Uuid) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }

    pub fn add_line_item(&mut self, request: LineItemRequest) -> Result<OrderedItem, DomainError> {
        if self.contains_product(request.product_id) {
            return Err(DomainError::DuplicateLineItem(request.product_id));
        }
        let item = OrderedItem {
            id: Uuid::new_v4(),
            order_id: self.order.id,
            product_id: request.product_id,
            quantity: request.quantity,
            created_at: Utc::now(),
        };
        self.items.push(item.clone());
        Ok(item)
    }

    pub fn remove_line_item(&mut self, item_id: Uuid) -> Result<OrderedItem, DomainError> {
        let idx = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or(DomainError::NotFound(Resource::LineItem))?;
        Ok(self.items.remove(idx))
    }

    /// Swaps the whole line-item set. Every removal is listed before any
    /// addition so stock is released before it is reserved again.
    pub fn replace_line_items(
        &mut self,
        requests: &[LineItemRequest],
    ) -> Result<Vec<LineItemChange>, DomainError> {
        ensure_distinct_products(requests)?;

        let mut changes: Vec<LineItemChange> = self
            .items
            .drain(..)
            .map(LineItemChange::Removed)
            .collect();
        for request in requests {
            let item = self.add_line_item(*request)?;
            changes.push(LineItemChange::Added(item));
        }
        Ok(changes)
    }

    /// Sum of `price * quantity` over the current line items. Items whose
    /// product is missing from `products` contribute nothing.
    pub fn total_price(&self, products: &[Product]) -> BigDecimal {
        self.items
            .iter()
            .filter_map(|item| {
                products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .map(|p| p.price.clone() * BigDecimal::from(item.quantity))
            })
            .fold(BigDecimal::from(0), |acc, line| acc + line)
            .with_scale(2)
    }
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub lines: Vec<OrderLineView>,
    pub total_price: BigDecimal,
}

impl OrderView {
    /// Joins the aggregate's line items with full product detail.
    pub fn assemble(aggregate: &OrderAggregate, products: &[Product]) -> Result<Self, DomainError> {
        let lines = aggregate
            .items()
            .iter()
            .map(|item| {
                let product = products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .cloned()
                    .ok_or(DomainError::NotFound(Resource::Product))?;
                Ok(OrderLineView {
                    id: item.id,
                    product,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Self {
            order: aggregate.order.clone(),
            lines,
            total_price: aggregate.total_price(products),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn order() -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            email: "test@test.com".to_string(),
            status: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn product(price: &str) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: format!("product {price}"),
            slug: format!("product-{price}"),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            description: String::new(),
            quantity: 100,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn req(product_id: Uuid, quantity: i32) -> LineItemRequest {
        LineItemRequest::new(product_id, quantity).expect("valid request")
    }

    #[test]
    fn line_item_request_rejects_non_positive_quantity() {
        assert!(LineItemRequest::new(Uuid::new_v4(), 0).is_err());
        assert!(LineItemRequest::new(Uuid::new_v4(), -3).is_err());
    }

    #[test]
    fn add_line_item_rejects_same_product_twice() {
        let mut agg = OrderAggregate::new(order(), vec![]);
        let p = Uuid::new_v4();
        agg.add_line_item(req(p, 1)).expect("first add");
        let err = agg.add_line_item(req(p, 5)).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateLineItem(id) if id == p));
        assert_eq!(agg.items().len(), 1);
    }

    #[test]
    fn remove_line_item_returns_removed_item() {
        let mut agg = OrderAggregate::new(order(), vec![]);
        let a = agg.add_line_item(req(Uuid::new_v4(), 2)).unwrap();
        let b = agg.add_line_item(req(Uuid::new_v4(), 1)).unwrap();

        let removed = agg.remove_line_item(a.id).unwrap();
        assert_eq!(removed, a);
        assert_eq!(agg.items(), &[b]);
    }

    #[test]
    fn remove_unknown_line_item_is_not_found() {
        let mut agg = OrderAggregate::new(order(), vec![]);
        let err = agg.remove_line_item(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(Resource::LineItem)));
    }

    #[test]
    fn replace_emits_all_removals_before_additions() {
        let mut agg = OrderAggregate::new(order(), vec![]);
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let old = agg.add_line_item(req(p1, 1)).unwrap();

        let changes = agg.replace_line_items(&[req(p1, 3), req(p2, 2)]).unwrap();

        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], LineItemChange::Removed(old));
        assert!(matches!(&changes[1], LineItemChange::Added(i) if i.product_id == p1 && i.quantity == 3));
        assert!(matches!(&changes[2], LineItemChange::Added(i) if i.product_id == p2 && i.quantity == 2));
        assert_eq!(agg.items().len(), 2);
    }

    #[test]
    fn replace_rejects_duplicate_products_in_new_set() {
        let mut agg = OrderAggregate::new(order(), vec![]);
        let p = Uuid::new_v4();
        let err = agg.replace_line_items(&[req(p, 1), req(p, 2)]).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateLineItem(_)));
    }

    #[test]
    fn total_price_sums_price_times_quantity() {
        let a = product("321.22");
        let b = product("1.50");
        let mut agg = OrderAggregate::new(order(), vec![]);
        agg.add_line_item(req(a.id, 2)).unwrap();
        agg.add_line_item(req(b.id, 3)).unwrap();

        let total = agg.total_price(&[a, b]);
        assert_eq!(total, BigDecimal::from_str("646.94").unwrap());
        assert_eq!(total.to_string(), "646.94");
    }

    #[test]
    fn assemble_embeds_product_detail() {
        let a = product("10.00");
        let mut agg = OrderAggregate::new(order(), vec![]);
        agg.add_line_item(req(a.id, 4)).unwrap();

        let view = OrderView::assemble(&agg, &[a.clone()]).unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].product, a);
        assert_eq!(view.total_price.to_string(), "40.00");
    }

    #[test]
    fn new_order_validates_email() {
        assert!(NewOrder::new("", None).is_err());
        assert!(NewOrder::new("not-an-email", None).is_err());
        let o = NewOrder::new(" test1@test.com ", None).unwrap();
        assert_eq!(o.email, "test1@test.com");
        assert!(o.status);
    }
}
