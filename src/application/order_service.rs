use std::sync::Arc;

use log::{error, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, Resource};
use crate::domain::order::{
    ensure_distinct_products, LineItemChange, LineItemRequest, NewOrder, OrderAggregate,
    OrderChanges, OrderView,
};
use crate::domain::ports::{Store, StoreTx};
use crate::domain::reconciliation;

pub struct OrderService {
    store: Arc<dyn Store>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn list_orders(&self) -> Result<Vec<OrderView>, DomainError> {
        self.store.transaction(|tx| {
            tx.list_orders()?
                .into_iter()
                .map(|order| {
                    let items = tx.list_line_items(order.id)?;
                    order_view(tx, &OrderAggregate::new(order, items))
                })
                .collect()
        })
    }

    pub fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.store.transaction(|tx| {
            let aggregate = load_aggregate(tx, id)?;
            order_view(tx, &aggregate)
        })
    }

    /// Creates an order and reserves stock for each of its line items. Any
    /// failure leaves every product's stock as it was.
    pub fn create_order(
        &self,
        email: &str,
        status: Option<bool>,
        items: Vec<LineItemRequest>,
    ) -> Result<OrderView, DomainError> {
        let new_order = NewOrder::new(email, status)?;
        validate_line_set(&items)?;

        let result = self.store.transaction(|tx| {
            // Check every requested quantity before writing anything.
            for request in &items {
                let product = tx
                    .find_product(request.product_id)?
                    .ok_or(DomainError::NotFound(Resource::Product))?;
                if new_order.status {
                    product.ensure_can_supply(request.quantity)?;
                }
            }

            let order = tx.insert_order(&new_order)?;
            let mut aggregate = OrderAggregate::new(order.clone(), Vec::new());
            for request in &items {
                let item = aggregate.add_line_item(*request)?;
                reconciliation::apply_change(tx, &order, &order, &LineItemChange::Added(item))?;
            }
            order_view(tx, &aggregate)
        });

        let view = outcome("create order", result)?;
        info!(
            "created order {} for {} with {} line item(s)",
            view.order.id,
            view.order.email,
            view.lines.len()
        );
        Ok(view)
    }

    /// Updates scalar fields and, when `items` is given, swaps the whole
    /// line-item set. Old reservations are released before new ones are
    /// taken, so lowering a quantity never trips the stock check.
    pub fn update_order(
        &self,
        id: Uuid,
        email: Option<&str>,
        status: Option<bool>,
        items: Option<Vec<LineItemRequest>>,
    ) -> Result<OrderView, DomainError> {
        let result = self.store.transaction(|tx| {
            // An absent order answers NotFound before the payload is judged.
            let mut aggregate = load_aggregate(tx, id)?;
            let changes = OrderChanges::new(email, status)?;
            if let Some(items) = &items {
                validate_line_set(items)?;
            }
            let before = aggregate.order.clone();
            let after = tx.update_order(id, &changes)?;

            match &items {
                Some(requests) => {
                    for change in aggregate.replace_line_items(requests)? {
                        reconciliation::apply_change(tx, &before, &after, &change)?;
                    }
                }
                None => reconciliation::rebalance(tx, &before, &after, aggregate.items())?,
            }

            aggregate.order = after;
            order_view(tx, &aggregate)
        });

        let view = outcome("update order", result)?;
        info!(
            "updated order {} (status {}, {} line item(s))",
            view.order.id,
            view.order.status,
            view.lines.len()
        );
        Ok(view)
    }

    /// Returns the order's reserved stock and deletes it with its line items.
    pub fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        let result = self.store.transaction(|tx| {
            let aggregate = load_aggregate(tx, id)?;
            reconciliation::discard_order(tx, &aggregate.order, aggregate.items())
        });
        outcome("delete order", result)?;
        info!("deleted order {}", id);
        Ok(())
    }

    pub fn add_line_item(
        &self,
        order_id: Uuid,
        request: LineItemRequest,
    ) -> Result<OrderView, DomainError> {
        let result = self.store.transaction(|tx| {
            let mut aggregate = load_aggregate(tx, order_id)?;
            if tx.find_product(request.product_id)?.is_none() {
                return Err(DomainError::NotFound(Resource::Product));
            }
            let item = aggregate.add_line_item(request)?;
            let order = aggregate.order.clone();
            reconciliation::apply_change(tx, &order, &order, &LineItemChange::Added(item))?;
            order_view(tx, &aggregate)
        });

        let view = outcome("add line item", result)?;
        info!(
            "added {} x product {} to order {}",
            request.quantity, request.product_id, order_id
        );
        Ok(view)
    }

    pub fn remove_line_item(&self, order_id: Uuid, item_id: Uuid) -> Result<OrderView, DomainError> {
        let result = self.store.transaction(|tx| {
            let mut aggregate = load_aggregate(tx, order_id)?;
            let item = aggregate.remove_line_item(item_id)?;
            let order = aggregate.order.clone();
            reconciliation::apply_change(tx, &order, &order, &LineItemChange::Removed(item))?;
            order_view(tx, &aggregate)
        });

        let view = outcome("remove line item", result)?;
        info!("removed line item {} from order {}", item_id, order_id);
        Ok(view)
    }
}

fn validate_line_set(items: &[LineItemRequest]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::validation("must order some items"));
    }
    ensure_distinct_products(items)
}

/// Locks the order row, then reads its line items. Holding the lock keeps a
/// concurrent update or delete of the same order from working off stale items.
fn load_aggregate(tx: &mut dyn StoreTx, id: Uuid) -> Result<OrderAggregate, DomainError> {
    let order = tx
        .lock_order(id)?
        .ok_or(DomainError::NotFound(Resource::Order))?;
    let items = tx.list_line_items(id)?;
    Ok(OrderAggregate::new(order, items))
}

fn order_view(tx: &mut dyn StoreTx, aggregate: &OrderAggregate) -> Result<OrderView, DomainError> {
    let ids: Vec<Uuid> = aggregate.items().iter().map(|i| i.product_id).collect();
    let products = tx.find_products(&ids)?;
    OrderView::assemble(aggregate, &products)
}

/// Logs why a use case was rolled back before handing the error on.
fn outcome<T>(operation: &str, result: Result<T, DomainError>) -> Result<T, DomainError> {
    if let Err(e) = &result {
        match e {
            DomainError::Internal(msg) => error!("{operation} not completed: {msg}"),
            e if e.is_rule_violation() => warn!("{operation} rejected: {e}"),
            _ => {}
        }
    }
    result
}
