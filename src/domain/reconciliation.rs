//! Stock bookkeeping tied to line-item changes.
//!
//! Every committed state keeps this invariant: for each product, the
//! quantities held by line items of active orders are already subtracted
//! from the product's stock. All functions here run against an open
//! transaction and abort it by returning `Err`.

use log::debug;

use super::errors::{DomainError, Resource};
use super::order::{LineItemChange, Order, OrderedItem};
use super::ports::StoreTx;

/// Takes `item.quantity` out of stock for an active order.
pub fn reserve(tx: &mut dyn StoreTx, order: &Order, item: &OrderedItem) -> Result<(), DomainError> {
    let product = tx
        .find_product(item.product_id)?
        .ok_or(DomainError::NotFound(Resource::Product))?;
    if !order.status {
        return Ok(());
    }
    if !product.active {
        return Err(DomainError::ProductInactive(product.id));
    }
    let updated = tx.adjust_quantity(product.id, -item.quantity)?;
    debug!(
        "reserved {} of product {} for order {} (stock now {})",
        item.quantity, product.id, order.id, updated.quantity
    );
    Ok(())
}

/// Puts `item.quantity` back into stock if the order was holding it.
pub fn release(tx: &mut dyn StoreTx, order: &Order, item: &OrderedItem) -> Result<(), DomainError> {
    if !order.status {
        return Ok(());
    }
    let updated = tx.adjust_quantity(item.product_id, item.quantity)?;
    debug!(
        "released {} of product {} from order {} (stock now {})",
        item.quantity, item.product_id, order.id, updated.quantity
    );
    Ok(())
}

/// Persists one line-item change and moves stock accordingly. A removal is
/// judged by the order as it was (`before`), an addition by the order as it
/// is now (`after`).
pub fn apply_change(
    tx: &mut dyn StoreTx,
    before: &Order,
    after: &Order,
    change: &LineItemChange,
) -> Result<(), DomainError> {
    match change {
        LineItemChange::Removed(item) => {
            release(tx, before, item)?;
            tx.delete_line_item(item.id)
        }
        LineItemChange::Added(item) => {
            reserve(tx, after, item)?;
            tx.insert_line_item(item)
        }
    }
}

/// Re-evaluates an unchanged line-item set after the order's status moved.
/// Everything the old status held is released before anything is reserved
/// under the new one.
pub fn rebalance(
    tx: &mut dyn StoreTx,
    before: &Order,
    after: &Order,
    items: &[OrderedItem],
) -> Result<(), DomainError> {
    if before.status == after.status {
        return Ok(());
    }
    for item in items {
        release(tx, before, item)?;
    }
    for item in items {
        reserve(tx, after, item)?;
    }
    Ok(())
}

/// Releases every line item and deletes the order together with them.
pub fn discard_order(
    tx: &mut dyn StoreTx,
    order: &Order,
    items: &[OrderedItem],
) -> Result<(), DomainError> {
    for item in items {
        release(tx, order, item)?;
    }
    tx.delete_order(order.id)
}
