use uuid::Uuid;

use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderChanges, OrderedItem};
use super::product::{NewProduct, Product, ProductChanges};

/// Operations available inside one open transaction. Every product and
/// order mutation goes through a handle of this type, so whatever a use case
/// touches commits or rolls back together.
pub trait StoreTx {
    // ── products ────────────────────────────────────────────────────────────
    fn list_products(&mut self) -> Result<Vec<Product>, DomainError>;
    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_product_by_slug(&mut self, slug: &str) -> Result<Option<Product>, DomainError>;
    fn find_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    fn product_name_taken(&mut self, name: &str, except: Option<Uuid>) -> Result<bool, DomainError>;
    fn insert_product(&mut self, product: &NewProduct) -> Result<Product, DomainError>;
    fn update_product(&mut self, id: Uuid, changes: &ProductChanges) -> Result<Product, DomainError>;
    fn delete_product(&mut self, id: Uuid) -> Result<(), DomainError>;
    fn product_is_referenced(&mut self, id: Uuid) -> Result<bool, DomainError>;

    /// Applies `quantity += delta` to the product row, holding the row until
    /// the transaction ends. Fails with `OutOfStock` instead of going below
    /// zero and with `NotFound` when the product does not exist.
    fn adjust_quantity(&mut self, id: Uuid, delta: i32) -> Result<Product, DomainError>;

    // ── orders ──────────────────────────────────────────────────────────────
    fn list_orders(&mut self) -> Result<Vec<Order>, DomainError>;
    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Like `find_order`, but holds the order row until the transaction ends.
    /// Use cases that read line items and then move stock call this first.
    fn lock_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn insert_order(&mut self, order: &NewOrder) -> Result<Order, DomainError>;
    fn update_order(&mut self, id: Uuid, changes: &OrderChanges) -> Result<Order, DomainError>;
    /// Deletes the order row; its line items go with it.
    fn delete_order(&mut self, id: Uuid) -> Result<(), DomainError>;

    fn list_line_items(&mut self, order_id: Uuid) -> Result<Vec<OrderedItem>, DomainError>;
    fn insert_line_item(&mut self, item: &OrderedItem) -> Result<(), DomainError>;
    fn delete_line_item(&mut self, id: Uuid) -> Result<(), DomainError>;
}

/// A storage backend able to run work inside a transaction. When `work`
/// returns `Err` nothing it did is kept.
pub trait Store: Send + Sync + 'static {
    fn with_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreTx) -> Result<(), DomainError>,
    ) -> Result<(), DomainError>;
}

impl dyn Store {
    /// Runs `work` in one transaction and hands back its result.
    pub fn transaction<T>(
        &self,
        work: impl FnOnce(&mut dyn StoreTx) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let mut work = Some(work);
        let mut output = None;
        self.with_transaction(&mut |tx: &mut dyn StoreTx| {
            let work = work
                .take()
                .ok_or_else(|| DomainError::Internal("transaction body ran twice".to_string()))?;
            output = Some(work(tx)?);
            Ok(())
        })?;
        output.ok_or_else(|| DomainError::Internal("transaction produced no result".to_string()))
    }
}
