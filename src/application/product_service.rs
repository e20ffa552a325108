use std::sync::Arc;

use log::info;

use crate::domain::errors::{DomainError, Resource};
use crate::domain::ports::{Store, StoreTx};
use crate::domain::product::{NewProduct, Product, ProductChanges};

pub struct ProductService {
    store: Arc<dyn Store>,
}

impl ProductService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.store.transaction(|tx| tx.list_products())
    }

    pub fn get_product(&self, slug: &str) -> Result<Product, DomainError> {
        self.store.transaction(|tx| find_by_slug(tx, slug))
    }

    pub fn create_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        let created = self.store.transaction(|tx| {
            if tx.product_name_taken(&product.name, None)? {
                return Err(DomainError::Conflict("The inventory exists".to_string()));
            }
            tx.insert_product(&product)
        })?;
        info!(
            "created inventory {} ({}) with stock {}",
            created.slug, created.id, created.quantity
        );
        Ok(created)
    }

    pub fn update_product(&self, slug: &str, changes: ProductChanges) -> Result<Product, DomainError> {
        let updated = self.store.transaction(|tx| {
            let current = find_by_slug(tx, slug)?;
            if let Some(name) = &changes.name {
                if tx.product_name_taken(name, Some(current.id))? {
                    return Err(DomainError::Conflict("The inventory exists".to_string()));
                }
            }
            tx.update_product(current.id, &changes)
        })?;
        info!("updated inventory {} ({})", updated.slug, updated.id);
        Ok(updated)
    }

    /// Fails with `ProductInUse` while any order line still points at it.
    pub fn delete_product(&self, slug: &str) -> Result<(), DomainError> {
        let deleted = self.store.transaction(|tx| {
            let current = find_by_slug(tx, slug)?;
            if tx.product_is_referenced(current.id)? {
                return Err(DomainError::ProductInUse(current.id));
            }
            tx.delete_product(current.id)?;
            Ok(current)
        })?;
        info!("deleted inventory {} ({})", deleted.slug, deleted.id);
        Ok(())
    }
}

fn find_by_slug(tx: &mut dyn StoreTx, slug: &str) -> Result<Product, DomainError> {
    tx.find_product_by_slug(slug)?
        .ok_or(DomainError::NotFound(Resource::Product))
}
