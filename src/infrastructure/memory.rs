use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, Resource};
use crate::domain::order::{NewOrder, Order, OrderChanges, OrderedItem};
use crate::domain::ports::{Store, StoreTx};
use crate::domain::product::{NewProduct, Product, ProductChanges};

#[derive(Debug, Clone, Default)]
struct State {
    products: Vec<Product>,
    orders: Vec<Order>,
    items: Vec<OrderedItem>,
}

/// In-process store. A transaction holds the lock for its whole duration and
/// works on a copy of the state, which replaces the committed state only
/// when the work succeeds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn with_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn StoreTx) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        let mut committed = self
            .state
            .lock()
            .map_err(|_| DomainError::Internal("memory store lock poisoned".to_string()))?;

        let mut tx = MemoryTx {
            state: committed.clone(),
        };
        work(&mut tx)?;
        *committed = tx.state;
        Ok(())
    }
}

struct MemoryTx {
    state: State,
}

impl MemoryTx {
    fn product_mut(&mut self, id: Uuid) -> Result<&mut Product, DomainError> {
        self.state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::NotFound(Resource::Product))
    }

    fn order_mut(&mut self, id: Uuid) -> Result<&mut Order, DomainError> {
        self.state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound(Resource::Order))
    }

    fn ensure_unique_product(&self, name: &str, slug: &str, except: Option<Uuid>) -> Result<(), DomainError> {
        let clash = self
            .state
            .products
            .iter()
            .filter(|p| Some(p.id) != except)
            .any(|p| p.name == name || p.slug == slug);
        if clash {
            return Err(DomainError::Conflict("The inventory exists".to_string()));
        }
        Ok(())
    }
}

impl StoreTx for MemoryTx {
    fn list_products(&mut self) -> Result<Vec<Product>, DomainError> {
        Ok(self.state.products.clone())
    }

    fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.state.products.iter().find(|p| p.id == id).cloned())
    }

    fn find_product_by_slug(&mut self, slug: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.state.products.iter().find(|p| p.slug == slug).cloned())
    }

    fn find_products(&mut self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    fn product_name_taken(&mut self, name: &str, except: Option<Uuid>) -> Result<bool, DomainError> {
        Ok(self
            .state
            .products
            .iter()
            .any(|p| p.name == name && Some(p.id) != except))
    }

    fn insert_product(&mut self, product: &NewProduct) -> Result<Product, DomainError> {
        self.ensure_unique_product(&product.name, &product.slug, None)?;
        let now = Utc::now();
        let row = Product {
            id: Uuid::new_v4(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price.clone(),
            description: product.description.clone(),
            quantity: product.quantity,
            active: product.active,
            created_at: now,
            updated_at: now,
        };
        self.state.products.push(row.clone());
        Ok(row)
    }

    fn update_product(&mut self, id: Uuid, changes: &ProductChanges) -> Result<Product, DomainError> {
        if let (Some(name), Some(slug)) = (&changes.name, &changes.slug) {
            self.ensure_unique_product(name, slug, Some(id))?;
        }
        let product = self.product_mut(id)?;
        changes.apply_to(product);
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    fn delete_product(&mut self, id: Uuid) -> Result<(), DomainError> {
        if self.product_is_referenced(id)? {
            return Err(DomainError::ProductInUse(id));
        }
        let before = self.state.products.len();
        self.state.products.retain(|p| p.id != id);
        if self.state.products.len() == before {
            return Err(DomainError::NotFound(Resource::Product));
        }
        Ok(())
    }

    fn product_is_referenced(&mut self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.state.items.iter().any(|i| i.product_id == id))
    }

    fn adjust_quantity(&mut self, id: Uuid, delta: i32) -> Result<Product, DomainError> {
        let product = self.product_mut(id)?;
        product.quantity = product.adjusted_quantity(delta)?;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    fn list_orders(&mut self) -> Result<Vec<Order>, DomainError> {
        Ok(self.state.orders.iter().rev().cloned().collect())
    }

    fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.state.orders.iter().find(|o| o.id == id).cloned())
    }

    // The whole transaction already runs under the store mutex.
    fn lock_order(&mut self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.find_order(id)
    }

    fn insert_order(&mut self, order: &NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let row = Order {
            id: Uuid::new_v4(),
            email: order.email.clone(),
            status: order.status,
            created_at: now,
            updated_at: now,
        };
        self.state.orders.push(row.clone());
        Ok(row)
    }

    fn update_order(&mut self, id: Uuid, changes: &OrderChanges) -> Result<Order, DomainError> {
        let order = self.order_mut(id)?;
        if let Some(email) = &changes.email {
            order.email = email.clone();
        }
        if let Some(status) = changes.status {
            order.status = status;
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    fn delete_order(&mut self, id: Uuid) -> Result<(), DomainError> {
        let before = self.state.orders.len();
        self.state.orders.retain(|o| o.id != id);
        if self.state.orders.len() == before {
            return Err(DomainError::NotFound(Resource::Order));
        }
        self.state.items.retain(|i| i.order_id != id);
        Ok(())
    }

    fn list_line_items(&mut self, order_id: Uuid) -> Result<Vec<OrderedItem>, DomainError> {
        Ok(self
            .state
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    fn insert_line_item(&mut self, item: &OrderedItem) -> Result<(), DomainError> {
        if !self.state.orders.iter().any(|o| o.id == item.order_id) {
            return Err(DomainError::NotFound(Resource::Order));
        }
        if !self.state.products.iter().any(|p| p.id == item.product_id) {
            return Err(DomainError::NotFound(Resource::Product));
        }
        let duplicate = self
            .state
            .items
            .iter()
            .any(|i| i.order_id == item.order_id && i.product_id == item.product_id);
        if duplicate {
            return Err(DomainError::DuplicateLineItem(item.product_id));
        }
        self.state.items.push(item.clone());
        Ok(())
    }

    fn delete_line_item(&mut self, id: Uuid) -> Result<(), DomainError> {
        let before = self.state.items.len();
        self.state.items.retain(|i| i.id != id);
        if self.state.items.len() == before {
            return Err(DomainError::NotFound(Resource::LineItem));
        }
        Ok(())
    }
}
