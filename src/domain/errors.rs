use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// The kind of record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Order,
    Product,
    LineItem,
}

impl Resource {
    /// Key used when the error is scoped to a resource in a response body.
    pub fn key(&self) -> &'static str {
        match self {
            Resource::Order => "order",
            Resource::Product => "inventory",
            Resource::LineItem => "ordered_item",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Order => "Order",
            Resource::Product => "Inventory",
            Resource::LineItem => "Ordered item",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found.")]
    NotFound(Resource),

    /// Input rejected before touching any stock. `field` is set when the
    /// problem belongs to a single request field.
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    #[error(
        "Not enough quantity, product quantity is less than {requested} (available: {available})"
    )]
    OutOfStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("Inventory {0} is not active")]
    ProductInactive(Uuid),

    #[error("Inventory {0} is already part of this order")]
    DuplicateLineItem(Uuid),

    #[error("Inventory {0} is referenced by existing orders")]
    ProductInUse(Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: Some(field),
            message: message.into(),
        }
    }

    /// True for the business-rule failures that abort a transaction on
    /// purpose, as opposed to infrastructure faults.
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            DomainError::OutOfStock { .. }
                | DomainError::ProductInactive(_)
                | DomainError::DuplicateLineItem(_)
        )
    }
}
