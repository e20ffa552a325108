use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Prices are stored as numeric(5,2).
const PRICE_MAX_DIGITS: i64 = 5;
const PRICE_DECIMAL_PLACES: i64 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
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

impl Product {
    /// Stock level after applying `delta`, or `OutOfStock` when it would go
    /// below zero. Returned stock saturates at `i32::MAX`, so a release never
    /// fails.
    pub fn adjusted_quantity(&self, delta: i32) -> Result<i32, DomainError> {
        let next = self.quantity.saturating_add(delta);
        if next < 0 {
            return Err(DomainError::OutOfStock {
                product_id: self.id,
                requested: delta.saturating_neg(),
                available: self.quantity,
            });
        }
        Ok(next)
    }

    pub fn ensure_can_supply(&self, requested: i32) -> Result<(), DomainError> {
        if requested > self.quantity {
            return Err(DomainError::OutOfStock {
                product_id: self.id,
                requested,
                available: self.quantity,
            });
        }
        Ok(())
    }
}

/// Validated input for a new inventory row.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub price: BigDecimal,
    pub description: String,
    pub quantity: i32,
    pub active: bool,
}

impl NewProduct {
    pub fn new(
        name: &str,
        price: BigDecimal,
        description: Option<String>,
        quantity: Option<i32>,
        active: Option<bool>,
    ) -> Result<Self, DomainError> {
        let name = validate_name(name)?;
        let quantity = quantity.unwrap_or(1);
        validate_stock(quantity)?;
        Ok(Self {
            slug: slugify(&name),
            name,
            price: validate_price(&price)?,
            description: description.unwrap_or_default(),
            quantity,
            active: active.unwrap_or(true),
        })
    }
}

/// Partial update of an inventory row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub price: Option<BigDecimal>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub active: Option<bool>,
}

impl ProductChanges {
    pub fn new(
        name: Option<&str>,
        price: Option<BigDecimal>,
        description: Option<String>,
        quantity: Option<i32>,
        active: Option<bool>,
    ) -> Result<Self, DomainError> {
        let name = name.map(validate_name).transpose()?;
        if let Some(quantity) = quantity {
            validate_stock(quantity)?;
        }
        Ok(Self {
            slug: name.as_deref().map(slugify),
            name,
            price: price.as_ref().map(validate_price).transpose()?,
            description,
            quantity,
            active,
        })
    }

    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(slug) = &self.slug {
            product.slug = slug.clone();
        }
        if let Some(price) = &self.price {
            product.price = price.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(active) = self.active {
            product.active = active;
        }
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::invalid_field("name", "This field may not be blank."));
    }
    if slugify(name).is_empty() {
        return Err(DomainError::invalid_field(
            "name",
            "name must contain at least one letter or digit",
        ));
    }
    Ok(name.to_string())
}

fn validate_stock(quantity: i32) -> Result<(), DomainError> {
    if quantity < 0 {
        return Err(DomainError::invalid_field(
            "quantity",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    Ok(())
}

/// Checks `price` fits numeric(5,2) and returns it rescaled to two places.
pub fn validate_price(price: &BigDecimal) -> Result<BigDecimal, DomainError> {
    if *price < BigDecimal::from(0) {
        return Err(DomainError::invalid_field(
            "price",
            "Ensure this value is greater than or equal to 0.",
        ));
    }
    let (_, scale) = price.normalized().as_bigint_and_exponent();
    if scale > PRICE_DECIMAL_PLACES {
        return Err(DomainError::invalid_field(
            "price",
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        ));
    }
    // 10^(5 - 2) = 1000
    let limit = BigDecimal::from(10i64.pow((PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES) as u32));
    if *price >= limit {
        return Err(DomainError::invalid_field(
            "price",
            format!("Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."),
        ));
    }
    Ok(price.with_scale(PRICE_DECIMAL_PLACES))
}

/// Lowercases `name` and collapses every run of non-alphanumeric characters
/// into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn price(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn product(quantity: i32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "test_product101".to_string(),
            slug: "test-product101".to_string(),
            price: price("321.22"),
            description: "good101".to_string(),
            quantity,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Test Product 101"), "test-product-101");
        assert_eq!(slugify("  --Blue__Widget!! "), "blue-widget");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn price_accepts_two_decimal_places() {
        assert_eq!(validate_price(&price("322.2")).unwrap(), price("322.20"));
        assert_eq!(validate_price(&price("999.99")).unwrap(), price("999.99"));
    }

    #[test]
    fn price_rejects_more_than_five_digits() {
        let err = validate_price(&price("9999.99")).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: Some("price"), .. }));
    }

    #[test]
    fn price_rejects_three_decimal_places_and_negatives() {
        assert!(validate_price(&price("1.005")).is_err());
        assert!(validate_price(&price("-1.00")).is_err());
        assert!(validate_price(&price("1.500")).is_ok());
    }

    #[test]
    fn new_product_defaults() {
        let p = NewProduct::new("Product 100", price("23.99"), None, None, None).unwrap();
        assert_eq!(p.slug, "product-100");
        assert_eq!(p.quantity, 1);
        assert!(p.active);
        assert_eq!(p.description, "");
    }

    #[test]
    fn new_product_rejects_blank_name_and_negative_stock() {
        assert!(NewProduct::new("   ", price("1"), None, None, None).is_err());
        assert!(NewProduct::new("p", price("1"), None, Some(-1), None).is_err());
    }

    #[test]
    fn changes_rederive_slug_from_name() {
        let mut p = product(10);
        ProductChanges::new(Some("Renamed Item"), None, Some("very good".into()), Some(100), None)
            .unwrap()
            .apply_to(&mut p);
        assert_eq!(p.slug, "renamed-item");
        assert_eq!(p.quantity, 100);
        assert_eq!(p.description, "very good");
    }

    #[test]
    fn release_saturates_instead_of_failing() {
        let p = product(i32::MAX - 2);
        assert_eq!(p.adjusted_quantity(10).unwrap(), i32::MAX);
        assert_eq!(product(5).adjusted_quantity(i32::MAX).unwrap(), i32::MAX);
    }

    #[test]
    fn adjusted_quantity_floors_at_zero() {
        let p = product(300);
        assert_eq!(p.adjusted_quantity(-300).unwrap(), 0);
        assert_eq!(p.adjusted_quantity(5).unwrap(), 305);
        match p.adjusted_quantity(-301) {
            Err(DomainError::OutOfStock {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 301);
                assert_eq!(available, 300);
            }
            other => panic!("expected OutOfStock, got {other:?}"),
        }
    }

    #[test]
    fn ensure_can_supply_compares_against_stock() {
        let p = product(300);
        assert!(p.ensure_can_supply(300).is_ok());
        assert!(p.ensure_can_supply(301).is_err());
    }
}
