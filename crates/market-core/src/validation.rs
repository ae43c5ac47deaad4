//! # Validation Module
//!
//! Invariant checks for cart lists coming from outside the process.
//!
//! Lists built through [`Cart`](crate::Cart) mutations hold the invariants by
//! construction. A snapshot read back from storage may not: it could have
//! been written by an older client or edited by hand.
//!
//! ```text
//! stored JSON ──► serde ──► validate_items ──► Cart
//!                  │              │
//!                  ▼              ▼
//!           InvalidSnapshot  InvalidSnapshot
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::LineItem;
use crate::MIN_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a line item quantity against the floor.
pub fn validate_quantity(id: &str, quantity: u32) -> ValidationResult<()> {
    if quantity < MIN_ITEM_QUANTITY {
        return Err(ValidationError::QuantityBelowMinimum {
            id: id.to_string(),
            quantity,
            min: MIN_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a whole list.
///
/// Ids are opaque: any string a caller passed to `add_to_cart`, the empty
/// string included, is a valid id.
///
/// ## Rules
/// - Ids are unique
/// - Every quantity is >= 1
pub fn validate_items(items: &[LineItem]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(items.len());

    for item in items {
        validate_quantity(&item.id, item.quantity)?;

        if !seen.insert(item.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: item.id.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: "T".to_string(),
            image_url: "u".to_string(),
            price: 1.0,
            quantity,
        }
    }

    #[test]
    fn test_any_id_is_accepted() {
        assert!(validate_items(&[item("", 1), item("   ", 1), item("🛒", 1)]).is_ok());
        assert!(matches!(
            validate_items(&[item("", 1), item("", 2)]),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("1", 1).is_ok());
        assert!(validate_quantity("1", 999).is_ok());
        assert!(validate_quantity("1", 0).is_err());
    }

    #[test]
    fn test_validate_items() {
        assert!(validate_items(&[]).is_ok());
        assert!(validate_items(&[item("1", 1), item("2", 3)]).is_ok());

        assert!(matches!(
            validate_items(&[item("1", 1), item("1", 1)]),
            Err(ValidationError::DuplicateId { .. })
        ));
        assert!(matches!(
            validate_items(&[item("1", 0)]),
            Err(ValidationError::QuantityBelowMinimum { .. })
        ));
    }
}
