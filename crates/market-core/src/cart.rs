//! # Cart
//!
//! The authoritative list of line items and the three mutation rules.
//!
//! ## Mutation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Mutations                                       │
//! │                                                                         │
//! │  add_item(req)                                                         │
//! │   ├── id present ──────► quantity += 1   (other fields untouched)      │
//! │   └── id absent  ──────► push LineItem { quantity: 1 }                 │
//! │                                                                         │
//! │  increment(id)                                                         │
//! │   ├── id present ──────► quantity += 1                                 │
//! │   └── id absent  ──────► no-op                                         │
//! │                                                                         │
//! │  decrement(id)                                                         │
//! │   ├── quantity == 1 ───► remove item                                   │
//! │   ├── quantity  > 1 ───► quantity -= 1                                 │
//! │   └── id absent  ──────► no-op                                         │
//! │                                                                         │
//! │  NOTE: no operation ever fails. The result says what happened.         │
//! │  A quantity already at u32::MAX stays there and reports Unchanged.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Items are unique by `id`
//! - Every quantity is >= [`MIN_ITEM_QUANTITY`]
//! - Insertion order is preserved

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{AddRequest, LineItem};
use crate::validation::validate_items;
use crate::MIN_ITEM_QUANTITY;

// =============================================================================
// Change Report
// =============================================================================

/// What a single mutation did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line item was appended at quantity 1.
    Added,
    /// An existing line item's quantity went up.
    Incremented { quantity: u32 },
    /// An existing line item's quantity went down.
    Decremented { quantity: u32 },
    /// A line item at quantity 1 was decremented and dropped.
    Removed,
    /// The list was emptied.
    Cleared,
    /// The id was not in the cart.
    Unchanged,
}

impl CartChange {
    /// Returns true if the list contents differ from before the mutation.
    pub fn is_change(&self) -> bool {
        !matches!(self, CartChange::Unchanged)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered list of unique line items.
///
/// Serializes transparently as a JSON array, which is the stored snapshot
/// format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from a list, checking uniqueness and quantity floor.
    pub fn from_items(items: Vec<LineItem>) -> CoreResult<Self> {
        validate_items(&items)?;
        Ok(Cart { items })
    }

    /// Parses a stored snapshot.
    ///
    /// Malformed JSON and invariant violations both yield
    /// [`CoreError::InvalidSnapshot`].
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let items: Vec<LineItem> =
            serde_json::from_str(json).map_err(|e| CoreError::InvalidSnapshot(e.to_string()))?;

        Cart::from_items(items).map_err(|e| CoreError::InvalidSnapshot(e.to_string()))
    }

    /// Serializes the cart to its stored snapshot form.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(&self.items).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Adds a product, or bumps its quantity if already present.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1, title/price/image untouched
    /// - Product not in cart: appended with quantity 1
    ///
    /// `request.quantity` is never read.
    pub fn add_item(&mut self, request: &AddRequest) -> CartChange {
        if let Some(item) = self.find_mut(&request.id) {
            return bump(item);
        }

        self.items.push(LineItem::from_request(request));
        CartChange::Added
    }

    /// Raises the quantity of `id` by one. No-op when absent.
    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.find_mut(id) {
            Some(item) => bump(item),
            None => CartChange::Unchanged,
        }
    }

    /// Lowers the quantity of `id` by one, removing it at the floor.
    pub fn decrement(&mut self, id: &str) -> CartChange {
        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return CartChange::Unchanged;
        };

        if self.items[index].quantity <= MIN_ITEM_QUANTITY {
            self.items.remove(index);
            return CartChange::Removed;
        }

        let item = &mut self.items[index];
        item.quantity -= 1;
        CartChange::Decremented {
            quantity: item.quantity,
        }
    }

    /// Removes every item.
    pub fn clear(&mut self) -> CartChange {
        if self.items.is_empty() {
            return CartChange::Unchanged;
        }
        self.items.clear();
        CartChange::Cleared
    }

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consumes the cart, returning its items.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Looks up an item by id.
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Returns the number of unique items in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }
}

/// Adds one to `item`, saturating at `u32::MAX`.
fn bump(item: &mut LineItem) -> CartChange {
    match item.quantity.checked_add(1) {
        Some(quantity) => {
            item.quantity = quantity;
            CartChange::Incremented { quantity }
        }
        None => CartChange::Unchanged,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
