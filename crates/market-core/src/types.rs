//! # Domain Types
//!
//! The two shapes that cross the cart boundary.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐            ┌─────────────────────┐            │
//! │  │     AddRequest      │  add_item  │      LineItem       │            │
//! │  │  ─────────────────  │ ─────────► │  ─────────────────  │            │
//! │  │  id                 │            │  id (unique)        │            │
//! │  │  title              │            │  title              │            │
//! │  │  image_url          │            │  image_url          │            │
//! │  │  price              │            │  price              │            │
//! │  │  quantity? (unused) │            │  quantity >= 1      │            │
//! │  └─────────────────────┘            └─────────────────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Field names are snake_case on the wire (`image_url`), matching the JSON
//! blob already stored by the mobile client under the cart key.
//!
//! JSON has no NaN or infinity: a non-finite price is written as `null` by
//! every serializer. Prices are kept finite on insert and a stored `null`
//! reads back as `0.0`, so a stored list always parses.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::MIN_ITEM_QUANTITY;

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Product identifier, unique within the cart.
    pub id: String,

    pub title: String,

    pub image_url: String,

    /// Unit price as shown in the catalogue. Never used for arithmetic here.
    #[serde(deserialize_with = "price_or_zero")]
    pub price: f64,

    /// Always >= 1.
    pub quantity: u32,
}

impl LineItem {
    /// Builds the line item inserted for a product not yet in the cart.
    ///
    /// The request's own `quantity` is ignored: new entries start at 1.
    pub fn from_request(request: &AddRequest) -> Self {
        LineItem {
            id: request.id.clone(),
            title: request.title.clone(),
            image_url: request.image_url.clone(),
            price: finite_price(request.price),
            quantity: MIN_ITEM_QUANTITY,
        }
    }
}

fn finite_price(price: f64) -> f64 {
    if price.is_finite() {
        price
    } else {
        0.0
    }
}

fn price_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = Option::<f64>::deserialize(deserializer)?;
    Ok(price.map_or(0.0, finite_price))
}

// =============================================================================
// Add Request
// =============================================================================

/// Product data handed to `add_to_cart`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddRequest {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,

    /// Accepted for wire compatibility. The cart does not read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub quantity: Option<u32>,
}

impl AddRequest {
    /// Creates a request without a quantity.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        AddRequest {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
            quantity: None,
        }
    }

    /// Sets the (ignored) quantity field.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
