//! # Error Types
//!
//! Domain-specific error types for market-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  market-core errors (this file)                                        │
//! │  ├── CoreError        - Snapshot parse/serialize failures              │
//! │  └── ValidationError  - Broken list invariants                         │
//! │                                                                         │
//! │  market-db errors (separate crate)                                     │
//! │  └── DbError          - Storage operation failures                     │
//! │                                                                         │
//! │  market-cart errors                                                    │
//! │  └── CartError        - What cart consumers see                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations themselves never fail; these errors only come from
//! reading or writing snapshots.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core cart errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored snapshot could not be turned back into a cart.
    ///
    /// ## When This Occurs
    /// - The stored value is not JSON, or not a list of line items
    /// - The list has duplicate ids or a quantity below 1
    #[error("Invalid cart snapshot: {0}")]
    InvalidSnapshot(String),

    /// The cart could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Serialization(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// List invariant violations.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Two line items share an id.
    #[error("Duplicate line item id '{id}'")]
    DuplicateId { id: String },

    /// A line item's quantity is under the floor.
    #[error("Line item '{id}' has quantity {quantity}, minimum is {min}")]
    QuantityBelowMinimum { id: String, quantity: u32, min: u32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
