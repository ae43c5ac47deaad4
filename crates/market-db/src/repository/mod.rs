//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! CartStore writer task
//!      │
//!      │  db.kv().set(key, json)
//!      ▼
//! KeyValueRepository
//! ├── get(&self, key)
//! ├── get_entry(&self, key)
//! ├── set(&self, key, value)
//! ├── remove(&self, key)
//! └── keys(&self)
//!      │
//!      │  SQL Query
//!      ▼
//! SQLite kv_store table
//! ```
//!
//! ## Available Repositories
//!
//! - [`kv::KeyValueRepository`] - String-keyed text values

pub mod kv;
