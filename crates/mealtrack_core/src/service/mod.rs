//! Public data-service façade.
//!
//! # Responsibility
//! - Expose the caller-facing meal/tag API with its no-throw contract.
//! - Keep repository and SQL details behind the façade boundary.
//!
//! # Invariants
//! - Façade methods never return an error; internal failures degrade to
//!   absence/emptiness/no-op and are logged.

pub mod data_service;
