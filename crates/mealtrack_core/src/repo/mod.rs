//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for meals and tags.
//! - Isolate SQLite query details from the service façade.
//!
//! # Invariants
//! - Repository writes keep the meal/tag one-to-many relation consistent;
//!   a meal's tag set is only ever replaced atomically.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod meal_repo;
pub mod tag_repo;
