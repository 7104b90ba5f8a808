//! Core domain types and logic for the lectern talks directory.
//!
//! This crate is the functional core of the project: entity types, the
//! role-tagged membership model and its derived views, lookup enrichment,
//! search facet configuration, and the storage traits implemented by the
//! server crate. It performs no I/O of its own.

pub mod events;
pub mod lookup;
pub mod search;
pub mod serde;
pub mod storage;
