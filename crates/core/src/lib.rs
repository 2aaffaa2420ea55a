//! Domain types and pure logic for the little-things data layer.
//!
//! Nothing in this crate performs I/O. Storage routing, caching, and the
//! remote store live in `little-things-data` and `little-things-db`.

pub mod error;
pub mod field_map;
pub mod memory;
pub mod plan;
pub mod profile;
pub mod reconcile;
pub mod served;
pub mod settings;
pub mod suggestion;
pub mod types;
