//! Storage routing, request caching, and profile reconciliation for
//! little-things.
//!
//! [`service::DataService`] is the entry point. It routes each operation to
//! the device-local [`local::LocalStore`] when no user identity is given and
//! to a [`little_things_db::remote::RemoteStore`] otherwise.

pub mod cache;
pub mod config;
pub mod error;
pub mod local;
pub mod mapping;
pub mod ownership;
pub mod service;
pub mod telemetry;

pub use service::DataService;
