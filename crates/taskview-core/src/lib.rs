//! taskview-core library.
//!
//! Read path for task collections over shared lists: who can see which
//! lists, how request filters and sorts compile, and how one page of tasks
//! is selected from the store.
//!
//! # Conventions
//!
//! - **Errors**: Use `CollectionError` for anything a client can act on,
//!   `anyhow::Result` for store plumbing.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod collection;
pub mod config;
pub mod db;
pub mod error;
pub mod model;

pub use collection::{CollectionPage, CollectionRequest, Scope, read_collection};
pub use config::EngineConfig;
pub use error::{CollectionError, CollectionResult, ErrorCode};
