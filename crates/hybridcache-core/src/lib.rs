//! Core infrastructure shared across all hybridcache crates.
//!
//! This crate provides the plumbing every other crate builds on:
//! - `events`: the observability event system (`ComponentEvent`, listeners)
//! - `error`: the closed `EngineError` enum and `Severity`

pub mod error;
pub mod events;

pub use error::{EngineError, Severity};
pub use events::{BoxedEventListener, ComponentEvent, EventListener, EventListeners, FnListener};
