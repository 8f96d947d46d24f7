//! Shared utilities for the atelier workspace.

pub mod logging;

pub use logging::init_tracing;
