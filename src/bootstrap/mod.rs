//! Process startup: configuration, tracing and backend assembly.
pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use wiring::{
    build_store, ensure_cache_folder, resolve_cache_folder, resolve_machine_name, WiringError,
};
