// ABOUTME: Loader for the builtin source registry from embedded JSON data.
// ABOUTME: Provides load_builtin_registry() to initialize the default SourceRegistry.

//! Builtin source registry loader.
//!
//! Site adapters are pure configuration; the builtin corpus is embedded at
//! compile time and parsed into a [`SourceRegistry`]. Callers can swap in
//! their own registry through the client builder.

use crate::source::{SourceConfig, SourceRegistry};

/// Embedded JSON containing the builtin source configurations.
const BUILTIN_SOURCES_JSON: &str = include_str!("../data/sources.json");

/// Loads the builtin source registry from embedded JSON.
///
/// # Panics
///
/// Panics if the embedded JSON is malformed or cannot be deserialized.
pub fn load_builtin_registry() -> SourceRegistry {
    let sources: Vec<SourceConfig> =
        serde_json::from_str(BUILTIN_SOURCES_JSON).expect("failed to parse builtin sources");

    let mut registry = SourceRegistry::new();
    for source in sources {
        registry.register(source);
    }
    registry
}
