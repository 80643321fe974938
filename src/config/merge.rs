//! Configuration merge logic
//!
//! Layers are merged shallowly:
//! - Every top-level key of the override replaces the base value outright
//! - Objects and arrays are never combined field-wise
//! - Base keys the override does not mention are kept unchanged

use serde_json::{Map, Value};

/// A single configuration layer: a flat mapping of keys to JSON values
pub type ConfigLayer = Map<String, Value>;

/// Shallow-merge two layers (override wins per top-level key).
pub fn merge_shallow(mut base: ConfigLayer, overlay: ConfigLayer) -> ConfigLayer {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    base
}
