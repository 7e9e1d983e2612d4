//! Configuration merge logic
//!
//! - Mappings: union of keys, recursive, overlay wins on collision
//! - Sequences: base followed by overlay (no dedup)
//! - Scalars and mismatched kinds: overlay wins

use serde_json::{Map, Value};

/// Deep merge two JSON values.
///
/// Mismatched kinds (e.g. a sequence over a mapping) are not validated: the
/// overlay replaces the base and the bundler gets to reject it.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }

        (Value::Array(mut base_items), Value::Array(overlay_items)) => {
            base_items.extend(overlay_items);
            Value::Array(base_items)
        }

        (_, overlay) => overlay,
    }
}

/// Per-key merge of two mappings; new overlay keys are appended
pub fn merge_maps(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, overlay_value) in overlay {
        match base.get_mut(&key) {
            // Merge in place so the base key keeps its position
            Some(slot) => {
                let base_value = std::mem::take(slot);
                *slot = deep_merge(base_value, overlay_value);
            }
            None => {
                base.insert(key, overlay_value);
            }
        }
    }
    base
}

/// Merge multiple layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}
