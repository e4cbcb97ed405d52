//! Null pruning for configuration documents.
//!
//! Configuration documents are stored with explicit `null`s for unset
//! optional fields. Before a document is shown to the generation step every
//! object entry holding `null` is removed, at any depth, so an explicit null
//! and an absent field look the same downstream.
//!
//! Only object *keys* are removed. Arrays keep their length; a `null`
//! element stays `null`, and non-null elements are pruned recursively.
//!
//! ```rust
//! use designer_chat::prune::prune;
//! use serde_json::json;
//!
//! let doc = json!({"formId": "f1", "title": "T", "description": null});
//! assert_eq!(prune(&doc), json!({"formId": "f1", "title": "T"}));
//! ```

use serde_json::{Map, Value};

/// Return a copy of `value` with every null-valued object entry removed.
pub fn prune(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), prune(v)))
                .collect();
            Value::Object(pruned)
        }
        Value::Array(items) => Value::Array(items.iter().map(prune).collect()),
        other => other.clone(),
    }
}

/// Prune `value` and serialize it compactly.
pub fn prune_to_string(value: &Value) -> String {
    prune(value).to_string()
}
