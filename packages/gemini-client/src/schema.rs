//! Type-safe schema generation for Gemini structured outputs.
//!
//! Gemini's `responseSchema` accepts an OpenAPI 3.0 subset, not full JSON
//! Schema. This module derives the schema from a Rust type with `schemars`
//! and rewrites it into the accepted subset.
//!
//! # Example
//!
//! ```rust,ignore
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use gemini_client::StructuredOutput;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Caption {
//!     text: String,
//!     keywords: Vec<String>,
//! }
//!
//! let schema = Caption::gemini_schema();
//! ```

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keys Gemini rejects inside `responseSchema`.
const UNSUPPORTED_KEYS: &[&str] = &["$schema", "title", "definitions", "additionalProperties", "default"];

/// Trait for types that can be used as Gemini structured output.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate a Gemini-compatible response schema for this type.
    ///
    /// Gemini requires:
    /// 1. Fully inlined schemas (no `$ref`)
    /// 2. A single `type` string; optional values use `nullable: true`
    /// 3. No `$schema`, `title`, `definitions` or `additionalProperties`
    fn gemini_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);
        rewrite_nullable_types(&mut value);
        strip_unsupported(&mut value);

        value
    }

    /// Get the schema name for this type.
    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Inline all `$ref` references using the root `definitions` table.
fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                let type_name = ref_path.trim_start_matches("#/definitions/");
                if let Some(def) = definitions.get(type_name) {
                    *value = def.clone();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

/// Turn `"type": ["string", "null"]` into `"type": "string", "nullable": true`.
fn rewrite_nullable_types(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(types)) = map.get("type").cloned() {
                let non_null: Vec<&Value> = types.iter().filter(|t| t.as_str() != Some("null")).collect();
                if non_null.len() == 1 {
                    let nullable = non_null.len() != types.len();
                    map.insert("type".to_string(), non_null[0].clone());
                    if nullable {
                        map.insert("nullable".to_string(), Value::Bool(true));
                    }
                }
            }

            for (_, v) in map.iter_mut() {
                rewrite_nullable_types(v);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                rewrite_nullable_types(item);
            }
        }
        _ => {}
    }
}

fn strip_unsupported(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in UNSUPPORTED_KEYS {
                map.remove(*key);
            }
            for (key, v) in map.iter_mut() {
                // Field names under `properties` are user data, not schema keywords.
                if key == "properties" {
                    if let Value::Object(props) = v {
                        for (_, prop) in props.iter_mut() {
                            strip_unsupported(prop);
                        }
                    }
                } else {
                    strip_unsupported(v);
                }
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                strip_unsupported(item);
            }
        }
        _ => {}
    }
}
