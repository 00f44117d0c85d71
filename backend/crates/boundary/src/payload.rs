//! Payload Traversal
//!
//! Request and response bodies are heterogeneous JSON trees assembled ad
//! hoc by the business layer; there is no fixed schema to generate a
//! transform from. Instead the boundary walks every tree depth-first and
//! rewrites the identifiers it recognizes, leaving everything else
//! untouched. The policy "identifiers never leak in raw form" lives here
//! and nowhere else.
//!
//! Recognition is purely key-driven:
//! - a field literally named [`IDENTIFIER_FIELD`] holds the entity's own
//!   identifier and is rewritten in place
//! - values under the [`RELATION_KEYS`] allow-list are nested related
//!   entities (single or in sequence) and are walked recursively
//!
//! The allow-list is the one piece of schema knowledge this module owns.
//! A relation key missing from it is a silent under-encoding bug, not a
//! crash: keep the table in sync when new relation kinds appear.

use serde_json::Value;

use crate::codec::OpaqueIdCodec;

/// Field holding an entity's own identifier
pub const IDENTIFIER_FIELD: &str = "identifier";

/// Relation keys whose values may contain nested identifiers
///
/// Central and auditable on purpose; traversal logic never hard-codes a
/// key name outside this table.
pub const RELATION_KEYS: &[&str] = &[
    "owner",
    "author",
    "item",
    "items",
    "review",
    "reviews",
    "comment",
    "comments",
    "annotation",
    "annotations",
    "tag",
    "tags",
    "tagSet",
];

/// Direction of a traversal pass
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Encode,
    Decode,
}

/// Schema-free identifier transform over JSON payload trees
#[derive(Clone)]
pub struct PayloadCodec {
    codec: OpaqueIdCodec,
}

impl PayloadCodec {
    pub fn new(codec: OpaqueIdCodec) -> Self {
        Self { codec }
    }

    /// Access the underlying identifier codec
    pub fn id_codec(&self) -> &OpaqueIdCodec {
        &self.codec
    }

    /// Encode every recognized internal identifier in the tree
    ///
    /// Total: shape, order and unrecognized values are preserved exactly;
    /// trees without identifier-like content pass through unchanged.
    pub fn encode(&self, payload: Value) -> Value {
        self.walk(payload, Direction::Encode)
    }

    /// Decode every recognized opaque identifier in the tree
    ///
    /// Total: a malformed opaque string becomes `null` so the downstream
    /// repository lookup misses; it is never an error at this layer.
    pub fn decode(&self, payload: Value) -> Value {
        self.walk(payload, Direction::Decode)
    }

    fn walk(&self, value: Value, direction: Direction) -> Value {
        match value {
            Value::Null => Value::Null,
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.walk(item, direction))
                    .collect(),
            ),
            Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, field)| {
                        let field = if key == IDENTIFIER_FIELD {
                            self.transform_identifier(field, direction)
                        } else if RELATION_KEYS.contains(&key.as_str()) {
                            self.walk(field, direction)
                        } else {
                            field
                        };
                        (key, field)
                    })
                    .collect(),
            ),
            scalar => scalar,
        }
    }

    fn transform_identifier(&self, value: Value, direction: Direction) -> Value {
        match direction {
            Direction::Encode => match value.as_i64() {
                Some(id) => Value::String(self.codec.encode_id(id)),
                None => value,
            },
            Direction::Decode => match value {
                Value::String(s) => match self.codec.decode_id(&s) {
                    Ok(id) => Value::Number(id.into()),
                    Err(err) => {
                        tracing::debug!(error = %err, "Inbound opaque identifier failed to decode");
                        Value::Null
                    }
                },
                other => other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_codec() -> PayloadCodec {
        PayloadCodec::new(OpaqueIdCodec::new([7u8; 32]))
    }

    #[test]
    fn test_nested_roundtrip() {
        // Encoding then decoding recovers the original mapping exactly
        let codec = payload_codec();
        let original = json!({"identifier": 42, "owner": {"identifier": 7}});

        let encoded = codec.encode(original.clone());
        assert!(encoded["identifier"].is_string());
        assert!(encoded["owner"]["identifier"].is_string());

        assert_eq!(codec.decode(encoded), original);
    }

    #[test]
    fn test_sequence_preserves_order_and_length() {
        let codec = payload_codec();
        let original = json!({"items": [
            {"identifier": 1, "name": "first"},
            {"identifier": 2, "name": "second"},
            {"identifier": 3, "name": "third"},
        ]});

        let encoded = codec.encode(original.clone());
        let items = encoded["items"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["name"], "first");
        assert_eq!(items[2]["name"], "third");

        assert_eq!(codec.decode(encoded), original);
    }

    #[test]
    fn test_unrecognized_keys_untouched() {
        let codec = payload_codec();
        // "score" and "metadata" are not relation keys; identifiers below
        // them must stay in raw form (the documented under-encoding hazard)
        let original = json!({
            "identifier": 5,
            "score": 4.5,
            "metadata": {"identifier": 99},
        });

        let encoded = codec.encode(original);
        assert!(encoded["identifier"].is_string());
        assert_eq!(encoded["score"], json!(4.5));
        assert_eq!(encoded["metadata"]["identifier"], json!(99));
    }

    #[test]
    fn test_non_identifier_scalars_preserved() {
        let codec = payload_codec();
        let original = json!({
            "identifier": 10,
            "title": "Dark roast",
            "rating": 5,
            "published": true,
            "tags": [{"identifier": 3, "label": "coffee"}],
        });

        let encoded = codec.encode(original.clone());
        assert_eq!(encoded["title"], "Dark roast");
        assert_eq!(encoded["rating"], 5);
        assert_eq!(encoded["published"], true);
        assert_eq!(encoded["tags"][0]["label"], "coffee");

        assert_eq!(codec.decode(encoded), original);
    }

    #[test]
    fn test_idempotent_without_identifiers() {
        let codec = payload_codec();
        let payload = json!({"title": "No ids here", "count": 3, "nested": {"deep": [1, 2]}});

        assert_eq!(codec.encode(payload.clone()), payload);
        assert_eq!(codec.decode(payload.clone()), payload);
    }

    #[test]
    fn test_encode_is_idempotent() {
        // A second pass sees strings where numbers were and leaves them be
        let codec = payload_codec();
        let payload = json!({"identifier": 42, "items": [{"identifier": 7}]});

        let once = codec.encode(payload);
        let twice = codec.encode(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_null_short_circuits() {
        let codec = payload_codec();
        assert_eq!(codec.encode(Value::Null), Value::Null);
        assert_eq!(codec.decode(Value::Null), Value::Null);
    }

    #[test]
    fn test_top_level_sequence() {
        let codec = payload_codec();
        let original = json!([{"identifier": 1}, {"identifier": 2}]);

        let encoded = codec.encode(original.clone());
        assert!(encoded[0]["identifier"].is_string());
        assert_eq!(codec.decode(encoded), original);
    }

    #[test]
    fn test_malformed_opaque_string_decodes_to_null() {
        let codec = payload_codec();
        let payload = json!({"identifier": "not-an-opaque-id"});

        let decoded = codec.decode(payload);
        assert_eq!(decoded["identifier"], Value::Null);
    }

    #[test]
    fn test_decode_leaves_non_string_identifier_alone() {
        let codec = payload_codec();
        let payload = json!({"identifier": 42});
        assert_eq!(codec.decode(payload.clone()), payload);
    }

    #[test]
    fn test_relation_recursion_through_deep_nesting() {
        let codec = payload_codec();
        let original = json!({
            "identifier": 1,
            "reviews": [{
                "identifier": 2,
                "author": {"identifier": 3, "annotations": [{"identifier": 4}]},
            }],
        });

        let encoded = codec.encode(original.clone());
        assert!(encoded["reviews"][0]["author"]["annotations"][0]["identifier"].is_string());
        assert_eq!(codec.decode(encoded), original);
    }
}
