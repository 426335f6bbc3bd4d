//! Deterministic content hashing (`spec.md` §4.1).
//!
//! Ids in the IR are not assigned by a counter; they are derived from the
//! content being identified. Two nodes with the same `{type, content,
//! modifiers}` always collapse to the same id, which is what gives the
//! parser its deduplication behavior for free.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hash any serializable value into a 64-character lowercase hex digest.
///
/// The value is serialized to JSON with object keys in ascending order
/// (via [`canonical_json`]) before hashing, so field declaration order in
/// Rust structs never leaks into the id.
pub fn hash_value<T: Serialize>(value: &T) -> String {
    let canonical = canonical_json(value);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex_lower(&digest)
}

/// Serialize `value` to JSON with every object's keys sorted
/// lexicographically, recursively, and no insignificant whitespace.
fn canonical_json<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_value(value).expect("content hash input must be serializable");
    let sorted = sort_keys(json);
    serde_json::to_string(&sorted).expect("sorted value must re-serialize")
}

fn sort_keys(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            for key in keys {
                let v = map[&key].clone();
                sorted.insert(key, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Example {
        b: u32,
        a: u32,
    }

    #[test]
    fn key_order_does_not_affect_hash() {
        #[derive(Serialize)]
        struct Other {
            a: u32,
            b: u32,
        }
        let h1 = hash_value(&Example { b: 2, a: 1 });
        let h2 = hash_value(&Other { a: 1, b: 2 });
        assert_eq!(h1, h2);
    }

    #[test]
    fn distinct_content_yields_distinct_hash() {
        let h1 = hash_value(&Example { a: 1, b: 2 });
        let h2 = hash_value(&Example { a: 1, b: 3 });
        assert_ne!(h1, h2);
    }

    #[test]
    fn output_is_64_char_lowercase_hex() {
        let h = hash_value(&Example { a: 1, b: 2 });
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }
}
