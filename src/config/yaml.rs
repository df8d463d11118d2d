//! YAML flattening into dot-separated keys.
//!
//! Documents are loaded leniently: a key repeated within one mapping keeps its
//! last value instead of failing the file, and `<<` merge keys are resolved
//! before flattening.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

/// Parse every document in `content` and flatten the mapping documents.
///
/// Non-mapping documents are skipped. If any document fails to parse the whole
/// file is rejected, so a file contributes either all of its keys or none.
pub fn flatten_documents(content: &str) -> Result<Vec<(String, Option<String>)>, serde_yaml::Error> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(content) {
        let LastWins(mut value) = LastWins::deserialize(document)?;
        value.apply_merge()?;
        documents.push(value);
    }

    let mut out = Vec::new();
    for document in &documents {
        if let Value::Mapping(map) = untag(document) {
            flatten_mapping(map, "", &mut out);
        }
    }
    Ok(out)
}

/// A YAML value whose mappings resolve repeated keys to the last occurrence.
struct LastWins(Value);

impl<'de> Deserialize<'de> for LastWins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LastWinsVisitor).map(LastWins)
    }
}

struct LastWinsVisitor;

impl<'de> Visitor<'de> for LastWinsVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Value, E> {
        Ok(match i64::try_from(v) {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(v.to_string()),
        })
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Value, E> {
        Ok(match u64::try_from(v) {
            Ok(n) => Value::Number(n.into()),
            Err(_) => Value::String(v.to_string()),
        })
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        LastWins::deserialize(deserializer).map(|v| v.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(LastWins(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut mapping = Mapping::new();
        while let Some(LastWins(key)) = map.next_key()? {
            let LastWins(value) = map.next_value()?;
            mapping.insert(key, value);
        }
        Ok(Value::Mapping(mapping))
    }

    // Tagged values (`!tag value`) arrive as enums named by their tag.
    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Value, A::Error> {
        let (tag, variant): (String, _) = data.variant()?;
        let LastWins(value) = variant.newtype_variant()?;
        Ok(Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(tag),
            value,
        })))
    }
}

/// Flatten a mapping: nested mappings extend the key path, anything else is a leaf.
pub fn flatten_mapping(map: &Mapping, prefix: &str, out: &mut Vec<(String, Option<String>)>) {
    for (key, value) in map {
        let key = render(key);
        let full_key = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };

        match untag(value) {
            Value::Mapping(nested) => flatten_mapping(nested, &full_key, out),
            Value::Null => out.push((full_key, None)),
            leaf => out.push((full_key, Some(render(leaf)))),
        }
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

/// Render a YAML value as a string leaf.
///
/// Sequences render as `[a, b]` and mappings inside sequences as `{k=v}`.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => {
            let parts: Vec<String> = items.iter().map(render).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Mapping(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}={}", render(k), render(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        Value::Tagged(tagged) => render(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(content: &str) -> Vec<(String, Option<String>)> {
        flatten_documents(content).unwrap()
    }

    fn leaf(k: &str, v: &str) -> (String, Option<String>) {
        (k.to_string(), Some(v.to_string()))
    }

    #[test]
    fn test_nested_keys_joined_with_dots() {
        let content = "key3: value3\na:\n  b: value4\n  c:\n    d: deep\n";
        assert_eq!(
            flat(content),
            vec![leaf("key3", "value3"), leaf("a.b", "value4"), leaf("a.c.d", "deep")]
        );
    }

    #[test]
    fn test_scalars_are_stringified() {
        let content = "port: 8080\nenabled: true\nratio: 0.5\nempty:\n";
        assert_eq!(
            flat(content),
            vec![
                leaf("port", "8080"),
                leaf("enabled", "true"),
                leaf("ratio", "0.5"),
                ("empty".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_sequences_are_leaves() {
        let content = "profiles:\n  - dev\n  - prod\nservers:\n  - host: a\n    port: 1\n";
        assert_eq!(
            flat(content),
            vec![leaf("profiles", "[dev, prod]"), leaf("servers", "[{host=a, port=1}]")]
        );
    }

    #[test]
    fn test_non_string_keys() {
        let content = "codes:\n  404: missing\n  true: ok\n";
        assert_eq!(
            flat(content),
            vec![leaf("codes.404", "missing"), leaf("codes.true", "ok")]
        );
    }

    #[test]
    fn test_multi_document_and_non_mapping_documents() {
        let content = "a: 1\n---\n- just\n- a list\n---\nb: 2\n";
        assert_eq!(flat(content), vec![leaf("a", "1"), leaf("b", "2")]);
    }

    #[test]
    fn test_scalar_document_skipped() {
        assert!(flat("just a string\n").is_empty());
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let content = "server:\n  port: 1\nname: a\nname: b\n";
        assert_eq!(flat(content), vec![leaf("server.port", "1"), leaf("name", "b")]);
    }

    #[test]
    fn test_merge_keys_resolved() {
        let content = "defaults: &d\n  timeout: 5\n  url: default\nsvc:\n  <<: *d\n  url: x\n";
        let mut keys = flat(content);
        keys.sort();
        assert_eq!(
            keys,
            vec![
                leaf("defaults.timeout", "5"),
                leaf("defaults.url", "default"),
                leaf("svc.timeout", "5"),
                leaf("svc.url", "x"),
            ]
        );
    }

    #[test]
    fn test_tagged_values_render_inner_value() {
        assert_eq!(flat("secret: !vault abc\n"), vec![leaf("secret", "abc")]);
    }

    #[test]
    fn test_invalid_document_rejects_file() {
        let content = "a: 1\n---\nb: [unclosed\n";
        assert!(flatten_documents(content).is_err());
    }
}
