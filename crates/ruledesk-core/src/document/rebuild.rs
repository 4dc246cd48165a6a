//! Block mappings rebuilt from decoded values
//!
//! Flow mappings, aliased mappings and flow document roots are kept as
//! verbatim text by the parser. Before one of them is edited it is replaced
//! by block entries carrying the same values.

use super::projection::{key_to_string, yaml_to_json};
use super::tree::{Entry, Item, Mapping, Opaque, Scalar, Value};
use serde_yaml::Value as Yaml;

pub(crate) fn untag(value: Yaml) -> Yaml {
    match value {
        Yaml::Tagged(tagged) => untag(tagged.value),
        other => other,
    }
}

/// Decoded mapping found under `path` in `text`
pub(crate) fn decoded_mapping(text: &str, path: &[&str]) -> Option<serde_yaml::Mapping> {
    let mut value: Yaml = serde_yaml::from_str(text).ok()?;
    for key in path {
        let Yaml::Mapping(mut mapping) = untag(value) else {
            return None;
        };
        value = mapping.remove(*key)?;
    }
    match untag(value) {
        Yaml::Mapping(mapping) => Some(mapping),
        _ => None,
    }
}

pub(crate) fn block_mapping(
    mapping: serde_yaml::Mapping,
    indent: usize,
    unit: usize,
    eol: &str,
) -> Mapping {
    let items = mapping
        .into_iter()
        .map(|(k, v)| {
            let value = block_value(v, indent, unit, eol);
            Item::Entry(Entry::new(indent, &key_to_string(k), value, eol))
        })
        .collect();
    Mapping::new(items)
}

// Sequences stay on one line as JSON, which is valid flow YAML
fn block_value(value: Yaml, indent: usize, unit: usize, eol: &str) -> Value {
    match untag(value) {
        Yaml::Null => Value::Scalar(Scalar::from_raw("")),
        Yaml::Bool(b) => Value::Scalar(Scalar::from_raw(b.to_string())),
        Yaml::Number(n) => Value::Scalar(Scalar::from_raw(n.to_string())),
        Yaml::String(s) => Value::Scalar(Scalar::from_value(&s)),
        Yaml::Mapping(m) => Value::Mapping(block_mapping(m, indent + unit, unit, eol)),
        other => Value::Opaque(Opaque {
            inline: yaml_to_json(other).to_string(),
            continuation: Vec::new(),
        }),
    }
}
