//! Formatting-preserving rule documents
//!
//! A [`Document`] is a lossless tree over YAML text. Comments, blank lines,
//! quoting, key order and line endings are part of the tree, so
//! `Document::parse(text)?.to_string() == text` for every accepted input.
//! Edits go through [`Document::set`] (or its consuming form
//! [`Document::apply`]) and touch only the entry they name.
//!
//! ```
//! use ruledesk_core::document::{Document, NodeValue};
//!
//! let text = "# owned by payments\nName: refund-limit # keep me\n";
//! let doc = Document::parse(text)?
//!     .apply(&["Core", "Status"], NodeValue::string("Draft"))?;
//! assert_eq!(
//!     doc.to_string(),
//!     "# owned by payments\nName: refund-limit # keep me\nCore:\n  Status: Draft\n"
//! );
//! # Ok::<(), ruledesk_core::errors::RuleError>(())
//! ```

mod parser;
mod projection;
mod rebuild;
mod syntax;
mod tree;

pub use tree::{Mapping, Opaque, Scalar};

use crate::errors::{Result, RuleError};
use parser::{Parser, Root};
use std::fmt;
use syntax::{detect_eol, split_lines};
use tree::{Entry, Item, Value};

/// Indentation used for new nested mappings when the document has none
pub const DEFAULT_INDENT: usize = 2;

/// Read-only view of a node in the tree
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Scalar(&'a Scalar),
    Mapping(&'a Mapping),
    /// Sequences, block scalars and other values kept verbatim
    Other(&'a Opaque),
}

impl<'a> Node<'a> {
    pub fn as_scalar(&self) -> Option<&'a Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&'a Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Source text of the node
    pub fn raw(&self) -> String {
        match self {
            Node::Scalar(s) => s.raw().to_string(),
            Node::Mapping(m) => {
                let mut out = String::new();
                m.write_to(&mut out);
                out
            }
            Node::Other(o) => o.raw(),
        }
    }
}

impl Mapping {
    /// Child node under `key`
    pub fn get(&self, key: &str) -> Option<Node<'_>> {
        self.entry(key).map(|e| node_of(&e.value))
    }
}

fn node_of(value: &Value) -> Node<'_> {
    match value {
        Value::Scalar(s) => Node::Scalar(s),
        Value::Mapping(m) => Node::Mapping(m),
        Value::Opaque(o) => Node::Other(o),
    }
}

/// A value written by [`Document::set`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    /// A string scalar, quoted only when the plain form would read back
    /// differently
    String(String),
    EmptyMapping,
}

impl NodeValue {
    pub fn string(value: impl Into<String>) -> Self {
        NodeValue::String(value.into())
    }

    fn into_value(self) -> Value {
        match self {
            NodeValue::String(s) => Value::Scalar(Scalar::from_value(&s)),
            NodeValue::EmptyMapping => Value::Mapping(Mapping::default()),
        }
    }
}

/// Lossless, editable rule document
pub struct Document {
    root: Root,
    eol: String,
    indent_unit: usize,
}

impl Document {
    /// Parse rule text.
    ///
    /// # Errors
    ///
    /// `RuleError::Parse` when the text is not well-formed YAML or uses a
    /// layout the tree cannot represent (e.g. tab indentation).
    pub fn parse(text: &str) -> Result<Self> {
        let lines = split_lines(text);
        if lines.iter().any(|l| !l.is_trivia()) {
            serde_yaml::from_str::<serde_yaml::Value>(text).map_err(|e| RuleError::Parse {
                message: e.to_string(),
            })?;
        }
        let eol = detect_eol(&lines);
        let parsed = Parser::new(lines).parse()?;
        Ok(Self {
            root: parsed.root,
            eol,
            indent_unit: parsed.indent_unit.unwrap_or(DEFAULT_INDENT),
        })
    }

    /// The top-level mapping, or `None` when the document root is a
    /// sequence or scalar
    pub fn root(&self) -> Option<&Mapping> {
        match &self.root {
            Root::Mapping(m) => Some(m),
            Root::Other(_) => None,
        }
    }

    pub fn has(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    pub fn get(&self, path: &[&str]) -> Option<Node<'_>> {
        let mut node = Node::Mapping(self.root()?);
        for key in path {
            node = node.as_mapping()?.get(key)?;
        }
        Some(node)
    }

    /// Insert or overwrite the node at `path`.
    ///
    /// Missing intermediate mappings are created; null intermediate values
    /// are turned into mappings and flow or aliased mappings on the path are
    /// rewritten as block mappings first (see [`Document::expand`]).
    /// Nothing outside the named entry changes.
    ///
    /// # Errors
    ///
    /// - `RuleError::InvalidInput` for an empty path
    /// - `RuleError::NotAMapping` when the path runs through a scalar,
    ///   sequence or a non-mapping document root
    pub fn set(&mut self, path: &[&str], value: NodeValue) -> Result<()> {
        if path.is_empty() {
            return Err(RuleError::InvalidInput {
                reason: "document path must not be empty".to_string(),
            });
        }
        self.expand(&[])?;
        for depth in 1..path.len() {
            if matches!(self.get(&path[..depth]), Some(Node::Other(_))) {
                self.expand(&path[..depth])?;
            }
        }
        let layout = self.layout();
        match &mut self.root {
            Root::Mapping(root) => set_in(root, None, path, 0, value, &layout),
            Root::Other(_) => Err(RuleError::NotAMapping {
                path: String::new(),
            }),
        }
    }

    /// Rewrite the mapping at `path` (the root for an empty path) as a
    /// block mapping so its entries can be read and edited.
    ///
    /// Flow mappings, aliases of mappings and flow document roots are kept
    /// verbatim on parse. Expanding one replaces its text with block entries
    /// holding the same decoded values; anchors on the entry are kept.
    /// Returns `false` when the node already is a block mapping.
    ///
    /// # Errors
    ///
    /// `RuleError::NotAMapping` when the node is absent or not a mapping.
    pub fn expand(&mut self, path: &[&str]) -> Result<bool> {
        if matches!(self.get(path), Some(Node::Mapping(_))) {
            return Ok(false);
        }
        let not_a_mapping = || RuleError::NotAMapping {
            path: path.join("."),
        };
        let decoded =
            rebuild::decoded_mapping(&self.to_string(), path).ok_or_else(not_a_mapping)?;
        let layout = self.layout();

        let Some((last, parents)) = path.split_last() else {
            let Root::Other(lines) = &self.root else {
                return Err(not_a_mapping());
            };
            let tail = lines
                .iter()
                .rposition(|l| !l.is_trivia())
                .map_or(lines.len(), |p| p + 1);
            let mut items: Vec<Item> = lines
                .iter()
                .take_while(|l| l.is_trivia())
                .cloned()
                .map(Item::Trivia)
                .collect();
            items.extend(rebuild::block_mapping(decoded, 0, layout.unit, &layout.eol).items);
            items.extend(lines[tail..].iter().cloned().map(Item::Trivia));
            self.root = Root::Mapping(Mapping::new(items));
            return Ok(true);
        };

        let entry = self
            .mapping_mut(parents)
            .and_then(|m| m.entry_mut(last))
            .ok_or_else(not_a_mapping)?;
        let indent = entry.indent + layout.unit;
        let block = rebuild::block_mapping(decoded, indent, layout.unit, &layout.eol);
        if entry.eol.is_empty() {
            entry.eol = layout.eol.clone();
        }
        entry.replace_value(Value::Mapping(block));
        Ok(true)
    }

    /// Consuming form of [`Document::set`]
    ///
    /// # Errors
    ///
    /// Same as [`Document::set`].
    pub fn apply(mut self, path: &[&str], value: NodeValue) -> Result<Self> {
        self.set(path, value)?;
        Ok(self)
    }

    /// Value-only projection; comments and formatting are dropped.
    ///
    /// # Errors
    ///
    /// `RuleError::Serialization` if the rendered text no longer parses.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let text = self.to_string();
        if split_lines(&text).iter().all(|l| l.is_trivia()) {
            return Ok(serde_json::Value::Null);
        }
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&text).map_err(|e| RuleError::Serialization {
                message: e.to_string(),
            })?;
        Ok(projection::yaml_to_json(yaml))
    }
}

impl Document {
    fn layout(&self) -> Layout {
        Layout {
            eol: self.eol.clone(),
            unit: self.indent_unit,
        }
    }

    fn mapping_mut(&mut self, path: &[&str]) -> Option<&mut Mapping> {
        let Root::Mapping(root) = &mut self.root else {
            return None;
        };
        let mut mapping = root;
        for key in path {
            let entry = mapping.entry_mut(key)?;
            mapping = match &mut entry.value {
                Value::Mapping(m) => m,
                _ => return None,
            };
        }
        Some(mapping)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        match &self.root {
            Root::Mapping(m) => m.write_to(&mut out),
            Root::Other(lines) => {
                for line in lines {
                    line.write_to(&mut out);
                }
            }
        }
        f.write_str(&out)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.to_string())
            .finish()
    }
}

struct Layout {
    eol: String,
    unit: usize,
}

fn set_in(
    mapping: &mut Mapping,
    parent_indent: Option<usize>,
    path: &[&str],
    depth: usize,
    value: NodeValue,
    layout: &Layout,
) -> Result<()> {
    let key = path[depth];
    let is_last = depth + 1 == path.len();

    if mapping.entry(key).is_none() {
        let indent = mapping
            .entry_indent()
            .unwrap_or_else(|| parent_indent.map_or(0, |p| p + layout.unit));
        if is_last {
            mapping.insert(Entry::new(indent, key, value.into_value(), &layout.eol), &layout.eol);
            return Ok(());
        }
        mapping.insert(
            Entry::new(indent, key, Value::Mapping(Mapping::default()), &layout.eol),
            &layout.eol,
        );
    }

    let not_a_mapping = || RuleError::NotAMapping {
        path: path[..=depth].join("."),
    };
    let entry = mapping.entry_mut(key).ok_or_else(not_a_mapping)?;
    if is_last {
        entry.replace_value(value.into_value());
        return Ok(());
    }
    if matches!(&entry.value, Value::Scalar(s) if s.is_null()) {
        entry.replace_value(Value::Mapping(Mapping::default()));
    }
    if matches!(&entry.value, Value::Mapping(m) if !m.has_entries()) && entry.eol.is_empty() {
        entry.eol = layout.eol.clone();
    }
    let entry_indent = entry.indent;
    match &mut entry.value {
        Value::Mapping(child) => set_in(child, Some(entry_indent), path, depth + 1, value, layout),
        _ => Err(not_a_mapping()),
    }
}
