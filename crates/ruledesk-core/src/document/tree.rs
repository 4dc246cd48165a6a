//! Concrete syntax tree for rule documents
//!
//! Every byte of the source lives in one of these nodes: trivia lines,
//! the pieces of each `key: value` line, and the verbatim lines of values
//! the model does not edit (sequences, block scalars, flow collections).

use super::syntax::{encode_scalar, RawLine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    Trivia(RawLine),
    Entry(Entry),
}

impl Item {
    fn ensure_eol(&mut self, eol: &str) {
        match self {
            Item::Trivia(line) => {
                if line.eol.is_empty() {
                    line.eol = eol.to_string();
                }
            }
            Item::Entry(entry) => entry.ensure_eol(eol),
        }
    }

    fn write_to(&self, out: &mut String) {
        match self {
            Item::Trivia(line) => line.write_to(out),
            Item::Entry(entry) => entry.write_to(out),
        }
    }
}

/// One `key: value` pair of a block mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub indent: usize,
    pub key: String,
    pub key_raw: String,
    pub pre_colon: String,
    pub gap: String,
    /// Anchor and tag properties written before the value (`&base !!map`)
    pub props: String,
    /// Whitespace between the properties and an inline value
    pub props_gap: String,
    pub value: Value,
    pub trailing: String,
    pub eol: String,
}

impl Entry {
    pub fn new(indent: usize, key: &str, value: Value, eol: &str) -> Self {
        Self {
            indent,
            key: key.to_string(),
            key_raw: encode_scalar(key),
            pre_colon: String::new(),
            gap: " ".to_string(),
            props: String::new(),
            props_gap: String::new(),
            value,
            trailing: String::new(),
            eol: eol.to_string(),
        }
    }

    /// Replace the value, keeping the key, spacing, anchors and trailing
    /// comment. Tags are dropped since they described the old value.
    pub fn replace_value(&mut self, value: Value) {
        if self.gap.is_empty() {
            self.gap = " ".to_string();
        }
        if self.props.split_whitespace().any(|p| !p.starts_with('&')) {
            let anchors: Vec<&str> = self
                .props
                .split_whitespace()
                .filter(|p| p.starts_with('&'))
                .collect();
            self.props = anchors.join(" ");
            self.props_gap = " ".to_string();
        }
        if self.props.is_empty() {
            self.props_gap.clear();
        } else if self.props_gap.is_empty() {
            self.props_gap = " ".to_string();
        }
        self.value = value;
    }

    // `inline` is the value text on the key line, empty for nested values
    fn write_head(&self, out: &mut String, inline: &str) {
        if !self.props.is_empty() {
            out.push_str(&self.gap);
            out.push_str(&self.props);
            if !inline.is_empty() {
                out.push_str(&self.props_gap);
                out.push_str(inline);
            }
        } else if !inline.is_empty() {
            out.push_str(&self.gap);
            out.push_str(inline);
        }
    }

    fn ensure_eol(&mut self, eol: &str) {
        match &mut self.value {
            Value::Mapping(m) if m.has_entries() => {
                if let Some(last) = m.items.last_mut() {
                    last.ensure_eol(eol);
                }
            }
            Value::Opaque(o) if !o.continuation.is_empty() => {
                if let Some(last) = o.continuation.last_mut() {
                    if last.eol.is_empty() {
                        last.eol = eol.to_string();
                    }
                }
            }
            _ => {
                if self.eol.is_empty() {
                    self.eol = eol.to_string();
                }
            }
        }
    }

    fn write_to(&self, out: &mut String) {
        for _ in 0..self.indent {
            out.push(' ');
        }
        out.push_str(&self.key_raw);
        out.push_str(&self.pre_colon);
        out.push(':');
        match &self.value {
            Value::Scalar(s) => {
                self.write_head(out, &s.raw);
                out.push_str(&self.trailing);
                out.push_str(&self.eol);
            }
            Value::Opaque(o) => {
                self.write_head(out, &o.inline);
                out.push_str(&self.trailing);
                out.push_str(&self.eol);
                for line in &o.continuation {
                    line.write_to(out);
                }
            }
            Value::Mapping(m) => {
                self.write_head(out, if m.has_entries() { "" } else { "{}" });
                out.push_str(&self.trailing);
                out.push_str(&self.eol);
                m.write_to(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Value {
    Scalar(Scalar),
    Mapping(Mapping),
    Opaque(Opaque),
}

/// A single-line scalar in its source form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub(crate) raw: String,
}

impl Scalar {
    pub(crate) fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// A scalar holding `value`, quoted only when needed
    pub fn from_value(value: &str) -> Self {
        Self {
            raw: encode_scalar(value),
        }
    }

    /// The scalar exactly as written
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Decoded string form; `None` for null (`~`, `null`, empty)
    pub fn as_string(&self) -> Option<String> {
        if self.raw.is_empty() {
            return None;
        }
        super::syntax::decode_scalar(&self.raw)
    }

    pub fn is_null(&self) -> bool {
        self.as_string().is_none()
    }
}

/// A value kept verbatim: sequences, block scalars, flow collections,
/// aliases and multi-line plain scalars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    pub(crate) inline: String,
    pub(crate) continuation: Vec<RawLine>,
}

impl Opaque {
    /// Source text of the value: the part on the key line followed by its
    /// continuation lines
    pub fn raw(&self) -> String {
        let mut out = self.inline.clone();
        for line in &self.continuation {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&line.text);
        }
        out
    }
}

/// A block mapping with its interleaved trivia
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    pub(crate) items: Vec<Item>,
}

impl Mapping {
    pub(crate) fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub(crate) fn has_entries(&self) -> bool {
        self.items.iter().any(|i| matches!(i, Item::Entry(_)))
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.items.iter().filter_map(|i| match i {
            Item::Entry(e) => Some(e),
            Item::Trivia(_) => None,
        })
    }

    pub(crate) fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries().find(|e| e.key == key)
    }

    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.items.iter_mut().find_map(|i| match i {
            Item::Entry(e) if e.key == key => Some(e),
            _ => None,
        })
    }

    /// Indentation shared by this mapping's entries
    pub(crate) fn entry_indent(&self) -> Option<usize> {
        self.entries().next().map(|e| e.indent)
    }

    /// Insert a new entry after the last existing one, ahead of any trailing
    /// trivia.
    pub(crate) fn insert(&mut self, entry: Entry, eol: &str) {
        let at = self
            .items
            .iter()
            .rposition(|i| matches!(i, Item::Entry(_)))
            .map(|p| p + 1)
            .unwrap_or(self.items.len());
        if at > 0 {
            self.items[at - 1].ensure_eol(eol);
        }
        self.items.insert(at, Item::Entry(entry));
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_entries()
    }

    /// Keys in document order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries().map(|e| e.key.as_str())
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        for item in &self.items {
            item.write_to(out);
        }
    }
}
