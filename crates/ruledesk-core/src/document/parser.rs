//! Indentation-driven parser producing the lossless tree
//!
//! The text has already been accepted by `serde_yaml` when this runs, so the
//! parser only has to recover structure, not diagnose every YAML error.

use super::syntax::{check_indentation, flow_depth, parse_key_line, split_properties, RawLine};
use super::tree::{Entry, Item, Mapping, Opaque, Scalar, Value};
use crate::errors::{Result, RuleError};

/// How continuation lines of a value are recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    /// Multi-line plain scalars: deeper content lines
    Flow,
    /// `|` / `>` block scalars: deeper lines, comments included
    Block,
    /// Block sequences, including `- item` lines at the key's own indent
    Sequence,
}

pub(crate) enum Root {
    Mapping(Mapping),
    /// A document whose top level is not a mapping
    Other(Vec<RawLine>),
}

pub(crate) struct Parsed {
    pub root: Root,
    pub indent_unit: Option<usize>,
}

pub(crate) struct Parser {
    lines: Vec<RawLine>,
    pos: usize,
    indent_unit: Option<usize>,
}

impl Parser {
    pub fn new(lines: Vec<RawLine>) -> Self {
        Self {
            lines,
            pos: 0,
            indent_unit: None,
        }
    }

    pub fn parse(mut self) -> Result<Parsed> {
        let first_content = self.lines.iter().position(|l| !l.is_trivia());
        let root = match first_content {
            None => Root::Mapping(Mapping::new(
                self.lines.drain(..).map(Item::Trivia).collect(),
            )),
            Some(idx) => {
                let line = &self.lines[idx];
                if parse_key_line(&line.text[line.indent()..]).is_some() {
                    let indent = line.indent();
                    let mapping = self.parse_mapping(indent, true)?;
                    if self.pos < self.lines.len() {
                        return Err(self.error_at(self.pos, "content outside the top-level mapping"));
                    }
                    Root::Mapping(mapping)
                } else {
                    Root::Other(std::mem::take(&mut self.lines))
                }
            }
        };
        Ok(Parsed {
            root,
            indent_unit: self.indent_unit,
        })
    }

    fn error_at(&self, idx: usize, message: &str) -> RuleError {
        RuleError::Parse {
            message: format!("{} at line {}", message, idx + 1),
        }
    }

    fn next_content(&self, from: usize) -> Option<usize> {
        (from..self.lines.len()).find(|&i| !self.lines[i].is_trivia())
    }

    fn parse_mapping(&mut self, indent: usize, is_root: bool) -> Result<Mapping> {
        let mut items = Vec::new();
        while self.pos < self.lines.len() {
            let line = &self.lines[self.pos];
            if line.is_trivia() {
                // Trivia stays with this mapping only while more of it follows
                let keep = match self.next_content(self.pos) {
                    Some(next) => self.lines[next].indent() >= indent,
                    None => is_root,
                };
                if !keep {
                    break;
                }
                items.push(Item::Trivia(line.clone()));
                self.pos += 1;
                continue;
            }

            let line_indent = line.indent();
            if line_indent < indent {
                break;
            }
            if line_indent > indent {
                return Err(self.error_at(self.pos, "unexpected indentation"));
            }
            let entry = self.parse_entry(indent)?;
            items.push(Item::Entry(entry));
        }
        Ok(Mapping::new(items))
    }

    fn parse_entry(&mut self, indent: usize) -> Result<Entry> {
        let idx = self.pos;
        let line = self.lines[idx].clone();
        check_indentation(&line, idx + 1)?;
        if line.is_sequence_item() {
            return Err(self.error_at(idx, "sequence item where a mapping key was expected"));
        }
        let kl = parse_key_line(&line.text[indent..])
            .ok_or_else(|| self.error_at(idx, "expected `key: value`"))?;
        self.pos += 1;

        let (props, props_gap, inline) = split_properties(&kl.inline);
        let value = if inline.is_empty() {
            self.parse_nested_value(indent)?
        } else if inline == "{}" {
            Value::Mapping(Mapping::default())
        } else {
            let continuation = if inline.starts_with(['|', '>']) {
                self.collect_continuation(indent, Continuation::Block)
            } else if inline.starts_with(['[', '{']) {
                self.collect_flow(flow_depth(inline))
            } else {
                self.collect_continuation(indent, Continuation::Flow)
            };
            let verbatim =
                continuation.is_empty() && !inline.starts_with(['[', '{', '*', '|', '>']);
            if verbatim {
                Value::Scalar(Scalar::from_raw(inline))
            } else {
                Value::Opaque(Opaque {
                    inline: inline.to_string(),
                    continuation,
                })
            }
        };

        Ok(Entry {
            indent,
            key: kl.key,
            key_raw: kl.key_raw,
            pre_colon: kl.pre_colon,
            gap: kl.gap,
            props: props.to_string(),
            props_gap: props_gap.to_string(),
            value,
            trailing: kl.trailing,
            eol: line.eol,
        })
    }

    /// Value of a `key:` line with nothing after the colon
    fn parse_nested_value(&mut self, indent: usize) -> Result<Value> {
        let Some(next) = self.next_content(self.pos) else {
            return Ok(Value::Scalar(Scalar::from_raw("")));
        };
        let next_line = &self.lines[next];
        let next_indent = next_line.indent();

        if next_line.is_sequence_item() && next_indent >= indent {
            let continuation = self.collect_continuation(indent, Continuation::Sequence);
            return Ok(Value::Opaque(Opaque {
                inline: String::new(),
                continuation,
            }));
        }
        if next_indent <= indent {
            return Ok(Value::Scalar(Scalar::from_raw("")));
        }

        let rest = &next_line.text[next_indent..];
        if parse_key_line(rest).is_some() {
            if self.indent_unit.is_none() {
                self.indent_unit = Some(next_indent - indent);
            }
            let child = self.parse_mapping(next_indent, false)?;
            Ok(Value::Mapping(child))
        } else if rest.starts_with(['[', '{']) {
            let depth = flow_depth(rest);
            let mut continuation = self.lines[self.pos..=next].to_vec();
            self.pos = next + 1;
            continuation.extend(self.collect_flow(depth));
            Ok(Value::Opaque(Opaque {
                inline: String::new(),
                continuation,
            }))
        } else {
            // multi-line scalar or flow collection starting on the next line
            let continuation = self.collect_continuation(indent, Continuation::Flow);
            Ok(Value::Opaque(Opaque {
                inline: String::new(),
                continuation,
            }))
        }
    }

    /// Lines of a flow collection left open by `depth` brackets, taken
    /// until the brackets balance whatever their indentation
    fn collect_flow(&mut self, mut depth: i64) -> Vec<RawLine> {
        let mut taken = Vec::new();
        while depth > 0 && self.pos < self.lines.len() {
            let line = self.lines[self.pos].clone();
            depth += flow_depth(&line.text);
            taken.push(line);
            self.pos += 1;
        }
        taken
    }

    fn collect_continuation(&mut self, indent: usize, mode: Continuation) -> Vec<RawLine> {
        let mut taken = Vec::new();
        let mut pending = Vec::new();
        while self.pos < self.lines.len() {
            let line = &self.lines[self.pos];
            if line.is_blank() {
                pending.push(line.clone());
                self.pos += 1;
                continue;
            }
            let line_indent = line.indent();
            let belongs = match mode {
                Continuation::Block => line_indent > indent,
                Continuation::Flow => line_indent > indent && !line.is_comment(),
                Continuation::Sequence => {
                    (line_indent > indent && !line.is_comment())
                        || (line_indent == indent && line.is_sequence_item())
                }
            };
            if belongs {
                taken.append(&mut pending);
                taken.push(line.clone());
                self.pos += 1;
            } else if line.is_comment() && mode != Continuation::Block {
                pending.push(line.clone());
                self.pos += 1;
            } else {
                break;
            }
        }
        self.pos -= pending.len();
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::super::syntax::split_lines;
    use super::*;

    fn parse(text: &str) -> Parsed {
        Parser::new(split_lines(text)).parse().unwrap()
    }

    fn root_mapping(text: &str) -> Mapping {
        match parse(text).root {
            Root::Mapping(m) => m,
            Root::Other(_) => panic!("expected mapping root"),
        }
    }

    #[test]
    fn test_nested_mapping_and_indent_unit() {
        let parsed = parse("Core:\n    Id: CORE-000001\n    Status: Draft\nName: x\n");
        assert_eq!(parsed.indent_unit, Some(4));
        let Root::Mapping(m) = parsed.root else {
            panic!("expected mapping root")
        };
        let keys: Vec<_> = m.keys().collect();
        assert_eq!(keys, vec!["Core", "Name"]);
        let core = m.entry("Core").unwrap();
        let Value::Mapping(inner) = &core.value else {
            panic!("Core should be a mapping")
        };
        assert_eq!(inner.keys().collect::<Vec<_>>(), vec!["Id", "Status"]);
    }

    #[test]
    fn test_sequence_values_are_opaque() {
        let m = root_mapping("tags:\n  - a\n  - b\ncompact:\n- c\n- d\nafter: 1\n");
        assert!(matches!(m.entry("tags").unwrap().value, Value::Opaque(_)));
        assert!(matches!(m.entry("compact").unwrap().value, Value::Opaque(_)));
        assert!(matches!(m.entry("after").unwrap().value, Value::Scalar(_)));
    }

    #[test]
    fn test_block_scalar_keeps_inner_comment_lines() {
        let m = root_mapping("script: |\n  # not a comment\n  echo hi\n\n# real comment\nnext: 2\n");
        let Value::Opaque(o) = &m.entry("script").unwrap().value else {
            panic!("block scalar should be opaque")
        };
        assert_eq!(o.continuation.len(), 2);
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["script", "next"]);
    }

    #[test]
    fn test_trailing_trivia_belongs_to_root() {
        let m = root_mapping("Rule:\n  when: always\n\n# trailing\n");
        assert!(matches!(m.items.last(), Some(Item::Trivia(_))));
        let Value::Mapping(rule) = &m.entry("Rule").unwrap().value else {
            panic!("Rule should be a mapping")
        };
        assert_eq!(rule.items.len(), 1);
    }

    #[test]
    fn test_empty_key_is_null_scalar() {
        let m = root_mapping("Core:\n# comment\nName: x\n");
        let Value::Scalar(s) = &m.entry("Core").unwrap().value else {
            panic!("Core should be a scalar")
        };
        assert!(s.is_null());
    }

    #[test]
    fn test_non_mapping_root() {
        assert!(matches!(parse("- a\n- b\n").root, Root::Other(_)));
        assert!(matches!(parse("just a scalar\n").root, Root::Other(_)));
    }

    #[test]
    fn test_flow_collection_continues_at_key_column() {
        let m = root_mapping("a: [1,\n2]\nb: {x: 1,\n  y: [2,\n3]}\nc: 3\n");
        let Value::Opaque(a) = &m.entry("a").unwrap().value else {
            panic!("a should be opaque")
        };
        assert_eq!(a.raw(), "[1,\n2]");
        let Value::Opaque(b) = &m.entry("b").unwrap().value else {
            panic!("b should be opaque")
        };
        assert_eq!(b.continuation.len(), 2);
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_anchored_block_mapping_keeps_its_properties() {
        let m = root_mapping("Core: &c # meta\n  Id: CORE-000007\nCopy: *c\n");
        let core = m.entry("Core").unwrap();
        assert_eq!(core.props, "&c");
        assert_eq!(core.trailing, " # meta");
        let Value::Mapping(inner) = &core.value else {
            panic!("anchored Core should be a mapping")
        };
        assert_eq!(inner.keys().collect::<Vec<_>>(), vec!["Id"]);
        assert!(matches!(m.entry("Copy").unwrap().value, Value::Opaque(_)));
    }

    #[test]
    fn test_tagged_scalar_is_a_scalar() {
        let m = root_mapping("Id: !!str CORE-000007\n");
        let id = m.entry("Id").unwrap();
        assert_eq!((id.props.as_str(), id.props_gap.as_str()), ("!!str", " "));
        let Value::Scalar(s) = &id.value else {
            panic!("tagged Id should be a scalar")
        };
        assert_eq!(s.as_string().as_deref(), Some("CORE-000007"));
    }

    #[test]
    fn test_comment_only_document() {
        let m = root_mapping("# nothing here\n\n");
        assert!(m.is_empty());
        assert_eq!(m.items.len(), 2);
    }
}
