//! Line-level YAML syntax helpers
//!
//! Everything here works on single physical lines. A line is split into its
//! text and its line terminator so that re-joining them reproduces the input.

use crate::errors::{Result, RuleError};

/// One physical line of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawLine {
    pub text: String,
    /// `"\n"`, `"\r\n"` or empty for a final line without terminator
    pub eol: String,
}

impl RawLine {
    pub fn new(text: impl Into<String>, eol: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            eol: eol.into(),
        }
    }

    pub fn indent(&self) -> usize {
        indent_of(&self.text)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_comment(&self) -> bool {
        self.text.trim_start().starts_with('#')
    }

    /// Blank lines, comments, document markers and directives
    pub fn is_trivia(&self) -> bool {
        self.is_blank() || self.is_comment() || self.is_marker()
    }

    /// `---`, `...` and `%` directives at column zero
    pub fn is_marker(&self) -> bool {
        let t = strip_comment_tail(&self.text);
        t == "---" || t == "..." || self.text.starts_with('%')
    }

    /// A block sequence entry (`- item` or a bare `-`)
    pub fn is_sequence_item(&self) -> bool {
        let rest = self.text.trim_start_matches(' ');
        rest == "-" || rest.starts_with("- ") || rest.starts_with("-\t")
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.text);
        out.push_str(&self.eol);
    }
}

/// Split text into lines, keeping each terminator with its line
pub(crate) fn split_lines(text: &str) -> Vec<RawLine> {
    text.split_inclusive('\n')
        .map(|piece| {
            if let Some(body) = piece.strip_suffix("\r\n") {
                RawLine::new(body, "\r\n")
            } else if let Some(body) = piece.strip_suffix('\n') {
                RawLine::new(body, "\n")
            } else {
                RawLine::new(piece, "")
            }
        })
        .collect()
}

/// Line terminator used by the first terminated line, `"\n"` otherwise
pub(crate) fn detect_eol(lines: &[RawLine]) -> String {
    lines
        .iter()
        .map(|l| l.eol.as_str())
        .find(|eol| !eol.is_empty())
        .unwrap_or("\n")
        .to_string()
}

pub(crate) fn indent_of(text: &str) -> usize {
    text.len() - text.trim_start_matches(' ').len()
}

fn strip_comment_tail(text: &str) -> &str {
    let (value, _) = split_comment(text);
    value.trim_end()
}

/// Split `text` at the first `#` that starts a comment.
///
/// A `#` only starts a comment at the beginning of the text or after
/// whitespace, and never inside a quoted scalar.
pub(crate) fn split_comment(text: &str) -> (&str, &str) {
    let mut quote: Option<char> = None;
    let mut prev_ws = true;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        match quote {
            Some('"') => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    quote = None;
                }
            }
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == '#' && prev_ws {
                    return (&text[..i], &text[i..]);
                }
                if (c == '"' || c == '\'') && prev_ws {
                    quote = Some(c);
                }
            }
        }
        prev_ws = c == ' ' || c == '\t';
    }
    (text, "")
}

/// The pieces of a `key: value  # comment` line after its indentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyLine {
    pub key: String,
    pub key_raw: String,
    pub pre_colon: String,
    pub gap: String,
    pub inline: String,
    pub trailing: String,
}

/// Parse the text of a mapping entry line (indentation already removed).
///
/// Returns `None` when the text is not a `key:` line.
pub(crate) fn parse_key_line(rest: &str) -> Option<KeyLine> {
    let (key_raw, key, after_key) = match rest.chars().next()? {
        '"' => {
            let end = closing_double_quote(rest)?;
            let raw = &rest[..=end];
            (raw, decode_scalar(raw)?, &rest[end + 1..])
        }
        '\'' => {
            let end = closing_single_quote(rest)?;
            let raw = &rest[..=end];
            (raw, decode_scalar(raw)?, &rest[end + 1..])
        }
        c if "?[]{}&*!|>%@`-#,".contains(c) && !is_plain_dash_key(rest) => return None,
        _ => {
            let colon = plain_key_colon(rest)?;
            let raw = rest[..colon].trim_end();
            if raw.is_empty() {
                return None;
            }
            (raw, raw.to_string(), &rest[raw.len()..])
        }
    };

    let pre_colon_len = after_key.len() - after_key.trim_start_matches(' ').len();
    let pre_colon = &after_key[..pre_colon_len];
    let after_colon = after_key[pre_colon_len..].strip_prefix(':')?;
    if !(after_colon.is_empty() || after_colon.starts_with(' ') || after_colon.starts_with('\t')) {
        return None;
    }

    let (value_part, comment) = split_comment(after_colon);
    let inline = value_part.trim();
    let (gap, trailing) = if inline.is_empty() {
        (String::new(), after_colon.to_string())
    } else {
        let lead = value_part.len() - value_part.trim_start().len();
        let tail = &value_part[lead + inline.len()..];
        (value_part[..lead].to_string(), format!("{}{}", tail, comment))
    };

    Some(KeyLine {
        key,
        key_raw: key_raw.to_string(),
        pre_colon: pre_colon.to_string(),
        gap,
        inline: inline.to_string(),
        trailing,
    })
}

/// Split leading `&anchor` and `!tag` properties off an inline value.
///
/// Returns the properties, the whitespace after them and the rest of the
/// value; the first two are empty when the value carries no properties.
pub(crate) fn split_properties(inline: &str) -> (&str, &str, &str) {
    let mut end = 0;
    let mut rest = inline;
    while rest.starts_with(['&', '!']) {
        let token = rest.find([' ', '\t']).unwrap_or(rest.len());
        end = inline.len() - rest.len() + token;
        rest = rest[token..].trim_start_matches([' ', '\t']);
    }
    let gap_end = inline.len() - rest.len();
    (&inline[..end], &inline[end..gap_end], rest)
}

/// Net count of opened flow brackets on a line, ignoring quoted text and
/// comments
pub(crate) fn flow_depth(text: &str) -> i64 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev = ' ';
    for c in text.chars() {
        match quote {
            Some('"') => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    quote = None;
                }
            }
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                let after_separator = prev == ' ' || prev == '\t' || "[{,:".contains(prev);
                match c {
                    '#' if prev == ' ' || prev == '\t' => break,
                    '"' | '\'' if after_separator => quote = Some(c),
                    '[' | '{' => depth += 1,
                    ']' | '}' => depth -= 1,
                    _ => {}
                }
            }
        }
        prev = c;
    }
    depth
}

// `-foo: 1` is a plain key; `- foo` is a sequence item
fn is_plain_dash_key(rest: &str) -> bool {
    rest.starts_with('-') && !rest.starts_with("- ") && rest != "-" && !rest.starts_with("-\t")
}

fn plain_key_colon(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && i > 0 && (bytes[i - 1] == b' ' || bytes[i - 1] == b'\t') {
            return None;
        }
        if b == b':' {
            match bytes.get(i + 1) {
                None | Some(b' ') | Some(b'\t') => return Some(i),
                _ => {}
            }
        }
    }
    None
}

fn closing_double_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(i);
        }
    }
    None
}

fn closing_single_quote(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Decode a single-line scalar to its string form; `None` for null.
pub(crate) fn decode_scalar(raw: &str) -> Option<String> {
    match serde_yaml::from_str::<serde_yaml::Value>(raw).ok()? {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Render a string as a scalar: plain when it reads back unchanged,
/// double-quoted otherwise.
pub(crate) fn encode_scalar(value: &str) -> String {
    if is_plain_safe(value) {
        value.to_string()
    } else {
        quote_double(value)
    }
}

fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if !(first.is_ascii_alphanumeric() || first == '_' || first == '/' || first == '.') {
        return false;
    }
    if value.ends_with(' ') || value.contains(": ") || value.contains(" #") {
        return false;
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || " _.-/".contains(c))
    {
        return false;
    }
    matches!(
        serde_yaml::from_str::<serde_yaml::Value>(value),
        Ok(serde_yaml::Value::String(ref s)) if s == value
    )
}

fn quote_double(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Reject tab characters used as indentation on a content line
pub(crate) fn check_indentation(line: &RawLine, line_no: usize) -> Result<()> {
    let rest = &line.text[line.indent()..];
    if rest.starts_with('\t') {
        return Err(RuleError::Parse {
            message: format!("tab character used for indentation at line {}", line_no),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_keeps_terminators() {
        let lines = split_lines("a: 1\r\nb: 2\nc: 3");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], RawLine::new("a: 1", "\r\n"));
        assert_eq!(lines[1], RawLine::new("b: 2", "\n"));
        assert_eq!(lines[2], RawLine::new("c: 3", ""));
        assert_eq!(detect_eol(&lines), "\r\n");
    }

    #[test]
    fn test_split_lines_empty_text() {
        assert!(split_lines("").is_empty());
        assert_eq!(detect_eol(&[]), "\n");
    }

    #[test]
    fn test_parse_key_line_with_comment() {
        let kl = parse_key_line("Id:   CORE-000001   # assigned").unwrap();
        assert_eq!(kl.key, "Id");
        assert_eq!(kl.gap, "   ");
        assert_eq!(kl.inline, "CORE-000001");
        assert_eq!(kl.trailing, "   # assigned");
    }

    #[test]
    fn test_parse_key_line_without_value() {
        let kl = parse_key_line("Core:  # metadata").unwrap();
        assert_eq!(kl.key, "Core");
        assert_eq!(kl.inline, "");
        assert_eq!(kl.gap, "");
        assert_eq!(kl.trailing, "  # metadata");
    }

    #[test]
    fn test_parse_key_line_quoted_key() {
        let kl = parse_key_line("\"odd: key\" : value").unwrap();
        assert_eq!(kl.key, "odd: key");
        assert_eq!(kl.key_raw, "\"odd: key\"");
        assert_eq!(kl.pre_colon, " ");
        assert_eq!(kl.inline, "value");
    }

    #[test]
    fn test_parse_key_line_hash_inside_quotes() {
        let kl = parse_key_line("note: \"a # b\" # real").unwrap();
        assert_eq!(kl.inline, "\"a # b\"");
        assert_eq!(kl.trailing, " # real");
    }

    #[test]
    fn test_parse_key_line_rejects_non_keys() {
        assert!(parse_key_line("- item").is_none());
        assert!(parse_key_line("http://example.com").is_none());
        assert!(parse_key_line("just text").is_none());
        assert!(parse_key_line("[a, b]").is_none());
    }

    #[test]
    fn test_url_value_is_not_split() {
        let kl = parse_key_line("url: http://example.com/a#frag").unwrap();
        assert_eq!(kl.inline, "http://example.com/a#frag");
        assert_eq!(kl.trailing, "");
    }

    #[test]
    fn test_encode_scalar_plain_and_quoted() {
        assert_eq!(encode_scalar("CORE-000042"), "CORE-000042");
        assert_eq!(encode_scalar("Published"), "Published");
        assert_eq!(encode_scalar("true"), "\"true\"");
        assert_eq!(encode_scalar("123"), "\"123\"");
        assert_eq!(encode_scalar("a: b"), "\"a: b\"");
        assert_eq!(encode_scalar(""), "\"\"");
    }

    #[test]
    fn test_decode_scalar() {
        assert_eq!(decode_scalar("'it''s'"), Some("it's".to_string()));
        assert_eq!(decode_scalar("\"a\\tb\""), Some("a\tb".to_string()));
        assert_eq!(decode_scalar("~"), None);
        assert_eq!(decode_scalar("42"), Some("42".to_string()));
    }

    #[test]
    fn test_split_properties() {
        assert_eq!(split_properties("&c"), ("&c", "", ""));
        assert_eq!(split_properties("!!str  CORE-000007"), ("!!str", "  ", "CORE-000007"));
        assert_eq!(split_properties("&a !!map {x: 1}"), ("&a !!map", " ", "{x: 1}"));
        assert_eq!(split_properties("plain"), ("", "", "plain"));
        assert_eq!(split_properties("*alias"), ("", "", "*alias"));
    }

    #[test]
    fn test_flow_depth_skips_quotes_and_comments() {
        assert_eq!(flow_depth("[1,"), 1);
        assert_eq!(flow_depth("{a: [1, 2],"), 1);
        assert_eq!(flow_depth("2]"), -1);
        assert_eq!(flow_depth("[\"]\", 'x]'"), 1);
        assert_eq!(flow_depth("[a, # ]]"), 1);
        assert_eq!(flow_depth("[don't]"), 0);
    }

    #[test]
    fn test_marker_lines_are_trivia() {
        assert!(RawLine::new("---", "\n").is_trivia());
        assert!(RawLine::new("... # end", "\n").is_trivia());
        assert!(RawLine::new("%YAML 1.2", "\n").is_trivia());
        assert!(!RawLine::new("a: 1", "\n").is_trivia());
    }
}
