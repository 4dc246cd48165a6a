//! `Core` metadata carried inside rule documents
//!
//! ```yaml
//! Core:
//!   Id: CORE-000042
//!   Status: Published
//! ```

use crate::document::{Document, Node};
use crate::errors::{Result, RuleError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

pub const CORE_SECTION: &str = "Core";
pub const ID_FIELD: &str = "Id";
pub const STATUS_FIELD: &str = "Status";

pub const ID_PATH: [&str; 2] = [CORE_SECTION, ID_FIELD];
pub const STATUS_PATH: [&str; 2] = [CORE_SECTION, STATUS_FIELD];

/// Largest numeric suffix a core identifier can carry
pub const MAX_CORE_NUMBER: u32 = 999_999;

fn core_id_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^CORE-[0-9]{6}$").ok()).as_ref()
}

/// Immutable rule identifier rendered as `CORE-NNNNNN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoreId(u32);

impl CoreId {
    /// First identifier handed out by an empty sequence
    pub const FIRST: CoreId = CoreId(1);

    /// # Errors
    ///
    /// `RuleError::InvalidCoreId` when `number` needs more than six digits.
    pub fn from_number(number: u32) -> Result<Self> {
        if number > MAX_CORE_NUMBER {
            return Err(RuleError::InvalidCoreId {
                value: number.to_string(),
            });
        }
        Ok(CoreId(number))
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    /// Whether `value` has the `CORE-` + six digits shape
    pub fn is_well_formed(value: &str) -> bool {
        core_id_regex().is_some_and(|re| re.is_match(value))
    }

    /// # Errors
    ///
    /// `RuleError::SequenceExhausted` past `CORE-999999`.
    pub fn successor(&self) -> Result<CoreId> {
        if self.0 >= MAX_CORE_NUMBER {
            return Err(RuleError::SequenceExhausted);
        }
        Ok(CoreId(self.0 + 1))
    }

    /// Identifier following the current maximum, or [`CoreId::FIRST`]
    ///
    /// # Errors
    ///
    /// `RuleError::SequenceExhausted` past `CORE-999999`.
    pub fn next_after(max: Option<CoreId>) -> Result<CoreId> {
        match max {
            Some(id) => id.successor(),
            None => Ok(CoreId::FIRST),
        }
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CORE-{:06}", self.0)
    }
}

impl FromStr for CoreId {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        if !Self::is_well_formed(s) {
            return Err(RuleError::InvalidCoreId {
                value: s.to_string(),
            });
        }
        s[5..]
            .parse::<u32>()
            .map(CoreId)
            .map_err(|_| RuleError::InvalidCoreId {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for CoreId {
    type Error = RuleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CoreId> for String {
    fn from(id: CoreId) -> Self {
        id.to_string()
    }
}

/// Lifecycle status recorded in `Core.Status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreStatus {
    Draft,
    Published,
}

impl CoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoreStatus::Draft => "Draft",
            CoreStatus::Published => "Published",
        }
    }
}

impl fmt::Display for CoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoreStatus {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Draft" => Ok(CoreStatus::Draft),
            "Published" => Ok(CoreStatus::Published),
            other => Err(RuleError::InvalidInput {
                reason: format!("unknown Core.Status {:?}", other),
            }),
        }
    }
}

/// What a document's `Core.Id` currently holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreIdState {
    /// No `Core.Id`, or an explicit null
    Absent,
    /// Present but not `CORE-` + six digits; carries the source text
    Invalid(String),
    Valid(CoreId),
}

impl CoreIdState {
    /// Classify the document's `Core.Id`.
    ///
    /// Plain and quoted scalars are read from the tree. Aliases, flow
    /// sections and other verbatim values are read from the decoded
    /// document so a valid identifier is recognised whatever its syntax.
    pub fn classify(doc: &Document) -> Self {
        let node = doc.get(&ID_PATH);
        if let Some(Node::Scalar(scalar)) = node {
            return Self::from_decoded(scalar.as_string());
        }
        let pointer = format!("/{}/{}", CORE_SECTION, ID_FIELD);
        let decoded = doc
            .to_json()
            .ok()
            .and_then(|json| json.pointer(&pointer).cloned());
        match decoded {
            None | Some(serde_json::Value::Null) => CoreIdState::Absent,
            Some(serde_json::Value::String(value)) => Self::from_decoded(Some(value)),
            Some(other) => CoreIdState::Invalid(
                node.map_or_else(|| other.to_string(), |n| n.raw().trim().to_string()),
            ),
        }
    }

    fn from_decoded(value: Option<String>) -> Self {
        match value {
            None => CoreIdState::Absent,
            Some(value) => match value.parse::<CoreId>() {
                Ok(id) => CoreIdState::Valid(id),
                Err(_) => CoreIdState::Invalid(value),
            },
        }
    }

    pub fn valid(&self) -> Option<CoreId> {
        match self {
            CoreIdState::Valid(id) => Some(*id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_id_format() {
        assert_eq!(CoreId::FIRST.to_string(), "CORE-000001");
        assert_eq!(CoreId::from_number(42).unwrap().to_string(), "CORE-000042");
        assert_eq!(
            CoreId::from_number(999_999).unwrap().to_string(),
            "CORE-999999"
        );
        assert!(CoreId::from_number(1_000_000).is_err());
    }

    #[test]
    fn test_core_id_parse() {
        assert_eq!("CORE-000041".parse::<CoreId>().unwrap().number(), 41);
        for bad in ["CORE-41", "CORE-0000041", "core-000041", "CORE-00004a", " CORE-000041"] {
            assert!(bad.parse::<CoreId>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_well_formed_shape() {
        assert!(CoreId::is_well_formed("CORE-000000"));
        assert!(CoreId::is_well_formed("CORE-123456"));
        assert!(!CoreId::is_well_formed("CORE-123456\n"));
        assert!(!CoreId::is_well_formed("CORE-１２３４５６"));
    }

    #[test]
    fn test_successor_and_exhaustion() {
        let max = CoreId::from_number(41).unwrap();
        assert_eq!(CoreId::next_after(Some(max)).unwrap().to_string(), "CORE-000042");
        assert_eq!(CoreId::next_after(None).unwrap(), CoreId::FIRST);
        let last = CoreId::from_number(MAX_CORE_NUMBER).unwrap();
        assert_eq!(last.successor(), Err(RuleError::SequenceExhausted));
    }

    #[test]
    fn test_core_id_serde_as_string() {
        let id = CoreId::from_number(7).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"CORE-000007\"");
        let back: CoreId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<CoreId>("\"CORE-7\"").is_err());
    }

    #[test]
    fn test_classify_three_ways() {
        let classify = |text: &str| CoreIdState::classify(&Document::parse(text).unwrap());

        assert_eq!(classify("Name: x\n"), CoreIdState::Absent);
        assert_eq!(classify("Core:\n  Status: Draft\n"), CoreIdState::Absent);
        assert_eq!(classify("Core:\n  Id: ~\n"), CoreIdState::Absent);
        assert_eq!(
            classify("Core:\n  Id: CORE-12\n"),
            CoreIdState::Invalid("CORE-12".to_string())
        );
        assert_eq!(
            classify("Core:\n  Id: 123456\n"),
            CoreIdState::Invalid("123456".to_string())
        );
        assert_eq!(
            classify("Core:\n  Id: [CORE-000001]\n"),
            CoreIdState::Invalid("[CORE-000001]".to_string())
        );
        assert_eq!(
            classify("Core:\n  Id: \"CORE-000009\"\n"),
            CoreIdState::Valid(CoreId::from_number(9).unwrap())
        );
    }

    #[test]
    fn test_classify_tagged_aliased_and_flow_ids() {
        let classify = |text: &str| CoreIdState::classify(&Document::parse(text).unwrap());
        let id = |n| CoreIdState::Valid(CoreId::from_number(n).unwrap());

        assert_eq!(classify("Core:\n  Id: !!str CORE-000007\n"), id(7));
        assert_eq!(classify("base: &i CORE-000004\nCore:\n  Id: *i\n"), id(4));
        assert_eq!(classify("Core: {Id: CORE-000005, Status: Draft}\n"), id(5));
        assert_eq!(classify("Core: {Status: Draft}\n"), CoreIdState::Absent);
        assert_eq!(
            classify("Core: {Id: CORE-5}\n"),
            CoreIdState::Invalid("CORE-5".to_string())
        );
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("Published".parse::<CoreStatus>().unwrap(), CoreStatus::Published);
        assert_eq!(CoreStatus::Draft.to_string(), "Draft");
        assert!("published".parse::<CoreStatus>().is_err());
    }
}
