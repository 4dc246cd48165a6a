use ruledesk_core_types::RequestId;
use thiserror::Error;

/// Result type alias using RuleError
pub type Result<T> = std::result::Result<T, RuleError>;

/// Result type alias for operations that cross crate boundaries
pub type ExResult<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used by the HTTP surface, the CLI
/// and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    Parse,
    NotFound,

    // Persistence
    Conflict,
    Allocation,
    Persistence,
    Serialization,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Parse => "ERR_PARSE",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::Allocation => "ERR_ALLOCATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised by the document model, rule model and allocators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Rule text is not well-formed
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Rule not found: {rule_id}")]
    RuleNotFound { rule_id: String },

    /// The stored revision moved since the caller read it
    #[error("Rule {rule_id} was modified concurrently: expected revision {expected}, found {actual}")]
    Conflict {
        rule_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Identifier sequence exhausted after CORE-999999")]
    SequenceExhausted,

    #[error("Invalid core identifier: {value:?}")]
    InvalidCoreId { value: String },

    /// `Core` exists but cannot hold `Id`/`Status`
    #[error("Invalid Core section: {reason}")]
    InvalidCoreSection { reason: String },

    #[error("Path does not lead through a mapping: {path:?}")]
    NotAMapping { path: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<RuleError> for ExError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::Parse { message } => ExError::new(ExErrorKind::Parse)
                .with_op("parse_document")
                .with_message(message),

            RuleError::RuleNotFound { rule_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(rule_id)
                .with_message("Rule not found"),

            RuleError::Conflict {
                rule_id,
                expected,
                actual,
            } => ExError::new(ExErrorKind::Conflict)
                .with_entity_id(rule_id)
                .with_message(format!(
                    "Expected revision {}, found {}",
                    expected, actual
                )),

            RuleError::SequenceExhausted => ExError::new(ExErrorKind::Allocation)
                .with_op("allocate_core_id")
                .with_message("Identifier sequence exhausted after CORE-999999"),

            RuleError::InvalidCoreId { value } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid core identifier: {:?}", value)),

            RuleError::InvalidCoreSection { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_message(format!("Invalid Core section: {}", reason)),

            RuleError::NotAMapping { path } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("set_document_path")
                .with_message(format!("Path does not lead through a mapping: {:?}", path)),

            RuleError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            RuleError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes_are_stable() {
        let cases = [
            (ExErrorKind::Parse, "ERR_PARSE"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::Conflict, "ERR_CONFLICT"),
            (ExErrorKind::Allocation, "ERR_ALLOCATION"),
            (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
            (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_rule_error_maps_to_kind() {
        let cases: Vec<(RuleError, ExErrorKind)> = vec![
            (
                RuleError::Parse {
                    message: "bad".into(),
                },
                ExErrorKind::Parse,
            ),
            (
                RuleError::RuleNotFound {
                    rule_id: "r1".into(),
                },
                ExErrorKind::NotFound,
            ),
            (
                RuleError::Conflict {
                    rule_id: "r1".into(),
                    expected: 1,
                    actual: 2,
                },
                ExErrorKind::Conflict,
            ),
            (
                RuleError::Serialization {
                    message: "eof".into(),
                },
                ExErrorKind::Serialization,
            ),
            (RuleError::SequenceExhausted, ExErrorKind::Allocation),
            (
                RuleError::InvalidCoreSection {
                    reason: "scalar".into(),
                },
                ExErrorKind::InvalidInput,
            ),
        ];
        for (err, kind) in cases {
            let ex: ExError = err.into();
            assert_eq!(ex.kind(), kind);
        }
    }

    #[test]
    fn test_not_found_carries_entity_id() {
        let ex: ExError = RuleError::RuleNotFound {
            rule_id: "rule-9".into(),
        }
        .into();
        assert_eq!(ex.entity_id(), Some("rule-9"));
        assert!(ex.to_string().starts_with("[ERR_NOT_FOUND]"));
    }
}
