/// Starting text for a new rule
pub const DEFAULT_TEMPLATE: &str = "\
# New rule
Core:
  Status: Draft
# Rule:
#   when: <condition>
#   then: <action>
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::model::CoreIdState;

    #[test]
    fn test_default_template_is_a_draft_without_id() {
        let doc = Document::parse(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(doc.to_string(), DEFAULT_TEMPLATE);
        assert_eq!(CoreIdState::classify(&doc), CoreIdState::Absent);
        let status = doc
            .get(&["Core", "Status"])
            .and_then(|n| n.as_scalar())
            .and_then(|s| s.as_string());
        assert_eq!(status.as_deref(), Some("Draft"));
    }
}
