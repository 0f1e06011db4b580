//! Dataset records and their canonical text rendering.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Primary field used to render a record; a record without it is malformed.
pub const TITLE_FIELD: &str = "case_title";

/// Optional field appended to the rendering; defaults to empty when absent.
pub const SUMMARY_FIELD: &str = "summary";

/// One dataset record: a mapping of field name to JSON value, at a stable
/// ordinal position in the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub serde_json::Map<String, Value>);

impl Record {
    /// String value of a field, if present and a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

/// Canonical document text for one record.
///
/// This is the single derivation used at point-build time AND at probe
/// time; the verification query is only meaningful because both call sites
/// go through here. Pure: equal records yield byte-identical output.
///
/// Returns `None` when the title field is missing or not a string.
pub fn document_text(record: &Record) -> Option<String> {
    let title = record.field_str(TITLE_FIELD)?;
    let summary = record.field_str(SUMMARY_FIELD).unwrap_or_default();
    Some(format!("{title}: {summary}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: Value) -> Record {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn renders_title_and_summary() {
        let r = record(json!({"case_title": "State v. A", "summary": "bail granted"}));
        assert_eq!(document_text(&r).unwrap(), "State v. A: bail granted");
    }

    #[test]
    fn missing_summary_defaults_to_empty() {
        let r = record(json!({"case_title": "State v. B"}));
        assert_eq!(document_text(&r).unwrap(), "State v. B: ");
    }

    #[test]
    fn missing_title_yields_none() {
        let r = record(json!({"summary": "no title here"}));
        assert!(document_text(&r).is_none());
    }

    #[test]
    fn non_string_title_yields_none() {
        let r = record(json!({"case_title": 42}));
        assert!(document_text(&r).is_none());
    }

    #[test]
    fn derivation_is_deterministic() {
        let r = record(json!({"case_title": "State v. C", "summary": "denied", "year": 2015}));
        assert_eq!(document_text(&r), document_text(&r.clone()));
    }
}
