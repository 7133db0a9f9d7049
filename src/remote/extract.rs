use serde_json::Value;

use crate::error::{Failure, Result};
use crate::model::{Collection, Entity};

pub const DEFAULT_COLLECTION_KEYS: [&str; 4] = ["products", "items", "users", "data"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtractionRule {
    BareArray,
    Key(String),
}

impl ExtractionRule {
    fn apply<'a>(&self, document: &'a Value) -> Option<&'a Vec<Value>> {
        match self {
            Self::BareArray => document.as_array(),
            Self::Key(key) => document.get(key.as_str()).and_then(Value::as_array),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::BareArray => "array".to_string(),
            Self::Key(key) => format!("'{key}'"),
        }
    }
}

pub fn default_rules() -> Vec<ExtractionRule> {
    rules_for_keys(DEFAULT_COLLECTION_KEYS.iter().copied())
}

pub fn rules_for_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<ExtractionRule> {
    let mut rules = vec![ExtractionRule::BareArray];
    rules.extend(keys.into_iter().map(|k| ExtractionRule::Key(k.to_string())));
    rules
}

/// Evaluates `rules` in order and returns the records of the first match.
pub fn extract_collection(document: &Value, rules: &[ExtractionRule]) -> Result<Collection> {
    let Some(items) = rules.iter().find_map(|rule| rule.apply(document)) else {
        let expected = rules
            .iter()
            .map(ExtractionRule::describe)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Failure::validation(format!(
            "response is not a record list (expected one of: {expected})"
        )));
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            Entity::from_value(item.clone())
                .ok_or_else(|| Failure::validation(format!("record {idx} is not an object")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_is_taken_as_is() {
        let doc = json!([{"id": "1"}, {"id": "2"}]);
        let records = extract_collection(&doc, &default_rules()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id(), "2");
    }

    #[test]
    fn first_matching_key_wins() {
        let doc = json!({
            "data": [{"id": "d"}],
            "items": [{"id": "i"}],
        });
        let records = extract_collection(&doc, &default_rules()).unwrap();
        assert_eq!(records[0].id(), "i");
    }

    #[test]
    fn key_holding_a_non_array_is_skipped() {
        let doc = json!({"products": {"id": "x"}, "users": [{"id": "u"}]});
        let records = extract_collection(&doc, &default_rules()).unwrap();
        assert_eq!(records[0].id(), "u");
    }

    #[test]
    fn unrecognized_document_is_a_validation_failure() {
        let doc = json!({"rows": []});
        let err = extract_collection(&doc, &default_rules()).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn non_object_records_are_rejected() {
        let doc = json!([{"id": "1"}, 7]);
        let err = extract_collection(&doc, &default_rules()).unwrap_err();
        assert_eq!(err, Failure::validation("record 1 is not an object"));
    }
}
