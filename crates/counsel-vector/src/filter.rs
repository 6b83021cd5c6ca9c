//! Payload filter model.
//!
//! A filter is a conjunction of equality/membership constraints over
//! payload fields, mirroring the subset of the vector database's filter
//! language the retrieval core actually uses: `is_latest = true`,
//! `profile_id = X`, `skills in [..]`, and so on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a condition matches a payload value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Payload field must equal this value exactly.
    Value(Value),

    /// Payload field must match any of these values. When the payload
    /// field is itself an array, any intersection counts as a match.
    Any(Vec<Value>),
}

/// A single field constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Payload field name
    pub key: String,

    /// Match requirement
    pub matches: MatchKind,
}

impl Condition {
    /// Evaluate this condition against a payload.
    ///
    /// A missing field never matches.
    pub fn evaluate(&self, payload: &Map<String, Value>) -> bool {
        let Some(actual) = payload.get(&self.key) else {
            return false;
        };
        match &self.matches {
            MatchKind::Value(expected) => actual == expected,
            MatchKind::Any(allowed) => match actual {
                Value::Array(elements) => elements.iter().any(|e| allowed.contains(e)),
                scalar => allowed.contains(scalar),
            },
        }
    }
}

/// A conjunction of conditions. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// All conditions must hold
    pub must: Vec<Condition>,
}

impl Filter {
    /// Create an empty filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: require a field to equal a value.
    pub fn must_equal(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.must.push(Condition {
            key: key.to_string(),
            matches: MatchKind::Value(value.into()),
        });
        self
    }

    /// Builder: require a field to match any of the given values.
    pub fn must_match_any(mut self, key: &str, values: Vec<Value>) -> Self {
        self.must.push(Condition {
            key: key.to_string(),
            matches: MatchKind::Any(values),
        });
        self
    }

    /// Evaluate the whole conjunction against a payload.
    pub fn evaluate(&self, payload: &Map<String, Value>) -> bool {
        self.must.iter().all(|c| c.evaluate(payload))
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.must.len()
    }

    /// True when no conditions are present.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::payload_keys;
    use serde_json::json;

    fn payload(entries: Value) -> Map<String, Value> {
        entries.as_object().cloned().unwrap()
    }

    #[test]
    fn test_equality_condition() {
        let filter = Filter::new().must_equal(payload_keys::IS_LATEST, true);

        assert!(filter.evaluate(&payload(json!({"is_latest": true}))));
        assert!(!filter.evaluate(&payload(json!({"is_latest": false}))));
        // Missing field never matches
        assert!(!filter.evaluate(&payload(json!({}))));
    }

    #[test]
    fn test_conjunction_requires_all() {
        let filter = Filter::new()
            .must_equal(payload_keys::IS_LATEST, true)
            .must_equal(payload_keys::PROFILE_ID, "cv-7");

        assert!(filter.evaluate(&payload(json!({"is_latest": true, "profile_id": "cv-7"}))));
        assert!(!filter.evaluate(&payload(json!({"is_latest": true, "profile_id": "cv-8"}))));
    }

    #[test]
    fn test_membership_against_array_payload() {
        let filter = Filter::new()
            .must_match_any(payload_keys::SKILLS, vec![json!("rust"), json!("go")]);

        assert!(filter.evaluate(&payload(json!({"skills": ["python", "rust"]}))));
        assert!(!filter.evaluate(&payload(json!({"skills": ["java"]}))));
    }

    #[test]
    fn test_membership_against_scalar_payload() {
        let filter = Filter::new()
            .must_match_any(payload_keys::SENIORITY_LEVEL, vec![json!("senior"), json!("lead")]);

        assert!(filter.evaluate(&payload(json!({"seniority_level": "senior"}))));
        assert!(!filter.evaluate(&payload(json!({"seniority_level": "junior"}))));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(filter.evaluate(&payload(json!({"anything": 1}))));
    }
}
