//! Conditions gating conditional constraints and processors.

use crate::value::ValueMap;

/// Trait for predicates over the current form values.
///
/// Evaluation must be side-effect-free: implementations only read the value
/// map, never mutate it.
pub trait Condition: Send + Sync {
    /// Returns whether the condition holds for the given values.
    fn matches(&self, values: &ValueMap) -> bool;
}

/// Condition that holds when a field's value is in an accepted set.
///
/// For multi-valued fields the condition holds when any selected item is
/// accepted.
#[derive(Debug, Clone)]
pub struct ValueMatchCondition {
    field: String,
    accepted: Vec<String>,
}

impl ValueMatchCondition {
    /// Creates a new ValueMatchCondition.
    pub fn new(field: impl Into<String>, accepted: Vec<String>) -> Self {
        Self {
            field: field.into(),
            accepted,
        }
    }
}

impl Condition for ValueMatchCondition {
    fn matches(&self, values: &ValueMap) -> bool {
        values.get(&self.field).is_some_and(|value| {
            self.accepted
                .iter()
                .any(|accepted| value.contains(accepted))
        })
    }
}

/// Condition that holds when a field has a non-empty value.
#[derive(Debug, Clone)]
pub struct PresentCondition {
    field: String,
}

impl PresentCondition {
    /// Creates a new PresentCondition.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Condition for PresentCondition {
    fn matches(&self, values: &ValueMap) -> bool {
        values.get(&self.field).is_some_and(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn test_value_match_condition() {
        let condition = ValueMatchCondition::new("delivery", vec!["post".to_string()]);

        let mut values = ValueMap::new();
        assert!(!condition.matches(&values));

        values.insert("delivery".to_string(), FieldValue::from("pickup"));
        assert!(!condition.matches(&values));

        values.insert("delivery".to_string(), FieldValue::from("post"));
        assert!(condition.matches(&values));
    }

    #[test]
    fn test_value_match_condition_multi_value() {
        let condition = ValueMatchCondition::new("extras", vec!["gift-wrap".to_string()]);

        let mut values = ValueMap::new();
        values.insert(
            "extras".to_string(),
            FieldValue::from(vec!["express".to_string(), "gift-wrap".to_string()]),
        );
        assert!(condition.matches(&values));
    }

    #[test]
    fn test_present_condition() {
        let condition = PresentCondition::new("phone");

        let mut values = ValueMap::new();
        assert!(!condition.matches(&values));

        values.insert("phone".to_string(), FieldValue::from("  "));
        assert!(!condition.matches(&values));

        values.insert("phone".to_string(), FieldValue::from("555-0100"));
        assert!(condition.matches(&values));
    }
}
