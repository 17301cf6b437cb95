//! Field model: typed form inputs and their conditional constraints.

use crate::conditions::Condition;
use crate::validation::Constraint;
use crate::value::{FieldValue, ValueMap};

/// One selectable option of a select or multi-input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    /// Submitted value.
    pub value: String,
    /// Human-readable label.
    pub label: String,
}

impl FieldOption {
    /// Creates a new option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// The kind of a field, fixing how it renders and what shape its value has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A plain `<input>` with the given HTML input type.
    Input {
        /// HTML input type (text, email, password, ...).
        input_type: String,
    },
    /// A multi-line `<textarea>`.
    Textarea {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
    /// A `<select>` dropdown over a fixed option list.
    Select {
        /// Available options in declaration order.
        options: Vec<FieldOption>,
    },
    /// A group of checkboxes, one per option, yielding a list value.
    MultiInput {
        /// Available options in declaration order.
        options: Vec<FieldOption>,
    },
    /// A challenge question with a free-text answer input.
    Captcha {
        /// The question shown to the user.
        question: String,
    },
}

impl FieldKind {
    /// Creates an input kind with the given HTML input type.
    pub fn input(input_type: impl Into<String>) -> Self {
        Self::Input {
            input_type: input_type.into(),
        }
    }

    /// Returns the renderer kind key for this field kind.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Textarea { .. } => "textarea",
            Self::Select { .. } => "select",
            Self::MultiInput { .. } => "multi-input",
            Self::Captcha { .. } => "captcha",
        }
    }
}

/// A constraint paired with an optional activation condition.
///
/// The constraint only participates in validation when the condition holds;
/// an absent condition means always active.
pub struct ConditionalConstraint {
    constraint: Box<dyn Constraint>,
    condition: Option<Box<dyn Condition>>,
}

impl std::fmt::Debug for ConditionalConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionalConstraint")
            .field("message", &self.constraint.message())
            .field("conditional", &self.condition.is_some())
            .finish()
    }
}

impl ConditionalConstraint {
    /// Creates an unconditional constraint.
    pub fn new(constraint: impl Constraint + 'static) -> Self {
        Self {
            constraint: Box::new(constraint),
            condition: None,
        }
    }

    /// Creates a conditional constraint from boxed parts.
    pub fn from_parts(
        constraint: Box<dyn Constraint>,
        condition: Option<Box<dyn Condition>>,
    ) -> Self {
        Self {
            constraint,
            condition,
        }
    }

    /// Attaches an activation condition.
    #[must_use]
    pub fn when(mut self, condition: impl Condition + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Returns whether the constraint is active for the given values.
    pub fn applies(&self, values: &ValueMap) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|condition| condition.matches(values))
    }

    /// Returns the wrapped constraint.
    pub fn constraint(&self) -> &dyn Constraint {
        self.constraint.as_ref()
    }
}

/// A single form input definition.
///
/// Fields are immutable once built. Value state never lives here: the
/// registry keeps values in session storage keyed by form and field name, so
/// one field model serves every concurrent session.
pub struct Field {
    name: String,
    kind: FieldKind,
    default_value: Option<FieldValue>,
    array_value: bool,
    conditional_constraints: Vec<ConditionalConstraint>,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default_value", &self.default_value)
            .field("array_value", &self.array_value)
            .field("constraints", &self.conditional_constraints.len())
            .finish()
    }
}

impl Field {
    /// Creates a new field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let array_value = matches!(kind, FieldKind::MultiInput { .. });
        Self {
            name: name.into(),
            kind,
            default_value: None,
            array_value,
            conditional_constraints: Vec::new(),
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Marks the field as carrying a list value.
    #[must_use]
    pub fn array_value(mut self) -> Self {
        self.array_value = true;
        self
    }

    /// Adds an unconditional constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: impl Constraint + 'static) -> Self {
        self.conditional_constraints
            .push(ConditionalConstraint::new(constraint));
        self
    }

    /// Adds a conditional constraint.
    #[must_use]
    pub fn conditional_constraint(mut self, constraint: ConditionalConstraint) -> Self {
        self.conditional_constraints.push(constraint);
        self
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns the default value, if any.
    pub fn default(&self) -> Option<&FieldValue> {
        self.default_value.as_ref()
    }

    /// Returns whether the field carries a list value.
    pub fn is_array_value(&self) -> bool {
        self.array_value
    }

    /// Returns the full constraint list.
    ///
    /// Filtering by condition truth happens during validation, not here.
    pub fn conditional_constraints(&self) -> &[ConditionalConstraint] {
        &self.conditional_constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::PresentCondition;
    use crate::validation::RequiredConstraint;

    #[test]
    fn test_field_builder() {
        let field = Field::new("email", FieldKind::input("email"))
            .default_value("nobody@example.com")
            .constraint(RequiredConstraint::new());

        assert_eq!(field.name(), "email");
        assert_eq!(field.kind().key(), "input");
        assert_eq!(
            field.default(),
            Some(&FieldValue::from("nobody@example.com"))
        );
        assert_eq!(field.conditional_constraints().len(), 1);
        assert!(!field.is_array_value());
    }

    #[test]
    fn test_multi_input_is_array_valued() {
        let field = Field::new(
            "toppings",
            FieldKind::MultiInput {
                options: vec![FieldOption::new("ham", "Ham")],
            },
        );
        assert!(field.is_array_value());
    }

    #[test]
    fn test_conditional_constraint_applies() {
        let conditional =
            ConditionalConstraint::new(RequiredConstraint::new()).when(PresentCondition::new("a"));

        let mut values = ValueMap::new();
        assert!(!conditional.applies(&values));

        values.insert("a".to_string(), FieldValue::from("x"));
        assert!(conditional.applies(&values));
    }

    #[test]
    fn test_unconditional_constraint_always_applies() {
        let conditional = ConditionalConstraint::new(RequiredConstraint::new());
        assert!(conditional.applies(&ValueMap::new()));
    }

    #[test]
    fn test_kind_keys() {
        assert_eq!(FieldKind::input("text").key(), "input");
        assert_eq!(FieldKind::Textarea { rows: 4, cols: 40 }.key(), "textarea");
        assert_eq!(
            FieldKind::Captcha {
                question: "2 + 2?".to_string()
            }
            .key(),
            "captcha"
        );
    }
}
