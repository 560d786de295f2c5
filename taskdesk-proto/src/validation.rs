//! Field-level validation for named entity kinds.
//!
//! [`validate_many_fields`] is pure: it maps an [`EntityKind`] and a
//! [`FieldMap`] to an ordered list of [`FieldError`]s. An empty list means the
//! fields are valid. Rules are checked in a fixed field order, so the output
//! order is deterministic.

use std::str::FromStr;

use crate::form::FieldMap;
use crate::task::{MAX_TASK_TITLE_LENGTH, TaskStatus};

/// Message used for every missing required field.
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Entity kinds the validator knows rules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A task create/update body.
    Task,
}

impl EntityKind {
    /// Name used to select this rule set.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Task => "task",
        }
    }

    const fn rules(self) -> &'static [(&'static str, &'static [Rule])] {
        match self {
            Self::Task => TASK_RULES,
        }
    }
}

/// Error returned when a string does not name an [`EntityKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no validation rules for entity kind {0:?}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Self::Task),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable message.
    pub err: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field: impl Into<String>, err: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            err: err.into(),
        }
    }
}

/// Task rules, checked in this field order.
const TASK_RULES: &[(&str, &[Rule])] = &[
    ("title", &[Rule::Required, Rule::MaxChars(MAX_TASK_TITLE_LENGTH)]),
    ("description", &[Rule::Required]),
    ("status", &[Rule::Required, Rule::TaskStatus]),
];

#[derive(Debug, Clone, Copy)]
enum Rule {
    Required,
    MaxChars(usize),
    TaskStatus,
}

impl Rule {
    /// Checks `value`; `None` means the rule passed.
    fn check(self, value: &str) -> Option<String> {
        match self {
            Self::Required => value.trim().is_empty().then(|| REQUIRED_MESSAGE.to_string()),
            Self::MaxChars(max) => {
                (value.chars().count() > max).then(|| format!("Must be at most {max} characters"))
            }
            Self::TaskStatus => value.parse::<TaskStatus>().is_err().then(|| {
                let names: Vec<&str> = TaskStatus::ALL.iter().map(TaskStatus::as_str).collect();
                format!("Must be one of: {}", names.join(", "))
            }),
        }
    }
}

/// Validates `fields` against the rules for `kind`.
///
/// A field absent from the map is treated as empty. At most one error is
/// reported per field: the first rule that fails.
#[must_use]
pub fn validate_many_fields(kind: EntityKind, fields: &FieldMap) -> Vec<FieldError> {
    kind.rules()
        .iter()
        .filter_map(|(field, rules)| {
            let value = fields.get(*field).map_or("", String::as_str);
            rules
                .iter()
                .find_map(|rule| rule.check(value))
                .map(|err| FieldError::new(*field, err))
        })
        .collect()
}
