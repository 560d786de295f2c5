//! Editable working copy of a task's fields.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Field name → raw value, the shape the validator consumes.
pub type FieldMap = BTreeMap<String, String>;

/// An editable field of the task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    /// Task title.
    Title,
    /// Task status (wire name of a `TaskStatus`).
    Status,
    /// Task description.
    Description,
}

impl FormField {
    /// Fields in display order.
    pub const ALL: [Self; 3] = [Self::Title, Self::Status, Self::Description];

    /// Field name as used in request bodies and error maps.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Status => "status",
            Self::Description => "description",
        }
    }

    /// Label shown next to the input.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Status => "Status",
            Self::Description => "Description",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a [`FormField`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field: {0:?}")]
pub struct UnknownField(pub String);

impl FromStr for FormField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Form values for creating or updating a task.
///
/// Serialized as the body of `POST /tasks` and `PUT /tasks/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    /// Task title.
    #[serde(default)]
    pub title: String,
    /// Task description.
    #[serde(default)]
    pub description: String,
    /// Task status, as typed or selected (not yet validated).
    #[serde(default)]
    pub status: String,
}

impl FormData {
    /// Copies the editable fields of a loaded task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.to_string(),
        }
    }

    /// Returns the current value of `field`.
    #[must_use]
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Status => &self.status,
            FormField::Description => &self.description,
        }
    }

    /// Replaces the value of `field`.
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Title => self.title = value,
            FormField::Status => self.status = value,
            FormField::Description => self.description = value,
        }
    }

    /// Field map view for the validator.
    #[must_use]
    pub fn to_field_map(&self) -> FieldMap {
        FormField::ALL
            .into_iter()
            .map(|field| (field.name().to_string(), self.get(field).to_string()))
            .collect()
    }
}
