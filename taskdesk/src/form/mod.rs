//! Add/update form for a single task.
//!
//! [`TaskForm`] is a synchronous state machine. Operations that need the
//! network or a screen change return an [`Effect`] for the application loop
//! to execute; request results are fed back through
//! [`TaskForm::on_response`].
//!
//! ```text
//! Loading ──load ok──▶ Ready ──submit──▶ Submitting ──ok──▶ Done
//!                        ▲                    │
//!                        └──────failure───────┘
//! ```
//!
//! Add mode starts in `Ready`. Cancel moves any state to `Done`.

pub mod controller;

use std::collections::BTreeMap;
use std::fmt;

use taskdesk_proto::task::TaskId;
use taskdesk_proto::validation::FieldError;

use crate::api::RequestId;
use crate::gateway::{FetchRequest, Toast};
use crate::route::Route;

pub use controller::TaskForm;

/// Whether the form creates a new task or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Create a new task.
    Add,
    /// Edit the task with this id.
    Update(TaskId),
}

impl Mode {
    /// Derives the mode from an optional route parameter.
    #[must_use]
    pub fn from_task_id(task_id: Option<TaskId>) -> Self {
        task_id.map_or(Self::Add, Self::Update)
    }

    /// The id being edited, in update mode.
    #[must_use]
    pub const fn task_id(&self) -> Option<&TaskId> {
        match self {
            Self::Add => None,
            Self::Update(id) => Some(id),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Update(_) => write!(f, "update"),
        }
    }
}

/// Lifecycle state of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// Waiting for the task to load (update mode only).
    Loading,
    /// Fields are editable.
    Ready,
    /// A create/update request is in flight.
    Submitting,
    /// The form has navigated away; terminal.
    Done,
}

impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Submitting => write!(f, "submitting"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Per-field validation messages.
///
/// Rebuilt wholesale on every submit; a missing key means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    /// Builds the map from validator output. For repeated fields the last
    /// error wins.
    #[must_use]
    pub fn from_field_errors(errors: Vec<FieldError>) -> Self {
        Self(errors.into_iter().map(|e| (e.field, e.err)).collect())
    }

    /// Message for `field`, if it has one.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether `field` has an error.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Removes every error.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterates `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Work the application loop must perform on behalf of a controller.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Execute a backend request; its result comes back tagged with `id`.
    Fetch {
        /// Correlation id for the response.
        id: RequestId,
        /// The request to execute.
        request: FetchRequest,
    },
    /// Switch to another screen.
    Navigate(Route),
    /// Show a notification.
    Notify(Toast),
}

/// Misuse of the form outside the state an operation requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// Fields can only change while the form is ready.
    #[error("form is not editable while {0}")]
    NotEditable(FormState),

    /// Reset needs update mode and a loaded task.
    #[error("reset is only available once an existing task has loaded")]
    ResetUnavailable,
}
