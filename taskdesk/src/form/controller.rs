//! The task form controller.

use serde_json::{Value, json};
use taskdesk_proto::form::{FormData, FormField};
use taskdesk_proto::task::{Task, TaskEnvelope};
use taskdesk_proto::validation::{EntityKind, validate_many_fields};

use super::{Effect, FormError, FormErrors, FormState, Mode};
use crate::api::RequestId;
use crate::gateway::{FetchRequest, GatewayError, Toast};
use crate::route::Route;
use crate::session::Session;

/// What an in-flight request was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Load,
    Submit,
}

/// Controller for the add/update task form.
///
/// Owns the editable [`FormData`], the per-field [`FormErrors`], and the
/// read-only copy of the task loaded in update mode. The mode is fixed at
/// construction.
#[derive(Debug)]
pub struct TaskForm {
    mode: Mode,
    session: Session,
    state: FormState,
    data: FormData,
    errors: FormErrors,
    loaded: Option<Task>,
    pending: Option<(RequestId, PendingKind)>,
}

impl TaskForm {
    /// Creates a form for `task_id` (update mode) or a new task (add mode).
    ///
    /// Update-mode forms start in [`FormState::Loading`]; call
    /// [`initialize`](Self::initialize) to get the load request.
    #[must_use]
    pub fn new(task_id: Option<taskdesk_proto::task::TaskId>, session: Session) -> Self {
        let mode = Mode::from_task_id(task_id);
        let state = match mode {
            Mode::Add => FormState::Ready,
            Mode::Update(_) => FormState::Loading,
        };
        Self {
            mode,
            session,
            state,
            data: FormData::default(),
            errors: FormErrors::default(),
            loaded: None,
            pending: None,
        }
    }

    /// The form's mode.
    #[must_use]
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> FormState {
        self.state
    }

    /// Current field values.
    #[must_use]
    pub const fn data(&self) -> &FormData {
        &self.data
    }

    /// Validation errors from the last submit.
    #[must_use]
    pub const fn errors(&self) -> &FormErrors {
        &self.errors
    }

    /// Validation message for `field`, if any.
    #[must_use]
    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors.get(field.name())
    }

    /// The task as loaded from the backend (update mode).
    #[must_use]
    pub const fn loaded_task(&self) -> Option<&Task> {
        self.loaded.as_ref()
    }

    /// Whether a request issued by this form is awaiting its result.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.state, FormState::Loading | FormState::Submitting)
    }

    /// Whether the reset action is offered.
    #[must_use]
    pub const fn can_reset(&self) -> bool {
        matches!(self.mode, Mode::Update(_))
    }

    /// Window title for this form.
    #[must_use]
    pub const fn window_title(&self) -> &'static str {
        match self.mode {
            Mode::Add => "Add task",
            Mode::Update(_) => "Update Task",
        }
    }

    /// Heading shown above the fields.
    #[must_use]
    pub const fn heading(&self) -> &'static str {
        match self.mode {
            Mode::Add => "Add New Task",
            Mode::Update(_) => "Edit Task",
        }
    }

    /// Label of the submit action.
    #[must_use]
    pub const fn submit_label(&self) -> &'static str {
        match self.mode {
            Mode::Add => "Add task",
            Mode::Update(_) => "Update Task",
        }
    }

    /// Starts the initial load in update mode.
    ///
    /// Returns the `GET /tasks/{id}` request with success toasts suppressed.
    /// Add-mode forms, and forms that already loaded or are loading, return
    /// `None`.
    pub fn initialize(&mut self) -> Option<Effect> {
        let id = self.mode.task_id()?;
        if self.state != FormState::Loading || self.pending.is_some() {
            return None;
        }

        let request = FetchRequest::get(format!("/tasks/{id}"))
            .with_authorization(self.session.authorization())
            .without_success_toast();
        tracing::debug!(task_id = %id, "loading task");
        Some(self.dispatch(PendingKind::Load, request))
    }

    /// Replaces the value of `field`. No validation happens here.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotEditable`] unless the form is ready.
    pub fn on_field_change(
        &mut self,
        field: FormField,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        if self.state != FormState::Ready {
            return Err(FormError::NotEditable(self.state));
        }
        self.data.set(field, value.into());
        Ok(())
    }

    /// Discards unsaved edits, restoring the loaded task's values.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ResetUnavailable`] in add mode or before the task
    /// has loaded, and [`FormError::NotEditable`] while submitting or done.
    pub fn on_reset(&mut self) -> Result<(), FormError> {
        let Some(task) = &self.loaded else {
            return Err(FormError::ResetUnavailable);
        };
        if self.state != FormState::Ready {
            return Err(FormError::NotEditable(self.state));
        }
        self.data = FormData::from_task(task);
        Ok(())
    }

    /// Validates the form and, if valid, emits the create or update request.
    ///
    /// Errors are cleared first and rebuilt from the validator output. An
    /// invalid form stays ready and contacts nobody. Submitting outside the
    /// ready state is ignored, so at most one submit is ever in flight.
    pub fn on_submit(&mut self) -> Option<Effect> {
        if self.state != FormState::Ready {
            tracing::debug!(state = %self.state, "submit ignored");
            return None;
        }

        self.errors.clear();
        let errors = validate_many_fields(EntityKind::Task, &self.data.to_field_map());
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "form has validation errors");
            self.errors = FormErrors::from_field_errors(errors);
            return None;
        }

        let body = json!({
            "title": self.data.title,
            "description": self.data.description,
            "status": self.data.status,
        });
        let request = match &self.mode {
            Mode::Add => FetchRequest::post("/tasks", body),
            Mode::Update(id) => FetchRequest::put(format!("/tasks/{id}"), body),
        }
        .with_authorization(self.session.authorization());

        self.state = FormState::Submitting;
        tracing::info!(mode = %self.mode, "submitting task");
        Some(self.dispatch(PendingKind::Submit, request))
    }

    /// Leaves the form for the task list, discarding edits.
    ///
    /// Works from any state; a pending request's result will be discarded.
    /// Returns `None` if the form has already navigated away.
    pub fn on_cancel(&mut self) -> Option<Effect> {
        if self.state == FormState::Done {
            return None;
        }
        self.state = FormState::Done;
        self.pending = None;
        Some(Effect::Navigate(Route::TaskList))
    }

    /// Applies the result of a request this form dispatched.
    ///
    /// Results for any id other than the pending one are stale and ignored.
    pub fn on_response(
        &mut self,
        id: RequestId,
        result: Result<Value, GatewayError>,
    ) -> Option<Effect> {
        let kind = match self.pending {
            Some((pending_id, kind)) if pending_id == id => kind,
            _ => {
                tracing::debug!(request_id = %id, "discarding stale response");
                return None;
            }
        };
        self.pending = None;

        match (kind, result) {
            (PendingKind::Load, Ok(body)) => match serde_json::from_value::<TaskEnvelope>(body) {
                Ok(envelope) => {
                    self.data = FormData::from_task(&envelope.task);
                    self.loaded = Some(envelope.task);
                    self.state = FormState::Ready;
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "task payload did not decode");
                    Some(Effect::Notify(Toast::error(format!("Invalid task data: {e}"))))
                }
            },
            (PendingKind::Load, Err(e)) => {
                // The gateway has already reported the failure.
                tracing::warn!(error = %e, "task load failed");
                None
            }
            (PendingKind::Submit, Ok(_)) => {
                self.state = FormState::Done;
                tracing::info!(mode = %self.mode, "task saved");
                Some(Effect::Navigate(Route::TaskList))
            }
            (PendingKind::Submit, Err(e)) => {
                tracing::warn!(error = %e, "task submit failed");
                self.state = FormState::Ready;
                None
            }
        }
    }

    fn dispatch(&mut self, kind: PendingKind, request: FetchRequest) -> Effect {
        let id = RequestId::next();
        self.pending = Some((id, kind));
        Effect::Fetch { id, request }
    }
}
