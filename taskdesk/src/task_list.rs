//! Task list screen, the form's navigation target.

use serde_json::Value;
use taskdesk_proto::task::{Task, TaskListEnvelope};

use crate::api::RequestId;
use crate::form::Effect;
use crate::gateway::{FetchRequest, GatewayError, Toast};
use crate::route::Route;
use crate::session::Session;

/// Controller for the list of tasks.
#[derive(Debug)]
pub struct TaskList {
    session: Session,
    tasks: Vec<Task>,
    selected: usize,
    pending: Option<RequestId>,
}

impl TaskList {
    /// Creates an empty, not yet loaded list.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            tasks: Vec::new(),
            selected: 0,
            pending: None,
        }
    }

    /// Loaded tasks.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Index of the highlighted task.
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// The highlighted task, if any.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    /// Whether a refresh is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Requests `GET /tasks`. A refresh already in flight is superseded.
    pub fn refresh(&mut self) -> Effect {
        let id = RequestId::next();
        self.pending = Some(id);
        let request = FetchRequest::get("/tasks")
            .with_authorization(self.session.authorization())
            .without_success_toast();
        Effect::Fetch { id, request }
    }

    /// Applies a list response. Stale ids are ignored.
    pub fn on_response(
        &mut self,
        id: RequestId,
        result: Result<Value, GatewayError>,
    ) -> Option<Effect> {
        if self.pending != Some(id) {
            return None;
        }
        self.pending = None;

        let body = result.ok()?;
        match serde_json::from_value::<TaskListEnvelope>(body) {
            Ok(envelope) => {
                tracing::debug!(count = envelope.tasks.len(), "task list loaded");
                self.tasks = envelope.tasks;
                self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
                None
            }
            Err(e) => Some(Effect::Notify(Toast::error(format!("Invalid task list: {e}")))),
        }
    }

    /// Highlight the previous task.
    pub const fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Highlight the next task.
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.len() {
            self.selected += 1;
        }
    }

    /// Route that edits the highlighted task.
    #[must_use]
    pub fn edit_selected(&self) -> Option<Route> {
        self.selected_task()
            .map(|task| Route::EditTask(task.id.clone()))
    }
}
