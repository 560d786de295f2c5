//! Navigation targets.

use std::fmt;

use taskdesk_proto::task::TaskId;

/// A screen the application can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The list of all tasks.
    TaskList,
    /// The form in add mode.
    NewTask,
    /// The form in update mode for an existing task.
    EditTask(TaskId),
}

impl Route {
    /// The route that opens the form for `task_id`, or the add form when absent.
    #[must_use]
    pub fn form(task_id: Option<TaskId>) -> Self {
        task_id.map_or(Self::NewTask, Self::EditTask)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskList => write!(f, "/"),
            Self::NewTask => write!(f, "/tasks/add"),
            Self::EditTask(id) => write!(f, "/tasks/{id}"),
        }
    }
}
