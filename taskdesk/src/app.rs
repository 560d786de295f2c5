//! Application state and event handling.
//!
//! [`App`] owns the active screen and routes key presses and request results
//! to its controller. Whatever a controller asks for comes back as an
//! [`Effect`]; [`App`] performs navigation and notifications itself and hands
//! fetches to the caller as [`ApiCommand`]s.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use taskdesk_proto::form::FormField;
use taskdesk_proto::task::{TaskId, TaskStatus};

use crate::api::{ApiCommand, ApiEvent};
use crate::form::{Effect, TaskForm};
use crate::gateway::Toast;
use crate::route::Route;
use crate::session::Session;
use crate::task_list::TaskList;

/// The screen currently shown.
#[derive(Debug)]
pub enum Screen {
    /// All tasks.
    List(TaskList),
    /// The add/update form.
    Form(TaskForm),
}

/// Main application state.
pub struct App {
    /// Session handed to every screen.
    session: Session,
    /// Active screen.
    pub screen: Screen,
    /// Focused form field.
    pub focus: FormField,
    /// Most recent notification.
    pub toast: Option<Toast>,
    /// Format used for toast timestamps (chrono).
    pub timestamp_format: String,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Create an application showing an unloaded task list.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::List(TaskList::new(session.clone())),
            session,
            focus: FormField::Title,
            toast: None,
            timestamp_format: "%H:%M".to_string(),
            should_quit: false,
        }
    }

    /// Set the toast timestamp format.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Title for the terminal window.
    #[must_use]
    pub const fn window_title(&self) -> &'static str {
        match &self.screen {
            Screen::List(_) => "Tasks",
            Screen::Form(form) => form.window_title(),
        }
    }

    /// Switch to `route`, returning the request its screen needs first.
    pub fn navigate(&mut self, route: Route) -> Option<ApiCommand> {
        tracing::info!(%route, "navigate");
        let effect = match route {
            Route::TaskList => {
                let mut list = TaskList::new(self.session.clone());
                let effect = list.refresh();
                self.screen = Screen::List(list);
                Some(effect)
            }
            Route::NewTask => self.open_form(None),
            Route::EditTask(id) => self.open_form(Some(id)),
        };
        self.run_effect(effect)
    }

    fn open_form(&mut self, task_id: Option<TaskId>) -> Option<Effect> {
        let mut form = TaskForm::new(task_id, self.session.clone());
        let effect = form.initialize();
        self.focus = FormField::Title;
        self.screen = Screen::Form(form);
        effect
    }

    /// Perform an effect; fetches are returned for dispatch.
    fn run_effect(&mut self, effect: Option<Effect>) -> Option<ApiCommand> {
        match effect? {
            Effect::Fetch { id, request } => Some(ApiCommand::Fetch { id, request }),
            Effect::Navigate(route) => self.navigate(route),
            Effect::Notify(toast) => {
                self.toast = Some(toast);
                None
            }
        }
    }

    /// Apply an event from the request worker.
    pub fn handle_api_event(&mut self, event: ApiEvent) -> Option<ApiCommand> {
        match event {
            ApiEvent::Toast(toast) => {
                self.toast = Some(toast);
                None
            }
            ApiEvent::Completed { id, result } => {
                let effect = match &mut self.screen {
                    Screen::List(list) => list.on_response(id, result),
                    Screen::Form(form) => form.on_response(id, result),
                };
                self.run_effect(effect)
            }
        }
    }

    /// Handle a key event.
    ///
    /// Returns `Some(ApiCommand)` when the action needs a backend request.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.should_quit = true;
            return None;
        }

        match self.screen {
            Screen::List(_) => self.handle_list_key(key),
            Screen::Form(_) => self.handle_form_key(key),
        }
    }

    /// Handle key event on the task list.
    fn handle_list_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        let Screen::List(list) = &mut self.screen else {
            return None;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                list.select_prev();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                list.select_next();
                None
            }
            KeyCode::Char('r') => {
                let effect = list.refresh();
                self.run_effect(Some(effect))
            }
            KeyCode::Char('n') => self.navigate(Route::NewTask),
            KeyCode::Enter => {
                let route = list.edit_selected()?;
                self.navigate(route)
            }
            _ => None,
        }
    }

    /// Handle key event on the form.
    fn handle_form_key(&mut self, key: KeyEvent) -> Option<ApiCommand> {
        let Screen::Form(form) = &mut self.screen else {
            return None;
        };
        let effect = match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => form.on_cancel(),
            (KeyCode::Enter, _) if self.focus != FormField::Description => form.on_submit(),
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => form.on_submit(),
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                if let Err(e) = form.on_reset() {
                    tracing::debug!(error = %e, "reset rejected");
                }
                None
            }
            (KeyCode::Tab, _) => {
                self.focus = next_field(self.focus);
                None
            }
            (KeyCode::BackTab, _) => {
                self.focus = prev_field(self.focus);
                None
            }
            _ => {
                if let Some(value) = edited_value(self.focus, form.data().get(self.focus), key)
                    && let Err(e) = form.on_field_change(self.focus, value)
                {
                    tracing::debug!(error = %e, "edit rejected");
                }
                None
            }
        };
        self.run_effect(effect)
    }
}

/// Field after `field` in tab order.
const fn next_field(field: FormField) -> FormField {
    match field {
        FormField::Title => FormField::Status,
        FormField::Status => FormField::Description,
        FormField::Description => FormField::Title,
    }
}

/// Field before `field` in tab order.
const fn prev_field(field: FormField) -> FormField {
    match field {
        FormField::Title => FormField::Description,
        FormField::Status => FormField::Title,
        FormField::Description => FormField::Status,
    }
}

/// New value for `field` after `key`, or `None` if the key doesn't edit it.
///
/// Text fields append and delete at the end; Enter starts a new line in the
/// description. The status field behaves like a select box: left/right (or
/// space) cycle through the statuses.
fn edited_value(field: FormField, current: &str, key: KeyEvent) -> Option<String> {
    match field {
        FormField::Title | FormField::Description => match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut value = current.to_string();
                value.push(c);
                Some(value)
            }
            KeyCode::Enter if field == FormField::Description => {
                let mut value = current.to_string();
                value.push('\n');
                Some(value)
            }
            KeyCode::Backspace => {
                let mut value = current.to_string();
                value.pop()?;
                Some(value)
            }
            _ => None,
        },
        FormField::Status => {
            let step: isize = match key.code {
                KeyCode::Right | KeyCode::Char(' ') => 1,
                KeyCode::Left => -1,
                _ => return None,
            };
            let all = TaskStatus::ALL;
            let Some(index) = current
                .parse::<TaskStatus>()
                .ok()
                .and_then(|s| all.iter().position(|x| *x == s))
            else {
                return Some(all[0].to_string());
            };
            let next = (index.cast_signed() + step).rem_euclid(all.len().cast_signed());
            Some(all[next.cast_unsigned()].to_string())
        }
    }
}
