//! Terminal UI rendering.
//!
//! Rendering is a pure function of [`App`]: nothing here mutates state.

pub mod status_bar;
pub mod task_form;
pub mod task_list;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::{App, Screen};

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    match &app.screen {
        Screen::List(list) => task_list::render(frame, chunks[0], list),
        Screen::Form(form) => task_form::render(frame, chunks[0], form, app.focus),
    }

    status_bar::render(frame, chunks[1], app);
}
