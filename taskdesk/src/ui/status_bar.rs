//! Status bar rendering.

use std::fmt::Write;

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, Screen};
use crate::gateway::ToastKind;

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    frame.render_widget(
        Paragraph::new(status_line(app)).style(theme::status_bar_bg()),
        area,
    );
}

/// Version, latest toast, and key help on one line.
#[must_use]
pub fn status_line(app: &App) -> Line<'_> {
    let help_text = match &app.screen {
        Screen::List(_) => "↑↓/jk: navigate | Enter: edit | n: new | r: refresh | q: quit",
        Screen::Form(form) if form.can_reset() => {
            "Tab: next field | ←→: status | Ctrl-S: save | Ctrl-R: reset | Esc: cancel"
        }
        Screen::Form(_) => "Tab: next field | ←→: status | Ctrl-S: save | Esc: cancel",
    };

    let mut spans = vec![
        Span::styled(
            concat!("TaskDesk v", env!("CARGO_PKG_VERSION")),
            theme::bold(),
        ),
        Span::raw(" | "),
    ];
    if let Some(toast) = &app.toast {
        let color = match toast.kind {
            ToastKind::Success => theme::SUCCESS,
            ToastKind::Error => theme::ERROR,
        };
        // A bad format string is an fmt::Error here, not a panic.
        let mut at = String::new();
        if write!(at, "{}", toast.at.format(&app.timestamp_format)).is_ok() {
            spans.push(Span::styled(at, theme::timestamp()));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled("●", theme::normal().fg(color)));
        spans.push(Span::raw(format!(" {}", toast.message)));
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(help_text, theme::dimmed()));
    Line::from(spans)
}
