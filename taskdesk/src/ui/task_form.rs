//! Add/update form rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use taskdesk_proto::form::FormField;
use taskdesk_proto::task::TaskStatus;

use super::theme;
use crate::form::{FormState, TaskForm};

/// Marker placed before a field's validation message.
pub const ERROR_MARKER: &str = "✗";

/// Render the form inside a bordered panel.
pub fn render(frame: &mut Frame, area: Rect, form: &TaskForm, focus: FormField) {
    let mut title = vec![Span::styled(
        form.heading(),
        theme::panel_title(theme::FORM_TITLE),
    )];
    if form.state() == FormState::Submitting {
        title.push(Span::styled(" (saving...)", theme::normal().fg(theme::WARNING)));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    let paragraph = Paragraph::new(form_lines(form, focus))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Lines making up the form body.
#[must_use]
pub fn form_lines(form: &TaskForm, focus: FormField) -> Vec<Line<'_>> {
    if form.state() == FormState::Loading {
        return vec![Line::from(Span::styled("Loading task...", theme::dimmed()))];
    }

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = field == focus && form.state() == FormState::Ready;
        let (marker, label_style) = if focused {
            ("> ", theme::highlighted())
        } else {
            ("  ", theme::bold())
        };
        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(field.label(), label_style),
        ]));
        lines.extend(value_lines(field, form.data().get(field), focused));
        if let Some(message) = form.error_for(field) {
            lines.push(Line::from(Span::styled(
                format!("    {ERROR_MARKER} {message}"),
                theme::field_error(),
            )));
        }
        lines.push(Line::default());
    }

    let mut buttons = vec![Span::styled(format!(" {} ", form.submit_label()), theme::button())];
    if form.can_reset() {
        buttons.push(Span::raw("  "));
        buttons.push(Span::styled(" Reset ", theme::button()));
    }
    buttons.push(Span::raw("  "));
    buttons.push(Span::styled(" Cancel ", theme::button()));
    lines.push(Line::from(buttons));
    lines
}

/// Value rows for `field`. Every row carries visible text, so wrapping never
/// stretches a row and the error line stays directly below the value.
fn value_lines(field: FormField, value: &str, focused: bool) -> Vec<Line<'_>> {
    let cursor = if focused { "_" } else { "" };
    match field {
        FormField::Status => {
            let shown = value
                .parse::<TaskStatus>()
                .map_or("Select a status", |status| status.label());
            let style = if value.is_empty() {
                theme::dimmed()
            } else {
                theme::normal()
            };
            vec![Line::from(vec![
                Span::raw("    "),
                Span::styled(format!("< {shown} >"), style),
            ])]
        }
        FormField::Title | FormField::Description if value.is_empty() => {
            vec![Line::from(vec![
                Span::raw("    "),
                Span::styled(cursor, theme::highlighted()),
                Span::styled(placeholder(field), theme::dimmed()),
            ])]
        }
        FormField::Title | FormField::Description => {
            let rows: Vec<&str> = value.split('\n').collect();
            let last = rows.len() - 1;
            rows.into_iter()
                .enumerate()
                .map(|(i, row)| {
                    let mut spans = vec![Span::raw("    "), Span::styled(row, theme::normal())];
                    if i == last {
                        spans.push(Span::styled(cursor, theme::highlighted()));
                    }
                    if row.is_empty() && (i != last || !focused) {
                        spans.push(Span::styled("¶", theme::dimmed()));
                    }
                    Line::from(spans)
                })
                .collect()
        }
    }
}

const fn placeholder(field: FormField) -> &'static str {
    match field {
        FormField::Title => "Title",
        FormField::Description => "Write here..",
        FormField::Status => "Select a status",
    }
}
