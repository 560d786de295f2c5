//! Task list rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::theme;
use crate::task_list::TaskList;

/// Render all tasks, one per line, with the selection highlighted.
pub fn render(frame: &mut Frame, area: Rect, list: &TaskList) {
    let title = if list.is_loading() {
        "Tasks (loading...)"
    } else {
        "Tasks"
    };
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::LIST_TITLE)))
        .borders(Borders::ALL)
        .border_style(theme::normal());

    if list.tasks().is_empty() {
        let hint = if list.is_loading() {
            ""
        } else {
            "No tasks yet. Press n to add one."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, theme::dimmed())).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = list
        .tasks()
        .iter()
        .map(|task| {
            let status = format!("[{:<11}]", task.status.label());
            ListItem::new(Line::from(vec![
                Span::styled(status, theme::normal().fg(theme::status_color(task.status))),
                Span::raw(" "),
                Span::styled(task.title.as_str(), theme::bold()),
                Span::raw("  "),
                Span::styled(task.description.as_str(), theme::dimmed()),
            ]))
        })
        .collect();

    let widget = List::new(items)
        .block(block)
        .highlight_style(theme::selected());
    let mut state = ListState::default().with_selected(Some(list.selected()));
    frame.render_stateful_widget(widget, area, &mut state);
}
