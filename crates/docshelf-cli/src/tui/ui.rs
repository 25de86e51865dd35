//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use docshelf_core::{Mode, Notice, View};

use super::app::{ActivePane, App, FormState, SidebarItem};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    // Create vertical layout for status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(outer_chunks[0]);

    draw_sidebar(frame, app, pane_chunks[0]);
    draw_content_pane(frame, app, pane_chunks[1]);
    draw_status_bar(frame, app, outer_chunks[1]);

    if let Some(form) = &app.form {
        draw_form_overlay(frame, form);
    }

    // Draw help overlay if visible
    if app.show_help {
        draw_help_overlay(frame);
    }
}

fn pane_styles(is_active: bool) -> (Style, Style) {
    let border_style = if is_active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let highlight_style = if is_active {
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };
    (border_style, highlight_style)
}

/// Draw the section/label accordion (left)
fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let (border_style, highlight_style) = pane_styles(app.active_pane == ActivePane::Sidebar);
    let selected = app.selected_key();

    let items: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| match item {
            SidebarItem::Section(name) => {
                let marker = if app.expanded.contains(name) {
                    "▼"
                } else {
                    "▶"
                };
                ListItem::new(format!("{} {}", marker, name))
            }
            SidebarItem::Label { section, label } => {
                let is_selected = selected.is_some_and(|k| {
                    k.section() == section.as_str() && k.label() == label.as_str()
                });
                let style = if is_selected {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(format!("    {}", label), style)))
            }
        })
        .collect();

    let title = match app.store_error() {
        Some(_) => format!(" {} (offline) ", app.title),
        None => format!(" {} ", app.title),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if items.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No documents yet. Press u to upload.",
                Style::default().add_modifier(Modifier::DIM),
            )),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(highlight_style);

    let mut state = ListState::default();
    state.select(Some(app.sidebar_index));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the document view (right)
fn draw_content_pane(frame: &mut Frame, app: &App, area: Rect) {
    let (border_style, _) = pane_styles(app.active_pane == ActivePane::Content);

    let title = match app.selected_key() {
        Some(key) => format!(" {} ", key),
        None => " Document ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let dim = Style::default().add_modifier(Modifier::DIM);
    let content: Vec<Line> = match app.session.view() {
        View::Markup(markup) => {
            let mut lines = Vec::new();
            if let Some(summary) = app.selected_summary() {
                lines.push(Line::from(Span::styled(
                    summary,
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
            lines.push(Line::from(Span::styled("Press o to open in browser", dim)));
            lines.push(Line::from(""));
            lines.extend(markup.lines().map(|l| Line::from(l.to_string())));
            lines
        }
        View::Message(message) => vec![Line::from(""), Line::from(message.as_str())],
        View::Empty => vec![
            Line::from(""),
            Line::from(Span::styled("Select a document from the sidebar", dim)),
        ],
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.content_scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().add_modifier(Modifier::DIM);

    let line = if let Some(notice) = app.session.notice() {
        let style = match notice {
            Notice::Success(_) => Style::default().fg(Color::Green),
            Notice::Error(_) => Style::default().fg(Color::Red),
        };
        Line::from(Span::styled(notice.message(), style))
    } else if let Some(msg) = &app.status_message {
        Line::from(Span::styled(msg.as_str(), dim))
    } else {
        let hints = match app.session.mode() {
            Mode::Browsing { .. } => {
                "enter:open  u:upload  e:edit  d:delete  o:browser  r:refresh  ?:help  q:quit"
            }
            _ => "tab:next field  enter:submit  esc:cancel",
        };
        Line::from(Span::styled(hints, dim))
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Centered popup area of the given size
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Draw the upload/edit/delete form
fn draw_form_overlay(frame: &mut Frame, form: &FormState) {
    let fields = form.fields();
    let height = fields.len() as u16 * 2 + 4;
    let area = popup_area(frame.area(), 60, height);

    frame.render_widget(Clear, area);

    let label_width = 9;
    let mut lines = vec![Line::from("")];
    let mut cursor = None;

    for (row, field) in fields.iter().enumerate() {
        let is_focused = *field == form.focused();
        let name_style = if is_focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let value = form.value(*field);

        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", field.name(), width = label_width), name_style),
            Span::raw(value),
        ]));
        lines.push(Line::from(""));

        if is_focused {
            let x = area.x + 1 + label_width as u16 + value.chars().count() as u16;
            let y = area.y + 2 + row as u16 * 2;
            cursor = Some((x.min(area.right().saturating_sub(2)), y));
        }
    }

    let hint = if fields.len() == 2 {
        "enter:confirm delete  esc:cancel"
    } else {
        "tab:next  enter:submit  esc:cancel"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(form.kind.title())
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(lines).block(block), area);

    if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let popup_area = popup_area(frame.area(), 50, 22);

    // Clear the popup area
    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  h/l, Tab    Switch panes"),
        Line::from("  Enter/Space Expand section / open document"),
        Line::from(""),
        Line::from("Documents:"),
        Line::from("  u           Upload"),
        Line::from("  e           Replace selected"),
        Line::from("  d           Delete selected"),
        Line::from("  o           Open in browser"),
        Line::from("  r           Refresh"),
        Line::from(""),
        Line::from("Forms:"),
        Line::from("  Tab/S-Tab   Next/previous field"),
        Line::from("  Enter       Submit"),
        Line::from("  Esc         Cancel"),
        Line::from(""),
        Line::from("  q           Quit"),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(help_text).block(block);
    frame.render_widget(paragraph, popup_area);
}
