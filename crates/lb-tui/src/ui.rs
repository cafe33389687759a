use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs};
use ratatui::Frame;

use crate::app::{
    App, Modal, Screen, TAB_APPOINTMENTS, TAB_DASHBOARD, TAB_NAMES, TAB_PLANS, TAB_REPORTS,
    TAB_USERS, TAB_WHATSAPP,
};
use crate::tabs;
use crate::widgets::{alert, form, help_modal, status_bar};

/// Master render function: header tabs, content area, status bar, overlays.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // tab bar
            Constraint::Min(0),    // content
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

    match app.screen {
        Screen::Login => {
            let body = Rect::new(
                chunks[0].x,
                chunks[0].y,
                chunks[0].width,
                chunks[0].height + chunks[1].height,
            );
            tabs::login::render(frame, app, body);
        }
        Screen::Main => {
            render_tab_bar(frame, app, chunks[0]);
            render_content(frame, app, chunks[1]);
        }
    }
    status_bar::render(frame, app, chunks[2]);

    if let Some(modal) = &app.modal {
        render_modal(frame, modal);
    }
    if app.show_help {
        help_modal::render(frame);
    }
    if let Some(message) = &app.alert {
        alert::render(frame, message);
    }
    app.toasts.render(frame, frame.area());
}

fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TAB_NAMES
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Line::from(vec![
                Span::styled(
                    format!("{}", i + 1),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(":"),
                Span::raw(*t),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" leadboard ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .select(app.current_tab)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw(" | "));

    frame.render_widget(tabs, area);
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        TAB_DASHBOARD => tabs::dashboard::render(frame, app, area),
        TAB_APPOINTMENTS => tabs::appointments::render(frame, app, area),
        TAB_PLANS => tabs::plans::render(frame, app, area),
        TAB_REPORTS => tabs::reports::render(frame, app, area),
        TAB_USERS => tabs::users::render(frame, app, area),
        TAB_WHATSAPP => tabs::whatsapp::render(frame, app, area),
        _ => {}
    }
}

fn render_modal(frame: &mut Frame, modal: &Modal) {
    match modal {
        Modal::ConfirmDelete { username, .. } => {
            form::render_confirm(frame, &format!("Delete user '{username}'?"));
        }
        Modal::Appointment(appt) => {
            form::render(frame, &appt.form, slot_lines(&appt.slots, appt.slot_index));
        }
        other => {
            if let Some(f) = other.form() {
                form::render(frame, f, Vec::new());
            }
        }
    }
}

/// Slot picker shown under the appointment form.
fn slot_lines(slots: &[String], selected: usize) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    if slots.is_empty() {
        return vec![
            Line::from(""),
            Line::from(Span::styled("  Enter loads free slots for the date", dim)),
        ];
    }
    let mut spans = vec![Span::styled("  Slot (Left/Right): ", dim)];
    for (i, slot) in slots.iter().enumerate() {
        let label = slot_label(slot);
        if i == selected {
            spans.push(Span::styled(
                format!("[{label}]"),
                Style::default().fg(Color::Black).bg(Color::Yellow),
            ));
        } else {
            spans.push(Span::raw(format!(" {label} ")));
        }
    }
    vec![Line::from(""), Line::from(spans)]
}

/// `2024-05-02T09:00:00` -> `09:00`; bare times pass through.
fn slot_label(slot: &str) -> String {
    let time = slot.split_once('T').map(|(_, t)| t).unwrap_or(slot);
    time.chars().take(5).collect()
}
