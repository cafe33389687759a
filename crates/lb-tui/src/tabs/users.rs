use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use lb_api_types::UserRole;

use crate::app::App;

/// Tab 5: dashboard users.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " Users ({})  n new  e edit  D delete ",
        app.users.len()
    ));

    if app.users.is_empty() {
        frame.render_widget(Paragraph::new("No users loaded.").block(block), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Username"),
        Cell::from("Full name"),
        Cell::from("Email"),
        Cell::from("Role"),
        Cell::from("Active"),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .users
        .iter()
        .enumerate()
        .map(|(i, u)| {
            let role_color = match u.role {
                UserRole::Admin => Color::Magenta,
                _ => Color::White,
            };
            let row = Row::new(vec![
                Cell::from(u.username.as_str()),
                Cell::from(u.full_name.clone().unwrap_or_default()),
                Cell::from(u.email.clone().unwrap_or_default()),
                Cell::from(u.role.as_str()).style(Style::default().fg(role_color)),
                Cell::from(if u.active { "yes" } else { "no" }),
            ]);
            if i == app.user_cursor {
                row.style(Style::default().bg(Color::DarkGray))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Min(20),
        Constraint::Min(24),
        Constraint::Length(8),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
