use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use super::{format_brl, truncate};
use crate::app::App;

/// Tab 3: plan catalogue. `e` edits the highlighted plan.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Plans ({})  e edit  r reload ", app.plans.len()));

    if app.plans.is_empty() {
        frame.render_widget(Paragraph::new("No plans loaded.").block(block), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Price"),
        Cell::from("Active"),
        Cell::from("Coverage"),
        Cell::from("Description"),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .plans
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let active = if p.active {
                Cell::from("yes").style(Style::default().fg(Color::Green))
            } else {
                Cell::from("no").style(Style::default().fg(Color::DarkGray))
            };
            let row = Row::new(vec![
                Cell::from(p.name.as_str()),
                Cell::from(format_brl(p.price)),
                active,
                Cell::from(truncate(&p.coverage.join(", "), 40)),
                Cell::from(truncate(p.description.as_deref().unwrap_or(""), 40)),
            ]);
            if i == app.plan_cursor {
                row.style(Style::default().bg(Color::DarkGray))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Min(18),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Min(24),
        Constraint::Min(24),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
