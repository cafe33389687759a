use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use lb_core::calendar;
use lb_core::timefmt;

use super::{status_color, truncate};
use crate::app::App;

/// Tab 2: this week's calendar strip over the full appointment list.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    render_week(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
}

fn render_week(frame: &mut Frame, app: &App, area: Rect) {
    let clock = app.dashboard.clock();
    let cal = calendar::group_by_day(&app.appointments, clock.offset);
    let week = cal.week_of(clock.today);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, 7); 7])
        .split(area);

    for (i, (day, appts)) in week.iter().enumerate() {
        let is_today = *day == clock.today;
        let border = if is_today { Color::Yellow } else { Color::DarkGray };
        let title = format!(" {} ", day.format("%a %d/%m"));

        let inner_rows = area.height.saturating_sub(2) as usize;
        let mut lines: Vec<Line> = appts
            .iter()
            .take(inner_rows)
            .map(|a| {
                Line::from(vec![
                    Span::styled(
                        format!("{} ", a.status.glyph()),
                        Style::default().fg(status_color(&a.status)),
                    ),
                    Span::raw(timefmt::format_time(&a.scheduled_at, clock.offset)),
                ])
            })
            .collect();
        if appts.len() > inner_rows && inner_rows > 0 {
            lines.pop();
            lines.push(Line::from(Span::styled(
                format!("+{} more", appts.len() - inner_rows + 1),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border));
        frame.render_widget(Paragraph::new(lines).block(block), cols[i]);
    }
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let offset = app.dashboard.clock().offset;
    let rows_data = app.appointment_rows();
    let title = format!(
        " Appointments ({})  n new  c confirm  x cancel  d done ",
        rows_data.len()
    );

    if rows_data.is_empty() {
        let empty = Paragraph::new("No appointments.")
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("St"),
        Cell::from("When"),
        Cell::from("Customer"),
        Cell::from("Phone"),
        Cell::from("Status"),
        Cell::from("Notes"),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = rows_data
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let color = status_color(&a.status);
            let row = Row::new(vec![
                Cell::from(a.status.glyph())
                    .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Cell::from(timefmt::format_short(&a.scheduled_at, offset)),
                Cell::from(truncate(&a.display_name(), 24)),
                Cell::from(a.phone_number.clone().unwrap_or_default()),
                Cell::from(a.status.as_str()).style(Style::default().fg(color)),
                Cell::from(truncate(a.notes.as_deref().unwrap_or(""), 40)),
            ]);
            if i == app.appointment_cursor {
                row.style(Style::default().bg(Color::DarkGray))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(16),
        Constraint::Min(16),
        Constraint::Length(15),
        Constraint::Length(10),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}
