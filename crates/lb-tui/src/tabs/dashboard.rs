use chrono::FixedOffset;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use lb_api_types::{Lead, Sender};
use lb_core::dashboard::ConversationView;
use lb_core::timefmt;

use super::{flag, format_brl, interest_color, truncate};
use crate::app::App;

/// Tab 1: stat cards, filter bar, lead table, conversation panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // stat cards, two rows
            Constraint::Length(1), // filter bar
            Constraint::Min(0),    // leads + conversation
        ])
        .split(area);

    render_stat_cards(frame, app, chunks[0]);
    render_filter_bar(frame, app, chunks[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(chunks[2]);

    render_leads(frame, app, bottom[0]);
    render_conversation(frame, app, bottom[1]);
}

fn render_stat_cards(frame: &mut Frame, app: &App, area: Rect) {
    let s = &app.dashboard.stats;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3)])
        .split(area);

    let top: [(&str, u64, Color); 5] = [
        ("Total", s.total_leads, Color::White),
        ("Hot", s.hot_leads, Color::Red),
        ("Warm", s.warm_leads, Color::Yellow),
        ("Cold", s.cold_leads, Color::Blue),
        ("Today", s.today_leads, Color::Cyan),
    ];
    let bottom: [(&str, u64, Color); 4] = [
        ("Contacted", s.human_contacted, Color::Green),
        ("Not contacted", s.not_contacted, Color::Magenta),
        ("Sales closed", s.sales_closed, Color::Green),
        ("No sale", s.no_sale, Color::DarkGray),
    ];

    render_card_row(frame, &top, rows[0]);
    render_card_row(frame, &bottom, rows[1]);
}

fn render_card_row(frame: &mut Frame, cards: &[(&str, u64, Color)], area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(area);

    for (i, (title, value, color)) in cards.iter().enumerate() {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {title} "))
            .border_style(Style::default().fg(*color));
        let text = Paragraph::new(Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(*color).add_modifier(Modifier::BOLD),
        )))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(text, cols[i]);
    }
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let active = app.dashboard.filter();
    let mut spans = Vec::new();
    for (filter, count) in app.dashboard.filter_counts() {
        let style = if filter == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ({count}) ", filter.label()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn sale_cell(lead: &Lead) -> String {
    match (lead.sale_closed, lead.sale_amount) {
        (Some(true), Some(amount)) => format_brl(amount),
        (other, _) => flag(other).to_string(),
    }
}

/// `dd/mm hh:mm`, or the raw value when it does not parse.
fn short_stamp(raw: &str, offset: FixedOffset) -> String {
    match timefmt::parse_timestamp(raw) {
        Some(dt) => dt.with_timezone(&offset).format("%d/%m %H:%M").to_string(),
        None => raw.to_string(),
    }
}

fn render_leads(frame: &mut Frame, app: &App, area: Rect) {
    let visible = app.dashboard.visible();
    let title = format!(
        " Leads: {} ({} of {}) ",
        app.dashboard.filter().label(),
        visible.len(),
        app.dashboard.leads.len()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    if visible.is_empty() {
        let message = empty_message(app);
        let paragraph = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Phone"),
        Cell::from("Interest"),
        Cell::from("Created"),
        Cell::from("Contact"),
        Cell::from("Sale"),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let offset = app.dashboard.clock().offset;
    let selected_id = app.dashboard.selected_id();
    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(i, lead)| {
            let marker = if Some(lead.id.as_str()) == selected_id { "> " } else { "  " };
            let row = Row::new(vec![
                Cell::from(format!("{marker}{}", truncate(&lead.display_name(), 16))),
                Cell::from(lead.phone_number.as_str()),
                Cell::from(lead.interest_level.as_str().to_string())
                    .style(Style::default().fg(interest_color(&lead.interest_level))),
                Cell::from(short_stamp(&lead.created_at, offset)),
                Cell::from(flag(lead.human_contacted)),
                Cell::from(sale_cell(lead)),
            ]);
            if i == app.dashboard.cursor() {
                row.style(Style::default().bg(Color::DarkGray))
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Min(18),
        Constraint::Length(13),
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(7),
        Constraint::Length(11),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn empty_message(app: &App) -> Vec<Line<'static>> {
    let dash = &app.dashboard;
    if dash.is_loading() && dash.leads.is_empty() {
        return vec![Line::from("Loading leads...")];
    }
    if dash.leads.is_empty() {
        let mut lines = vec![Line::from("No leads yet.")];
        if let Some(diag) = &dash.leads.diagnostic {
            lines.push(Line::from(Span::styled(
                diag.clone(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        if let Some(err) = &dash.last_error {
            lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
        }
        return lines;
    }
    vec![Line::from(format!(
        "No leads match the '{}' filter.",
        dash.filter().label()
    ))]
}

fn render_conversation(frame: &mut Frame, app: &App, area: Rect) {
    let lead = app.dashboard.selected();
    let title = match lead {
        Some(lead) => format!(" Conversation: {} ", lead.display_name()),
        None => " Conversation ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));

    let offset = app.dashboard.clock().offset;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(lead) = lead {
        lines.push(Line::from(vec![
            Span::styled("Phone: ", Style::default().fg(Color::DarkGray)),
            Span::raw(lead.phone_number.clone()),
            Span::styled("  Plan: ", Style::default().fg(Color::DarkGray)),
            Span::raw(lead.plan_interest.clone().unwrap_or_else(|| "-".into())),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Contact: ", Style::default().fg(Color::DarkGray)),
            Span::raw(flag(lead.human_contacted)),
            Span::styled("  Sale: ", Style::default().fg(Color::DarkGray)),
            Span::raw(sale_cell(lead)),
        ]));
        for notes in [&lead.human_contact_notes, &lead.sale_notes].into_iter().flatten() {
            lines.push(Line::from(Span::styled(
                format!("Note: {notes}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(""));
    }

    match &app.dashboard.conversation {
        ConversationView::Empty => {
            lines.push(Line::from(Span::styled(
                "Select a lead with Enter to view the conversation.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        ConversationView::Loading => lines.push(Line::from("Loading conversation...")),
        ConversationView::Failed(message) => lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))),
        ConversationView::Loaded(conv) if conv.messages.is_empty() => {
            lines.push(Line::from("No messages."));
        }
        ConversationView::Loaded(conv) => {
            for msg in &conv.messages {
                let (who, color) = match msg.sender {
                    Sender::User => ("Customer", Color::White),
                    Sender::Agent => ("Agent", Color::Green),
                    Sender::Other => ("System", Color::DarkGray),
                };
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("[{}] ", timefmt::format_time(&msg.timestamp, offset)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{who}: "),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(msg.content.clone()),
                ]));
            }
        }
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
