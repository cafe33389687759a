use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::widgets::{centered_fixed, form};

/// Full-screen sign-in form shown before the tabs.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            "leadboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("WhatsApp sales leads at {}", app.backend_url),
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(banner, chunks[0]);

    let mut extra = Vec::new();
    extra.push(Line::from(""));
    if app.login_pending {
        extra.push(Line::from(Span::styled(
            "  Signing in...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(err) = &app.login_error {
        extra.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    } else {
        extra.push(Line::from(Span::styled(
            "  Esc continues without signing in",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let height = app.login.form.fields.len() as u16 + extra.len() as u16 + 4;
    let box_area = centered_fixed(50, height, chunks[1]);
    form::render_in(frame, &app.login.form, extra, box_area);
}
