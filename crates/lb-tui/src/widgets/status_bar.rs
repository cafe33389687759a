use chrono::Local;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;

/// Render the bottom status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let now = Local::now().format("%d/%m/%Y %H:%M");

    let user = app.username.as_deref().unwrap_or("anonymous");
    let mut left = vec![
        Span::styled("[?]", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("[r]", Style::default().fg(Color::Yellow)),
        Span::raw(" Reload  "),
        Span::styled("[q]", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit  "),
        Span::raw(format!("{user}@{}", app.backend_url)),
    ];
    if app.pending > 0 {
        left.push(Span::styled(
            format!("  loading ({})", app.pending),
            Style::default().fg(Color::Cyan),
        ));
    }

    // Left hints, right-aligned clock, padded in between.
    let left_len: usize = left.iter().map(|s| s.width()).sum();
    let right_text = now.to_string();
    let total_width = area.width as usize;
    let padding = total_width
        .checked_sub(left_len + right_text.len())
        .filter(|p| *p > 0)
        .unwrap_or(1);

    let mut spans = left;
    spans.push(Span::raw(" ".repeat(padding)));
    spans.push(Span::styled(right_text, Style::default().fg(Color::Gray)));

    let bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(bar, area);
}
