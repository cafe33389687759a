use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;

/// Tab 4: Excel report downloads.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  l  ", key),
            Span::raw("Download leads report (.xlsx)"),
        ]),
        Line::from(vec![
            Span::styled("  a  ", key),
            Span::raw("Download appointments report (.xlsx)"),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Saving to: ", dim),
            Span::raw(app.reports_dir.display().to_string()),
        ]),
    ];

    if let Some(path) = &app.last_report {
        lines.push(Line::from(vec![
            Span::styled("  Last saved: ", dim),
            Span::styled(path.display().to_string(), Style::default().fg(Color::Green)),
        ]));
    }

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Reports "));
    frame.render_widget(paragraph, area);
}
