use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;

/// Render a centered help modal overlay.
pub fn render(frame: &mut Frame) {
    let area = centered_rect(70, 85, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        section("Global"),
        help_line("1-6 / Tab", "Switch tab"),
        help_line("j k / Up Down", "Move in list"),
        help_line("r", "Reload current tab"),
        help_line("?", "Toggle this help"),
        help_line("q / Ctrl-c", "Quit"),
        Line::from(""),
        section("Dashboard"),
        help_line("f / F", "Next / previous filter"),
        help_line("a h w c t", "All, hot, warm, cold, today"),
        help_line("o n s x", "Contacted, not contacted, sale, no sale"),
        help_line("Enter / Esc", "Open / close conversation"),
        help_line("C", "Toggle human contact"),
        help_line("S", "Toggle sale (asks for amount)"),
        Line::from(""),
        section("Appointments / Plans / Users"),
        help_line("n", "New appointment / user"),
        help_line("c x d", "Confirm, cancel, complete appointment"),
        help_line("e", "Edit plan / user"),
        help_line("D", "Delete user"),
        help_line("l / a", "Download leads / appointments report"),
        Line::from(""),
        section("Forms"),
        help_line("Tab / Shift-Tab", "Next / previous field"),
        help_line("Left / Right", "Pick slot"),
        help_line("Enter / Esc", "Submit / cancel"),
        Line::from(""),
        Line::from(Span::styled(
            "  Press ? or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(paragraph, area);
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{key:<18}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(desc.to_string()),
    ])
}
