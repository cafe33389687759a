use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;

/// Tab 6: how to point a WhatsApp Business account at the backend.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let url = lb_client::webhook_url(&app.backend_url);
    let head = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let code = Style::default().fg(Color::Green);

    let lines = vec![
        Line::from(Span::styled("Webhook URL", head)),
        Line::from(Span::styled(format!("  {url}"), code)),
        Line::from(""),
        Line::from(Span::styled("Meta Business setup", head)),
        Line::from("  1. Open the app in Meta for Developers and go to WhatsApp > Configuration."),
        Line::from("  2. Under Webhook, click Edit and paste the URL above as the callback URL."),
        Line::from(vec![
            Span::raw("  3. Subscribe to the "),
            Span::styled("messages", code),
            Span::raw(" and "),
            Span::styled("message_status", code),
            Span::raw(" events."),
        ]),
        Line::from("  4. Optional: set a verification token and configure the same value on the backend."),
        Line::from(""),
        Line::from(Span::styled("Test", head)),
        Line::from("  Send a WhatsApp message to the business number. A new lead should"),
        Line::from("  appear on the Dashboard tab after a reload (r)."),
        Line::from(""),
        Line::from(Span::styled(
            "The webhook must be reachable over public HTTPS; use a tunnel when the backend runs locally.",
            dim,
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" WhatsApp "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
