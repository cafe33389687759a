use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use lb_core::forms::Form;

use super::centered_fixed;

/// Draw a field-cursor form inside `area`. Extra lines go below the fields.
pub fn render_in(frame: &mut Frame, form: &Form, extra: Vec<Line<'static>>, area: Rect) {
    frame.render_widget(Clear, area);

    let mut lines = Vec::with_capacity(form.fields.len() + extra.len() + 2);
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(if focused { "> " } else { "  " }, label_style),
            Span::styled(format!("{:<28}", field.label), label_style),
            Span::raw(format!("{}{cursor}", field.display())),
        ]));
    }
    lines.extend(extra);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab next field  Enter submit  Esc cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", form.title))
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(paragraph, area);
}

/// Centered modal sized to the form.
pub fn render(frame: &mut Frame, form: &Form, extra: Vec<Line<'static>>) {
    let height = form.fields.len() as u16 + extra.len() as u16 + 4;
    let area = centered_fixed(70, height, frame.area());
    render_in(frame, form, extra, area);
}

/// Yes/no confirmation dialog.
pub fn render_confirm(frame: &mut Frame, question: &str) {
    let area = centered_fixed(50, 5, frame.area());
    frame.render_widget(Clear, area);
    let lines = vec![
        Line::from(question.to_string()),
        Line::from(Span::styled(
            "y / Enter to confirm, n / Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Confirm ")
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(paragraph, area);
}
