use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    fn label(self) -> &'static str {
        match self {
            ToastLevel::Info => "info",
            ToastLevel::Success => "ok",
            ToastLevel::Warning => "warn",
            ToastLevel::Error => "error",
        }
    }

    fn color(self) -> Color {
        match self {
            ToastLevel::Info => Color::Cyan,
            ToastLevel::Success => Color::Green,
            ToastLevel::Warning => Color::Yellow,
            ToastLevel::Error => Color::Red,
        }
    }

    /// Problems stay up longer than confirmations.
    fn ttl(self) -> Duration {
        match self {
            ToastLevel::Warning | ToastLevel::Error => Duration::from_secs(6),
            ToastLevel::Info | ToastLevel::Success => Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    /// How many times the same message arrived back to back.
    pub repeats: u32,
    shown_at: Instant,
    ttl: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        Self {
            message: message.into(),
            level,
            repeats: 1,
            shown_at: Instant::now(),
            ttl: level.ttl(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.ttl
    }

    fn text(&self) -> String {
        if self.repeats > 1 {
            format!("{} (x{})", self.message, self.repeats)
        } else {
            self.message.clone()
        }
    }
}

const CAPACITY: usize = 4;
const WIDTH: u16 = 52;
const HEIGHT: u16 = 3;

/// Transient notifications, oldest first. Rendered bottom-right, newest
/// closest to the status bar.
#[derive(Debug, Default)]
pub struct ToastStack {
    items: VecDeque<Toast>,
}

impl ToastStack {
    /// A toast identical to the newest one refreshes it instead of stacking.
    pub fn push(&mut self, toast: Toast) {
        if let Some(last) = self.items.back_mut() {
            if last.level == toast.level && last.message == toast.message {
                last.repeats += 1;
                last.shown_at = toast.shown_at;
                last.ttl = toast.ttl;
                return;
            }
        }
        self.items.push_back(toast);
        while self.items.len() > CAPACITY {
            self.items.pop_front();
        }
    }

    pub fn tick(&mut self) {
        self.expire(Instant::now());
    }

    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|t| !t.expired_at(now));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    /// Draw above the last row of `area`, which belongs to the status bar.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = WIDTH.min(area.width);
        let bottom = area.y + area.height.saturating_sub(1);
        let x = area.x + area.width.saturating_sub(width);

        for (i, toast) in self.items.iter().rev().enumerate() {
            let lift = (i as u16 + 1) * HEIGHT;
            if lift > bottom.saturating_sub(area.y) {
                break;
            }
            let rect = Rect::new(x, bottom - lift, width, HEIGHT);
            let color = toast.level.color();
            let line = Line::from(vec![
                Span::styled(
                    format!("{:>5} ", toast.level.label()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw(toast.text()),
            ]);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(Color::Black));
            frame.render_widget(Clear, rect);
            frame.render_widget(Paragraph::new(line).block(block), rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_outlive_confirmations() {
        let now = Instant::now();
        let mut stack = ToastStack::default();
        stack.push(Toast::new("Saved", ToastLevel::Success));
        stack.push(Toast::new("Request failed", ToastLevel::Error));
        stack.expire(now + Duration::from_secs(4));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.latest().unwrap().message, "Request failed");
        stack.expire(now + Duration::from_secs(7));
        assert!(stack.is_empty());
    }

    #[test]
    fn repeated_message_is_counted_not_stacked() {
        let mut stack = ToastStack::default();
        stack.push(Toast::new("Loading slots for 2024-05-02", ToastLevel::Info));
        stack.push(Toast::new("Loading slots for 2024-05-02", ToastLevel::Info));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.latest().unwrap().text(), "Loading slots for 2024-05-02 (x2)");
    }

    #[test]
    fn oldest_dropped_past_capacity() {
        let mut stack = ToastStack::default();
        for i in 0..6 {
            stack.push(Toast::new(format!("report {i}"), ToastLevel::Success));
        }
        assert_eq!(stack.len(), CAPACITY);
        assert_eq!(stack.iter().next().unwrap().message, "report 2");
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let mut stack = ToastStack::default();
        stack.push(Toast::new("gone", ToastLevel::Info).with_ttl(Duration::ZERO));
        stack.tick();
        assert!(stack.is_empty());
    }
}
