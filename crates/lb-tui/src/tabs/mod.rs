pub mod appointments;
pub mod dashboard;
pub mod login;
pub mod plans;
pub mod reports;
pub mod users;
pub mod whatsapp;

use ratatui::style::Color;
use unicode_width::UnicodeWidthChar;

use lb_api_types::{AppointmentStatus, InterestLevel};

pub use lb_core::money::format_brl;

/// `yes` / `no` / `-` for flags the backend may never have set.
pub fn flag(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
}

pub fn interest_color(level: &InterestLevel) -> Color {
    match level {
        InterestLevel::Hot => Color::Red,
        InterestLevel::Warm => Color::Yellow,
        InterestLevel::Cold => Color::Blue,
        InterestLevel::Unknown(_) => Color::DarkGray,
    }
}

pub fn status_color(status: &AppointmentStatus) -> Color {
    match status {
        AppointmentStatus::Scheduled => Color::Cyan,
        AppointmentStatus::Confirmed => Color::Green,
        AppointmentStatus::Completed => Color::DarkGray,
        AppointmentStatus::Cancelled => Color::Red,
        AppointmentStatus::NoShow => Color::Magenta,
        AppointmentStatus::Unknown => Color::White,
    }
}

/// Cut `text` to `max` display columns, marking the cut with `…`.
pub fn truncate(text: &str, max: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return text.to_string();
    }
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max.saturating_sub(1) {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push('…');
    out
}
