//! Scriptable command layer for the leadboard TUI.
//!
//! Two input forms map onto the same [`AppCommand`]:
//! - **Command mode**: `:` prefixed text commands (`:filter hot`, `:tab 2`).
//! - **JSON pipe**: `{"cmd":"filter","args":["hot"]}` lines on stdin in
//!   headless mode.
//!
//! Query commands return the serialized state as a JSON string.

use serde_json::{json, Value};

use lb_core::dashboard::ConversationView;
use lb_core::filter::LeadFilter;

use crate::app::{
    App, Screen, TAB_APPOINTMENTS, TAB_DASHBOARD, TAB_NAMES, TAB_PLANS, TAB_REPORTS, TAB_USERS,
    TAB_WHATSAPP,
};

// ---------------------------------------------------------------------------
// AppCommand enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    // Navigation
    Tab(usize),
    NextTab,
    PrevTab,
    Up,
    Down,

    // Dashboard
    Filter(LeadFilter),
    Select(String),
    Refresh,
    ToggleContact,
    ToggleSale(Option<f64>),

    // Queries
    QueryState,
    QueryTab,
    QuerySelected,

    // System
    Help,
    Quit,
}

// ---------------------------------------------------------------------------
// Text command parser  (`:` prefixed)
// ---------------------------------------------------------------------------

/// Parse a `:` prefixed command string.
///
/// Examples: `:tab 1`, `:filter not_contacted`, `:select 42`, `:sale 89.90`.
pub fn parse_command(input: &str) -> Option<AppCommand> {
    let input = input.trim().strip_prefix(':')?;
    let mut parts = input.splitn(2, ' ');
    let verb = parts.next()?.trim();
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

    match verb {
        "tab" => Some(AppCommand::Tab(arg?.parse().ok()?)),
        "next" | "nexttab" | "next_tab" => Some(AppCommand::NextTab),
        "prev" | "prevtab" | "prev_tab" => Some(AppCommand::PrevTab),
        "up" | "k" => Some(AppCommand::Up),
        "down" | "j" => Some(AppCommand::Down),
        "filter" | "f" => Some(AppCommand::Filter(arg?.parse().ok()?)),
        "select" | "sel" => Some(AppCommand::Select(arg?.to_string())),
        "refresh" | "r" => Some(AppCommand::Refresh),
        "contact" | "toggle_contact" => Some(AppCommand::ToggleContact),
        "sale" | "toggle_sale" => match arg {
            Some(raw) => Some(AppCommand::ToggleSale(Some(parse_amount(raw)?))),
            None => Some(AppCommand::ToggleSale(None)),
        },
        "query" => match arg? {
            "state" => Some(AppCommand::QueryState),
            "tab" => Some(AppCommand::QueryTab),
            "selected" => Some(AppCommand::QuerySelected),
            _ => None,
        },
        "quit" | "q" => Some(AppCommand::Quit),
        "help" | "?" => Some(AppCommand::Help),
        _ => None,
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

// ---------------------------------------------------------------------------
// JSON command parser
// ---------------------------------------------------------------------------

/// Parse a JSON command from the headless pipe.
///
/// Expected format: `{"cmd":"tab","args":[1]}` or `{"cmd":"query_state"}`.
/// Lead ids may be given as numbers or strings.
pub fn parse_json_command(line: &str) -> Option<AppCommand> {
    let v: Value = serde_json::from_str(line).ok()?;
    let cmd = v.get("cmd")?.as_str()?;
    let args = v.get("args").and_then(Value::as_array);
    let arg = |idx: usize| -> Option<&Value> { args?.get(idx) };

    match cmd {
        "tab" => Some(AppCommand::Tab(arg(0)?.as_u64()? as usize)),
        "next_tab" | "nexttab" => Some(AppCommand::NextTab),
        "prev_tab" | "prevtab" => Some(AppCommand::PrevTab),
        "up" => Some(AppCommand::Up),
        "down" => Some(AppCommand::Down),
        "filter" => Some(AppCommand::Filter(arg(0)?.as_str()?.parse().ok()?)),
        "select" => {
            let id = match arg(0)? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some(AppCommand::Select(id))
        }
        "refresh" => Some(AppCommand::Refresh),
        "toggle_contact" => Some(AppCommand::ToggleContact),
        "toggle_sale" => {
            let amount = match arg(0) {
                None | Some(Value::Null) => None,
                Some(Value::Number(n)) => Some(n.as_f64()?),
                Some(Value::String(s)) => Some(parse_amount(s)?),
                Some(_) => return None,
            };
            Some(AppCommand::ToggleSale(amount))
        }
        "query_state" => Some(AppCommand::QueryState),
        "query_tab" => Some(AppCommand::QueryTab),
        "query_selected" => Some(AppCommand::QuerySelected),
        "quit" => Some(AppCommand::Quit),
        "help" => Some(AppCommand::Help),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

fn error(message: impl Into<String>) -> Option<String> {
    Some(json!({"event": "error", "message": message.into()}).to_string())
}

/// Execute a command against the application state.
///
/// Returns `Some(json)` for queries and rejected commands, `None` otherwise.
/// Network work is queued on the app and picked up by the caller.
pub fn execute_command(app: &mut App, cmd: AppCommand) -> Option<String> {
    match cmd {
        // -- Navigation -----------------------------------------------------
        AppCommand::Tab(idx) => {
            if idx >= TAB_NAMES.len() {
                return error(format!("no tab {idx}"));
            }
            app.switch_tab(idx);
            None
        }
        AppCommand::NextTab => {
            app.switch_tab((app.current_tab + 1) % TAB_NAMES.len());
            None
        }
        AppCommand::PrevTab => {
            app.switch_tab((app.current_tab + TAB_NAMES.len() - 1) % TAB_NAMES.len());
            None
        }
        AppCommand::Up => {
            app.cursor_up();
            None
        }
        AppCommand::Down => {
            app.cursor_down();
            None
        }

        // -- Dashboard ------------------------------------------------------
        AppCommand::Filter(filter) => {
            app.set_filter(filter);
            None
        }
        AppCommand::Select(id) => {
            if app.dashboard.leads.get(&id).is_none() {
                return error(format!("no lead with id {id}"));
            }
            app.select_lead(&id);
            None
        }
        AppCommand::Refresh => {
            app.reload_current_tab();
            None
        }
        AppCommand::ToggleContact => {
            if app.toggle_contact() {
                None
            } else {
                error("no lead to update")
            }
        }
        AppCommand::ToggleSale(amount) => {
            if app.toggle_sale(amount, None) {
                None
            } else {
                error("no lead to update")
            }
        }

        // -- Queries --------------------------------------------------------
        AppCommand::QueryState => Some(state_json(app).to_string()),
        AppCommand::QueryTab => Some(tab_json(app).to_string()),
        AppCommand::QuerySelected => Some(selected_json(app).to_string()),

        // -- System ---------------------------------------------------------
        AppCommand::Help => {
            app.show_help = true;
            None
        }
        AppCommand::Quit => {
            app.should_quit = true;
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

fn state_json(app: &App) -> Value {
    let dash = &app.dashboard;
    json!({
        "screen": match app.screen {
            Screen::Login => "login",
            Screen::Main => "main",
        },
        "current_tab": app.current_tab,
        "tab_name": TAB_NAMES.get(app.current_tab).copied().unwrap_or("unknown"),
        "username": app.username,
        "backend_url": app.backend_url,
        "filter": dash.filter().as_str(),
        "cursor": dash.cursor(),
        "selected_lead": dash.selected_id(),
        "loading": dash.is_loading(),
        "pending": app.pending,
        "alert": app.alert,
        "stats": dash.stats,
        "counts": {
            "leads": dash.leads.len(),
            "visible": dash.visible().len(),
            "appointments": app.appointments.len(),
            "plans": app.plans.len(),
            "users": app.users.len(),
        },
        "filter_counts": dash
            .filter_counts()
            .into_iter()
            .map(|(f, n)| (f.as_str().to_string(), json!(n)))
            .collect::<serde_json::Map<String, Value>>(),
    })
}

fn tab_json(app: &App) -> Value {
    match app.current_tab {
        TAB_DASHBOARD => json!(app.dashboard.visible()),
        TAB_APPOINTMENTS => json!(app.appointment_rows()),
        TAB_PLANS => json!(app.plans),
        TAB_REPORTS => json!({
            "reports_dir": app.reports_dir.display().to_string(),
            "last_report": app.last_report.as_ref().map(|p| p.display().to_string()),
        }),
        TAB_USERS => json!(app.users),
        TAB_WHATSAPP => json!({
            "webhook_url": lb_client::webhook_url(&app.backend_url),
            "events": ["messages", "message_status"],
        }),
        _ => Value::Null,
    }
}

fn selected_json(app: &App) -> Value {
    match app.current_tab {
        TAB_DASHBOARD => {
            let dash = &app.dashboard;
            let conversation = match &dash.conversation {
                ConversationView::Empty => json!(null),
                ConversationView::Loading => json!({"state": "loading"}),
                ConversationView::Failed(message) => {
                    json!({"state": "failed", "message": message})
                }
                ConversationView::Loaded(conv) => {
                    json!({"state": "loaded", "messages": conv.messages})
                }
            };
            json!({
                "lead": dash.selected(),
                "cursor_lead": dash.lead_at_cursor(),
                "conversation": conversation,
            })
        }
        TAB_APPOINTMENTS => json!(app.selected_appointment()),
        TAB_PLANS => json!(app.plans.get(app.plan_cursor)),
        TAB_USERS => json!(app.users.get(app.user_cursor)),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_commands() {
        assert_eq!(parse_command(":tab 2"), Some(AppCommand::Tab(2)));
        assert_eq!(
            parse_command(":filter not_contacted"),
            Some(AppCommand::Filter(LeadFilter::NotContacted))
        );
        assert_eq!(parse_command(":select 42"), Some(AppCommand::Select("42".into())));
        assert_eq!(parse_command(":sale"), Some(AppCommand::ToggleSale(None)));
        assert_eq!(parse_command(":sale 89,90"), Some(AppCommand::ToggleSale(Some(89.9))));
        assert_eq!(parse_command(":query state"), Some(AppCommand::QueryState));
        assert_eq!(parse_command("tab 2"), None);
        assert_eq!(parse_command(":filter lukewarm"), None);
        assert_eq!(parse_command(":sale -3"), None);
    }

    #[test]
    fn parses_json_commands() {
        assert_eq!(
            parse_json_command(r#"{"cmd":"filter","args":["hot"]}"#),
            Some(AppCommand::Filter(LeadFilter::Hot))
        );
        assert_eq!(
            parse_json_command(r#"{"cmd":"select","args":[7]}"#),
            Some(AppCommand::Select("7".into()))
        );
        assert_eq!(
            parse_json_command(r#"{"cmd":"toggle_sale","args":[120.5]}"#),
            Some(AppCommand::ToggleSale(Some(120.5)))
        );
        assert_eq!(
            parse_json_command(r#"{"cmd":"toggle_sale"}"#),
            Some(AppCommand::ToggleSale(None))
        );
        assert_eq!(parse_json_command(r#"{"cmd":"nope"}"#), None);
        assert_eq!(parse_json_command("not json"), None);
    }
}
