mod app;
mod command;
mod tabs;
mod ui;
mod widgets;
mod worker;

use std::io::{self, BufRead, Write as _};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde_json::json;

use lb_client::ApiClient;
use lb_core::config::Config;

use crate::app::App;
use crate::worker::{Response, WorkerHandle};

/// Longest wait for a single worker response in headless mode.
const HEADLESS_WAIT: Duration = Duration::from_secs(60);

struct Args {
    headless: bool,
    api: Option<String>,
    config: Option<PathBuf>,
}

// Simple args, no clap dependency.
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    Args {
        headless: args.iter().any(|a| a == "--headless"),
        api: value_of("--api"),
        config: value_of("--config").map(PathBuf::from),
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading ~/.leadboard/config.toml")?,
    };
    if let Some(api) = args.api {
        config.backend.url = api;
        config.validate().context("invalid --api value")?;
    }

    // The terminal belongs to the UI, so logs go to a file.
    let log_path = Config::default_path().with_file_name("tui.log");
    if let Err(err) = lb_telemetry::logging::init_logging_to_file("lb-tui", &config.logging.level, &log_path) {
        eprintln!("logging disabled: cannot open {}: {err}", log_path.display());
    }
    tracing::info!(backend = %config.backend.url, headless = args.headless, "starting");

    let client = ApiClient::from_config(&config).context("building HTTP client")?;
    let worker = worker::spawn(client, config.reports.dir()).context("spawning worker")?;
    let password = Config::password_from_env();

    if args.headless {
        return run_headless(&config, &worker, password);
    }

    // Set up panic hook to restore terminal on panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let result = run(&config, &worker, password);

    restore_terminal()?;
    result
}

fn send_pending(app: &mut App, worker: &WorkerHandle) {
    for req in app.take_requests() {
        tracing::debug!(request = ?req, "dispatch");
        if worker.tx.send(req).is_err() {
            tracing::error!("worker channel closed");
        }
    }
}

/// Run the interactive TUI with the standard crossterm backend.
fn run(config: &Config, worker: &WorkerHandle, password: Option<String>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    app.start(password);
    let tick = Duration::from_millis(config.ui.tick_ms);

    loop {
        while let Ok(resp) = worker.rx.try_recv() {
            app.apply(resp);
        }
        send_pending(&mut app, worker);

        terminal.draw(|frame| ui::render(frame, &app))?;

        if ct_event::poll(tick)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Headless mode: reads JSON or `:` commands from stdin, writes JSON lines to
/// stdout. Each command is acknowledged after the network work it started
/// has finished.
///
/// Usage: `echo '{"cmd":"query_state"}' | lb-tui --headless`
fn run_headless(config: &Config, worker: &WorkerHandle, password: Option<String>) -> Result<()> {
    let mut app = App::new(config);
    app.start_headless(password);

    emit_event(&json!({
        "event": "started",
        "backend_url": app.backend_url,
        "tabs": app::TAB_NAMES.len(),
    }));
    pump(&mut app, worker);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Try JSON command first, then text command
        let Some(cmd) = command::parse_json_command(line).or_else(|| command::parse_command(line))
        else {
            emit_event(&json!({
                "event": "error",
                "message": format!("unknown command: {line}"),
            }));
            continue;
        };

        let prev_tab = app.current_tab;
        let result = command::execute_command(&mut app, cmd);
        if app.current_tab != prev_tab {
            emit_event(&json!({
                "event": "tab_changed",
                "tab": app.current_tab,
                "tab_name": app::TAB_NAMES[app.current_tab],
            }));
        }
        pump(&mut app, worker);

        match result {
            Some(json_str) => {
                println!("{json_str}");
                let _ = io::stdout().flush();
            }
            None => emit_event(&json!({"event": "ok"})),
        }

        if app.should_quit {
            emit_event(&json!({"event": "quit"}));
            break;
        }
    }

    Ok(())
}

/// Dispatch queued requests and fold responses until nothing is in flight.
/// Responses may queue follow-up requests (reload after a mutation).
fn pump(app: &mut App, worker: &WorkerHandle) {
    send_pending(app, worker);
    while app.pending > 0 {
        match worker.rx.recv_timeout(HEADLESS_WAIT) {
            Ok(resp) => {
                if let Some(event) = response_event(&resp) {
                    emit_event(&event);
                }
                app.apply(resp);
                send_pending(app, worker);
            }
            Err(err) => {
                tracing::warn!(error = %err, pending = app.pending, "worker did not answer");
                emit_event(&json!({"event": "error", "message": "backend did not answer in time"}));
                app.pending = 0;
            }
        }
    }
}

fn response_event(resp: &Response) -> Option<serde_json::Value> {
    let event = match resp {
        Response::LoggedIn { username } => json!({"event": "logged_in", "username": username}),
        Response::LoginFailed(message) => json!({"event": "login_failed", "message": message}),
        Response::Dashboard(Ok((stats, leads))) => json!({
            "event": "dashboard_loaded",
            "stats": stats,
            "leads": leads.len(),
        }),
        Response::Conversation { lead_id, result: Ok(conv) } => json!({
            "event": "conversation_loaded",
            "lead_id": lead_id,
            "messages": conv.messages.len(),
        }),
        Response::Completed { action, result: Ok(()) } => {
            json!({"event": "completed", "action": action.label()})
        }
        Response::ReportSaved(Ok(path)) => {
            json!({"event": "report_saved", "path": path.display().to_string()})
        }
        Response::Dashboard(Err(message))
        | Response::Conversation { result: Err(message), .. }
        | Response::Completed { result: Err(message), .. }
        | Response::ReportSaved(Err(message))
        | Response::Plans(Err(message))
        | Response::Appointments(Err(message))
        | Response::Users(Err(message))
        | Response::Slots { result: Err(message), .. } => {
            json!({"event": "error", "message": message})
        }
        Response::Plans(Ok(_))
        | Response::Appointments(Ok(_))
        | Response::Users(Ok(_))
        | Response::Slots { result: Ok(_), .. } => return None,
    };
    Some(event)
}

fn emit_event(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string(value) {
        println!("{s}");
        let _ = io::stdout().flush();
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}
