//! `TaskDesk`: terminal client for a task-tracking REST backend.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskdesk/config.toml`).
//!
//! ```bash
//! # Browse tasks on a local backend
//! cargo run --bin taskdesk
//!
//! # Edit one task on a remote backend
//! cargo run --bin taskdesk -- --api-url https://tasks.example.com \
//!     --token "$TOKEN" --task-id 42
//!
//! # Or via environment variables
//! TASKDESK_API_URL=http://127.0.0.1:5000 cargo run --bin taskdesk -- --new
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskdesk::api::{self, ApiCommand, ApiEvent};
use taskdesk::app::App;
use taskdesk::config::{CliArgs, ClientConfig};
use taskdesk::gateway::http::HttpGateway;
use taskdesk::gateway::{GatewayError, Toast};
use taskdesk::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file; ratatui owns stdout.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(
        api_url = %config.api_url,
        authenticated = config.session().is_authenticated(),
        "taskdesk starting"
    );

    let gateway = match HttpGateway::new(&config.api_url, config.request_timeout) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, gateway, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskdesk exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdesk.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    gateway: HttpGateway,
    config: &ClientConfig,
) -> io::Result<()> {
    let (cmd_tx, mut evt_rx) = api::spawn_api(Arc::new(gateway), config.channel_capacity);

    let mut app = App::new(config.session()).with_timestamp_format(&config.timestamp_format);
    if let Some(cmd) = app.navigate(config.start_route()) {
        dispatch(&mut app, &cmd_tx, cmd);
    }

    let mut title = "";
    loop {
        if title != app.window_title() {
            title = app.window_title();
            execute!(terminal.backend_mut(), SetTitle(title))?;
        }

        terminal.draw(|frame| ui::draw(frame, &app))?;

        drain_api_events(&mut app, &mut evt_rx, &cmd_tx);

        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(cmd) = app.handle_key_event(key) {
                dispatch(&mut app, &cmd_tx, cmd);
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(ApiCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Hand a command to the request worker without blocking the UI.
fn dispatch(app: &mut App, tx: &mpsc::Sender<ApiCommand>, cmd: ApiCommand) {
    match tx.try_send(cmd) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(cmd)) => {
            tracing::warn!(?cmd, "request queue full");
            // Feed the failure back so the controller leaves its busy state.
            if let ApiCommand::Fetch { id, .. } = cmd {
                let failed = ApiEvent::Completed {
                    id,
                    result: Err(GatewayError::Transport(
                        "request queue full".to_string(),
                    )),
                };
                app.toast = Some(Toast::error("Too many requests in flight"));
                if let Some(next) = app.handle_api_event(failed) {
                    dispatch(app, tx, next);
                }
            }
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::error!("request worker is gone");
            app.toast = Some(Toast::error("Backend connection closed"));
        }
    }
}

/// Drain all pending `ApiEvent`s and apply them to the app.
fn drain_api_events(
    app: &mut App,
    rx: &mut mpsc::Receiver<ApiEvent>,
    tx: &mpsc::Sender<ApiCommand>,
) {
    while let Ok(event) = rx.try_recv() {
        if let Some(cmd) = app.handle_api_event(event) {
            dispatch(app, tx, cmd);
        }
    }
}
