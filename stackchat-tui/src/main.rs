use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use stackchat_core::{
    ensure_data_dir, init_logging, ApiClient, FileSessionStore, LogTarget, MemorySessionStore,
    SessionStore, StackchatConfig, StackchatError,
};
use tokio::sync::mpsc;

use stackchat_tui::app::{App, AppSettings};
use stackchat_tui::events::TaskRunner;
use stackchat_tui::theme::ThemeLoader;
use stackchat_tui::ui;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> Result<()> {
    let config = StackchatConfig::load().map_err(StackchatError::from)?;
    setup_logging(&config);

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, config);
    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("Application error: {e:#}");
        return Err(e);
    }

    Ok(())
}

/// The terminal belongs to the UI, so logs go to a file in the data directory.
fn setup_logging(config: &StackchatConfig) {
    let path = match ensure_data_dir() {
        Ok(dir) => dir.join("stackchat-tui.log"),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            return;
        }
    };
    if let Err(e) = init_logging(
        &config.logging,
        None,
        "stackchat_tui=info,stackchat_core=info",
        LogTarget::File(path),
    ) {
        eprintln!("Logging disabled: {e}");
    }
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn build_client(config: &StackchatConfig) -> Result<Arc<ApiClient>> {
    let store: Arc<dyn SessionStore> = match config.session_path() {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => {
            tracing::warn!("No data directory; the session ends when the UI exits");
            Arc::new(MemorySessionStore::new())
        }
    };
    let client = ApiClient::new(&config.api, store).context("Failed to create API client")?;
    Ok(Arc::new(client))
}

fn run_app(terminal: &mut Term, config: StackchatConfig) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(event_loop(terminal, config))
}

async fn event_loop(terminal: &mut Term, config: StackchatConfig) -> Result<()> {
    let client = build_client(&config)?;
    let (tx, mut results) = mpsc::unbounded_channel();
    let mut runner = TaskRunner::new(client.clone(), tx, config.poll_interval());

    let theme_loader = ThemeLoader::new();
    let theme_manager = theme_loader.initialize_theme_manager(&config.tui.theme);
    let settings = AppSettings {
        typing_speed: Duration::from_millis(config.tui.typing_speed_ms),
        login_field: config.api.login_field,
        authenticated: client.is_authenticated().await,
    };
    let mut app = App::new(settings, theme_manager, Some(theme_loader));
    tracing::info!(api = %client.base_url(), "TUI started");

    for task in app.startup_tasks() {
        runner.dispatch(task);
    }

    let idle_tick = Duration::from_millis(config.tui.tick_rate_ms.max(16));
    let fast_tick = Duration::from_millis(config.tui.typing_speed_ms.max(10)).min(idle_tick);
    let mut input = EventStream::new();

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        let tick = if app.is_animating() {
            fast_tick
        } else {
            idle_tick
        };

        tokio::select! {
            event = input.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    for task in app.handle_key(key) {
                        runner.dispatch(task);
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal input"),
                None => break,
            },
            Some(result) = results.recv() => {
                for task in app.handle_event(result) {
                    runner.dispatch(task);
                }
            }
            _ = tokio::time::sleep(tick) => app.on_tick(Instant::now()),
        }

        if app.should_quit {
            break;
        }
    }

    tracing::info!("TUI exiting");
    Ok(())
}
