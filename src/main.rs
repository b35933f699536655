mod animation;
mod app;
mod attack;
mod backend;
mod config;
mod dispatch;
mod error;
mod event;
mod session;
mod topology;
mod transcript;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::app::App;
use crate::backend::Gateway;
use crate::config::{CliArgs, Config};
use crate::dispatch::Dispatcher;
use crate::event::{Event, EventHandler, GatewayCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    if cli.print_default_config {
        print!("{}", config::default_config_toml());
        return Ok(());
    }

    // Initialize color-eyre with a panic hook that restores the terminal
    install_panic_hook();

    let config = config::load(&cli)?;

    // Held until exit so buffered log lines get flushed
    let _log_guard = init_logging(&config, cli.log.as_deref())?;

    info!(
        "melon starting (backend {} in {} mode)",
        config.backend.api_url,
        config.backend.mode.label()
    );

    let gateway = Gateway::new(config.gateway_settings())
        .wrap_err("Failed to build the backend client")?;
    let gateway = Arc::new(gateway);

    // Setup terminal
    enable_raw_mode().wrap_err("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).wrap_err("Failed to enter the alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut event_handler = EventHandler::new(config.tick_rate());
    let event_tx = event_handler.sender();

    let mut app = App::new(event_tx.clone(), &config);
    let mut dispatcher = Dispatcher::new(gateway, event_tx.clone());

    app.trigger_refresh();
    spawn_poller(event_tx.clone(), config.interface_poll(), || {
        GatewayCommand::RefreshInterfaces
    });
    spawn_poller(event_tx, config.status_poll(), || GatewayCommand::RefreshStatus);

    // ── Main event loop ───────────────────────────────────────────────
    let result = loop {
        if let Err(e) = terminal.draw(|f| ui::draw(f, &app)) {
            break Err::<(), _>(e).wrap_err("Failed to draw frame");
        }

        let Some(event) = event_handler.next().await else {
            break Ok(());
        };
        match event {
            Event::Command(command) => dispatcher.handle(command),
            Event::Tick => {
                dispatcher.poll_feed_status();
                app.handle_event(Event::Tick);
            }
            other => app.handle_event(other),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    dispatcher.shutdown();
    event_handler.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("melon exiting");
    result
}

/// Periodically queue a gateway command until the event loop goes away
fn spawn_poller<F>(tx: UnboundedSender<Event>, every: Duration, command: F)
where
    F: Fn() -> GatewayCommand + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick fires immediately; the startup refresh already covers it
        interval.tick().await;
        loop {
            interval.tick().await;
            if tx.send(Event::Command(command())).is_err() {
                break;
            }
        }
    });
}

/// Install a panic hook that restores the terminal before printing the panic
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(panic_info);
    }));
    color_eyre::install().ok();
}

/// Log to a file; stdout belongs to the TUI.
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &Config, log_path: Option<&Path>) -> Result<WorkerGuard> {
    use tracing_subscriber::EnvFilter;

    let (dir, file_name) = match log_path {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "melon.log".into());
            (dir, name)
        }
        None => (Config::log_dir(), "melon.log".to_string()),
    };
    std::fs::create_dir_all(&dir)
        .wrap_err_with(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
