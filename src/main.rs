use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{error::Error, fs::File, io, sync::Mutex, time::Duration};
use tracing_subscriber::EnvFilter;

use taskboard::api::{BearerToken, ClientConfig, HttpClient};
use taskboard::app::{session::AuthSession, storage::Storage, ui};
use taskboard::config::Config;

// Start the app.
// Terminal handling follows https://github.com/ratatui-org/ratatui/blob/main/examples/list.rs
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;

    // The terminal belongs to the UI, so logs go to a file
    let log_file = File::create(&config.log_file)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    tracing::info!(api_url = %config.api_url, "starting taskboard");

    let storage = Storage::open(&config.db_path)?;
    let token = BearerToken::default();
    let client_config = ClientConfig {
        timeout: config.request_timeout,
        ..ClientConfig::new(config.api_url.as_str())
    };
    let api = HttpClient::new(client_config, token.clone())?;

    // A stored token is checked once, before the first frame
    let mut session = AuthSession::new(&storage, token);
    session.hydrate(&api).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create an app with 250 ms tick
    let tick_rate = Duration::from_millis(250);
    let app = ui::App::new(session, &api);
    let res = ui::run_app(&mut terminal, app, tick_rate).await;

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        println!("{err:?}");
    }

    tracing::info!("taskboard stopped");
    Ok(())
}
