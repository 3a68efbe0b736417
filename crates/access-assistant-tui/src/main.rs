use anyhow::Result;
use access_assistant_core::{ChatClient, Config};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_create().unwrap_or_else(|e| {
        eprintln!("Ignoring unreadable config: {}", e);
        Config::new()
    });

    let _log_guard = logging::init(config.log_level())?;

    let endpoint = config.endpoint();
    tracing::info!(%endpoint, "starting access assistant");
    let mut app = App::new(ChatClient::new(&endpoint), &config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "access assistant exited with an error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        app.poll_pending().await;
    }

    Ok(())
}
