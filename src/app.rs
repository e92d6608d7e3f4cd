use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::Config;
use crate::logging::{self, LogTarget};
use crate::tui::{self, EventHandler, Tui, TuiEvent};
use crate::ui::conversation::{ConversationAction, ConversationManager};
use crate::ui::shell;

/// Run the interactive chat until the user quits
pub async fn run(config: Config) -> Result<()> {
    logging::init(LogTarget::File(&config.log_path()))?;
    log::info!("starting chat against {}", config.endpoint.url);

    let mut manager =
        ConversationManager::new(&config).context("Failed to set up the query client")?;

    tui::install_panic_hook();
    let mut terminal = tui::init().context("Failed to initialise terminal")?;
    let result = event_loop(&mut terminal, &mut manager, &config).await;
    tui::restore().context("Failed to restore terminal")?;

    log::info!("chat closed after {} turns", manager.state().turns().len());
    result
}

async fn event_loop(
    terminal: &mut Tui,
    manager: &mut ConversationManager,
    config: &Config,
) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(config.ui.tick_rate_ms.max(16)));

    loop {
        terminal.draw(|frame| shell::render(frame, &config.ui.title, manager))?;

        match events.next().await {
            Some(TuiEvent::Key(key)) => {
                if manager.handle_key(key) == ConversationAction::Exit {
                    break;
                }
            }
            Some(TuiEvent::Tick) => manager.tick(),
            Some(TuiEvent::Resize(_, _)) => {}
            None => break,
        }

        manager.process_query_events();
    }

    Ok(())
}
