//! Terminal setup and the cooperative event loop.

use crate::config::Config;
use crate::ui::conversation::{ConversationAction, ConversationManager};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;

/// How long one loop iteration waits for input before redrawing; keeps
/// the indicator and finished exchanges fresh without a busy loop.
const TICK: Duration = Duration::from_millis(50);

/// Run the chat TUI until the user exits.
pub async fn run(config: &Config) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut manager = ConversationManager::new(config);
    let result = run_loop(&mut terminal, &mut manager).await;

    // Restore the terminal before surfacing any loop error
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to restore cursor")?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    manager: &mut ConversationManager,
) -> Result<()> {
    loop {
        manager.process_events();

        terminal
            .draw(|frame| {
                let area = frame.size();
                manager.render(area, frame.buffer_mut());
            })
            .context("Failed to draw frame")?;

        if !event::poll(TICK).context("Failed to poll terminal events")? {
            continue;
        }

        if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(());
            }
            if manager.handle_key(key) == ConversationAction::Exit {
                return Ok(());
            }
        }
    }
}
