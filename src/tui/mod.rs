//! Interactive comparison screen
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;

use anyhow::Result;
pub use app::App;
use terminal::TerminalManager;

use crate::clipboard::SystemClipboard;
use crate::dispatch::Engine;

/// Run the interactive TUI until the user quits
pub fn run_interactive(engine: Engine) -> Result<()> {
    let mut app = App::new(engine, Box::new(SystemClipboard::new()));
    let mut manager = TerminalManager::new()?;
    app.run(manager.terminal_mut())
}
