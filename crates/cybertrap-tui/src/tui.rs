//! Terminal lifecycle: raw mode, alternate screen, and panic-safe restore.

use std::io::{Stdout, stdout};

use color_eyre::eyre::Result;
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};

pub type Backend = CrosstermBackend<Stdout>;

pub struct Tui {
    terminal: Terminal<Backend>,
    active: bool,
}

impl Tui {
    pub fn new() -> Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self {
            terminal,
            active: false,
        })
    }

    /// Raw mode, alternate screen, hidden cursor.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(cursor::Hide)?;
        self.terminal.clear()?;
        self.active = true;
        Ok(())
    }

    pub fn exit(&mut self) {
        if self.active {
            restore_terminal();
            self.active = false;
        }
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        self.exit();
    }
}

/// Best effort; a half-restored terminal beats a panic inside a panic.
fn restore_terminal() {
    let _ = stdout().execute(cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// Error and panic hooks that put the terminal back before printing.
///
/// Debug builds get a `better-panic` backtrace, release builds write a
/// `human-panic` crash report. Call before [`Tui::enter`].
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .panic_section("Logs are in the cybertrap-tui log directory (see --log-dir).")
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();

        #[cfg(debug_assertions)]
        {
            let _ = &panic_hook;
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .create_panic_handler()(info);
        }

        #[cfg(not(debug_assertions))]
        {
            panic_hook(info);
            let meta = human_panic::metadata!();
            let report = human_panic::handle_dump(&meta, info);
            let _ = human_panic::print_msg(report, &meta);
        }
    }));

    Ok(())
}
