//! Terminal setup and teardown.

use std::io::{self, Stdout, stdout};

use crossterm::ExecutableCommand;
use crossterm::cursor::Show;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub type BoardTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Switch to the alternate screen in raw mode.
///
/// Also installs a panic hook that restores the terminal before the panic
/// message is printed.
pub fn init() -> io::Result<BoardTerminal> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore();
        hook(info);
    }));

    enable_raw_mode()?;
    let setup = stdout()
        .execute(EnterAlternateScreen)
        .and_then(|_| Terminal::new(CrosstermBackend::new(stdout())));

    match setup {
        Ok(mut terminal) => {
            terminal.hide_cursor()?;
            terminal.clear()?;
            Ok(terminal)
        }
        Err(err) => {
            let _ = restore();
            Err(err)
        }
    }
}

/// Leave the alternate screen and raw mode.
pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?.execute(Show)?;
    Ok(())
}

pub fn set_title(title: &str) -> io::Result<()> {
    stdout().execute(SetTitle(title))?;
    Ok(())
}
