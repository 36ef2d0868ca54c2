//! The UI loop.
//!
//! A single task owns the board and the terminal. It waits on three things
//! at once: key presses, refresh outcomes from fetch tasks, and the refresh
//! deadline. Every change to what is on screen happens here.

use std::sync::Arc;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::info;

use crate::board::{ArrivalsSource, Board};
use crate::config::BoardConfig;
use crate::tfl::{FetchError, MockArrivals, TflClient};
use crate::ui;
use crate::ui::terminal::{self, BoardTerminal};

/// Errors that stop the board from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("cannot set up arrivals source: {0}")]
    Source(#[from] FetchError),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Toggle,
}

impl Action {
    /// Map a key event to an action. Releases and repeats are ignored.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char('t') | KeyCode::Char('T') | KeyCode::Tab => Some(Action::Toggle),
            _ => None,
        }
    }
}

/// Pick the arrivals source from `config` and run the board until quit.
pub async fn start(config: BoardConfig) -> Result<(), AppError> {
    match config.mock_dir.clone() {
        Some(dir) => {
            info!(dir = %dir.display(), "serving arrivals from mock directory");
            let source = MockArrivals::new(&dir)?;
            run(config, source).await
        }
        None => {
            let client = TflClient::new(config.tfl.clone())?;
            run(config, client).await
        }
    }
}

/// Take over the terminal and run the board against `source`.
///
/// The terminal is restored on every exit path.
pub async fn run<S: ArrivalsSource>(config: BoardConfig, source: S) -> Result<(), AppError> {
    let mut terminal = terminal::init()?;
    let result = event_loop(&mut terminal, config, source).await;
    let restored = terminal::restore();

    result?;
    restored?;
    Ok(())
}

async fn event_loop<S: ArrivalsSource>(
    terminal: &mut BoardTerminal,
    config: BoardConfig,
    source: S,
) -> Result<(), AppError> {
    info!(
        layout = %config.layout,
        period_secs = config.refresh_period.as_secs(),
        authenticated = config.tfl.credentials.is_some(),
        "board started"
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut board = Board::new(
        config.routes,
        config.layout,
        config.refresh_period,
        Arc::new(source),
        tx,
        Instant::now(),
    );

    let mut events = EventStream::new();
    let mut title = String::new();

    loop {
        let current_title = board.state().title();
        if current_title != title {
            terminal::set_title(&current_title)?;
            title = current_title;
        }

        terminal.draw(|frame| ui::draw(frame, board.state()))?;

        let deadline = board.deadline();
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => match Action::from_key(key) {
                    Some(Action::Quit) => break,
                    Some(Action::Toggle) => {
                        board.toggle();
                    }
                    None => {}
                },
                // Resizes and other events just trigger a redraw.
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
            Some(outcome) = rx.recv() => board.on_outcome(outcome, Instant::now()),
            () = wait_until(deadline) => board.on_tick(Instant::now()),
        }
    }

    info!("board closed");
    Ok(())
}

/// Sleep until `deadline`, or forever if there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
