//! Terminal user interface (TUI) for wave.
//!
//! Provides the interactive board: posts as cards, on-demand summaries,
//! local comments and a comments feed.
//!
//! ## Entry points
//!
//! - [`run_board`]: take over the terminal and drive a [`board::BoardView`].

pub mod board;
mod editor;
pub mod worker;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Run the board until the user quits. The terminal is restored on every exit path.
///
/// # Errors
///
/// Returns terminal I/O failures.
pub fn run_board(mut view: board::BoardView) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut view);
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, view: &mut board::BoardView) -> Result<()> {
    loop {
        view.tick();
        terminal.draw(|frame| {
            let area = frame.area();
            view.render(frame, area);
        })?;
        if view.should_quit() {
            return Ok(());
        }

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            view.handle_key(key);
        }
    }
}
