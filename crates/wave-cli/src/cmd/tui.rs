use anyhow::Result;
use clap::Args;
use tracing::{info, warn};
use wave_core::{Board, DataSource, EffectiveConfig};

use crate::tui::board::BoardView;
use crate::tui::run_board;
use crate::tui::worker::Workers;

#[derive(Args, Debug)]
pub struct TuiArgs {
    /// Do not load the configured comments feed on start
    #[arg(long)]
    no_feed: bool,
}

/// Open the interactive board.
///
/// `--source local|remote` picks the starting source. A literal path or URL
/// takes the local slot, so `t` still toggles to the configured remote.
///
/// # Errors
///
/// Returns terminal failures.
pub fn run_tui(
    args: &TuiArgs,
    config: &EffectiveConfig,
    selector: Option<&str>,
    author: Option<&str>,
) -> Result<()> {
    let (kind, selected) = config.select_source(selector);
    let local = match kind {
        None => selected,
        Some(_) => config.source(DataSource::Local),
    };
    let board = Board::new(
        local,
        config.source(DataSource::Remote),
        kind.unwrap_or(DataSource::Local),
    );

    let flow = config.summarize_flow();
    if let Err(err) = &flow {
        warn!("summaries unavailable: {err}");
    }
    let workers = Workers::new(config.fetcher(), flow);
    let author = author.unwrap_or(&config.config.ui.author).to_string();

    info!(source = %board.active_source(), author = %author, "opening board");
    let mut view = BoardView::new(
        board,
        workers,
        config.telemetry_sink(),
        author,
        config.project_root.clone(),
    );
    view.start(if args.no_feed {
        None
    } else {
        config.comments_source()
    });
    run_board(view)
}
