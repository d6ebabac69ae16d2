//! Subcommand handlers. Each module exposes an `*Args` struct and a `run_*` function.

pub mod comments;
pub mod completions;
pub mod config;
pub mod list;
pub mod show;
pub mod summarize;
pub mod tui;

use crate::output::{OutputMode, fail};
use wave_core::board::LoadTicket;
use wave_core::{DataSource, EffectiveConfig, Post, Source};

/// Posts plus where they came from.
pub struct Loaded {
    pub kind: Option<DataSource>,
    pub source: Source,
    pub posts: Vec<Post>,
}

/// Fetch the post collection selected by `--source` and record the load.
///
/// # Errors
///
/// Renders and returns the fetch, parse or validation failure.
pub fn load_posts(
    config: &EffectiveConfig,
    selector: Option<&str>,
    output: OutputMode,
) -> anyhow::Result<Loaded> {
    let (kind, source) = config.select_source(selector);
    let ticket = LoadTicket {
        generation: 1,
        kind: kind.unwrap_or_default(),
        source: source.clone(),
    };
    let sink = config.telemetry_sink();
    match config.fetcher().fetch_posts(&source) {
        Ok(posts) => {
            sink.record(&ticket.loaded_event(&posts));
            tracing::debug!(source = %source, posts = posts.len(), "posts loaded");
            Ok(Loaded {
                kind,
                source,
                posts,
            })
        }
        Err(err) => {
            sink.record(&ticket.failed_event(&err));
            Err(fail(output, err))
        }
    }
}
