//! `wave summarize`: run the summarization flow for a post or raw text.
//!
//! A failed generation prints the fallback summary and exits successfully,
//! matching what the board shows. `--strict` turns the failure into an error.

use crate::cmd::load_posts;
use crate::output::{OutputMode, fail, pretty_kv, render_mode};
use clap::{ArgGroup, Args};
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;
use wave_core::{EffectiveConfig, FALLBACK_SUMMARY, SummarizeInput, WaveError};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["id", "text"])))]
pub struct SummarizeArgs {
    /// Post ID whose content should be summarized.
    pub id: Option<String>,

    /// Summarize this text instead of a post.
    #[arg(long)]
    pub text: Option<String>,

    /// Exit with an error instead of printing the fallback summary.
    #[arg(long)]
    pub strict: bool,
}

/// Result of `wave summarize` in JSON output.
#[derive(Debug, Serialize)]
pub struct SummaryView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    pub summary: String,
    /// True when `summary` is the fallback text.
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryView {
    fn from_result(post_id: Option<String>, result: Result<String, &WaveError>) -> Self {
        match result {
            Ok(summary) => Self {
                post_id,
                summary,
                fallback: false,
                error_code: None,
                error: None,
            },
            Err(err) => Self {
                post_id,
                summary: FALLBACK_SUMMARY.to_string(),
                fallback: true,
                error_code: Some(err.code().code().to_string()),
                error: Some(err.to_string()),
            },
        }
    }
}

fn write_text(view: &SummaryView, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", view.summary)
}

fn write_pretty(view: &SummaryView, w: &mut dyn Write) -> io::Result<()> {
    if let Some(id) = &view.post_id {
        pretty_kv(w, "Post", id)?;
    }
    pretty_kv(w, "Summary", &view.summary)?;
    if let Some(error) = &view.error {
        pretty_kv(w, "Reason", error)?;
    }
    Ok(())
}

/// Execute `wave summarize`.
///
/// # Errors
///
/// Returns an error if the post cannot be found, the provider is misconfigured,
/// or generation fails under `--strict`.
pub fn run_summarize(
    args: &SummarizeArgs,
    config: &EffectiveConfig,
    source: Option<&str>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let flow = config.summarize_flow().map_err(|err| fail(output, err))?;

    let (post_id, content) = if let Some(text) = &args.text {
        (None, text.clone())
    } else {
        let id = args.id.clone().unwrap_or_default();
        let loaded = load_posts(config, source, output)?;
        let Some(post) = loaded.posts.into_iter().find(|p| p.id == id) else {
            return Err(fail(output, WaveError::NotFound(id)));
        };
        (Some(post.id), post.content)
    };

    let result = flow.summarize(&SummarizeInput::new(content));
    if let Err(err) = &result {
        if args.strict {
            return Err(fail(output, err.clone()));
        }
        warn!("summarize failed, showing fallback: {err}");
    }

    let view = SummaryView::from_result(post_id, result.as_ref().map(|out| out.summary.clone()));
    render_mode(output, &view, write_text, write_pretty)
}
