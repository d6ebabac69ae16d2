//! `wave list`: list posts from the active source.

use crate::cmd::{Loaded, load_posts};
use crate::output::{OutputMode, Renderable, one_line, render_list};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use wave_core::{EffectiveConfig, Post};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum posts to show.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// One row of `wave list` output.
#[derive(Debug, Serialize)]
pub struct PostRow {
    pub id: String,
    pub title: String,
    pub comments: usize,
    pub preview: String,
}

impl From<&Post> for PostRow {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            comments: post.comments.len(),
            preview: one_line(&post.content, 60),
        }
    }
}

impl Renderable for PostRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let noun = if self.comments == 1 { "comment" } else { "comments" };
        writeln!(w, "{:<8} {}  ({} {noun})", self.id, self.title, self.comments)?;
        if !self.preview.is_empty() {
            writeln!(w, "{:<8} {}", "", self.preview)?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}\t{}\t{}", self.id, self.title, self.comments)
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "title", "comments"]
    }
}

fn empty_message(loaded: &Loaded) -> String {
    match loaded.kind {
        Some(kind) => format!("No posts in {kind} source ({})", loaded.source),
        None => format!("No posts in {}", loaded.source),
    }
}

/// Execute `wave list`.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded or output fails.
pub fn run_list(
    args: &ListArgs,
    config: &EffectiveConfig,
    source: Option<&str>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let loaded = load_posts(config, source, output)?;
    let limit = args.limit.unwrap_or(usize::MAX);
    let rows: Vec<PostRow> = loaded.posts.iter().take(limit).map(PostRow::from).collect();

    if rows.is_empty() && !output.is_json() {
        println!("{}", empty_message(&loaded));
        return Ok(());
    }
    render_list(&rows, output)?;
    Ok(())
}
