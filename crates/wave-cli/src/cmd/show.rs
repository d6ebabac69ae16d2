//! `wave show`: display one post with its comments.

use crate::cmd::load_posts;
use crate::output::{OutputMode, fail, pretty_kv, pretty_rule, pretty_section, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use wave_core::{Comment, EffectiveConfig, WaveError};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Post ID to display.
    pub id: String,
}

/// Post detail as returned in JSON output.
#[derive(Debug, Serialize)]
pub struct ShowPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub source: String,
    pub comments: Vec<Comment>,
}

fn write_text(post: &ShowPost, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "id\t{}", post.id)?;
    writeln!(w, "title\t{}", post.title)?;
    writeln!(w, "source\t{}", post.source)?;
    writeln!(w, "content\t{}", post.content.replace('\n', "\\n"))?;
    for comment in &post.comments {
        writeln!(w, "comment\t{}\t{}\t{}", comment.id, comment.author, comment.text)?;
    }
    Ok(())
}

fn write_pretty(post: &ShowPost, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &post.title)?;
    pretty_kv(w, "ID", &post.id)?;
    pretty_kv(w, "Source", &post.source)?;
    writeln!(w)?;
    writeln!(w, "{}", post.content)?;
    writeln!(w)?;
    pretty_section(w, &format!("Comments ({})", post.comments.len()))?;
    if post.comments.is_empty() {
        writeln!(w, "(none)")?;
    }
    for comment in &post.comments {
        writeln!(w, "{}: {}", comment.author, comment.text)?;
    }
    pretty_rule(w)
}

/// Execute `wave show <id>`.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded or the post does not exist.
pub fn run_show(
    args: &ShowArgs,
    config: &EffectiveConfig,
    source: Option<&str>,
    output: OutputMode,
) -> anyhow::Result<()> {
    let loaded = load_posts(config, source, output)?;
    let Some(post) = loaded.posts.into_iter().find(|p| p.id == args.id) else {
        return Err(fail(output, WaveError::NotFound(args.id.clone())));
    };

    let view = ShowPost {
        id: post.id,
        title: post.title,
        content: post.content,
        source: loaded.source.to_string(),
        comments: post.comments,
    };
    render_mode(output, &view, write_text, write_pretty)
}
