//! `wave comments`: load a comments document and print its comments.

use crate::output::{OutputMode, Renderable, fail, render_list};
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use wave_core::board::comments_loaded_event;
use wave_core::fetch::read_comments_file;
use wave_core::{Comment, EffectiveConfig, Source, WaveError};

#[derive(Args, Debug)]
pub struct CommentsArgs {
    /// Read a comments file from disk.
    #[arg(long, conflicts_with = "from")]
    pub file: Option<PathBuf>,

    /// Fetch the comments document from a path or URL.
    #[arg(long)]
    pub from: Option<String>,
}

impl Renderable for Comment {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}: {}", self.author, self.text)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self).map_err(io::Error::other)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}\t{}\t{}", self.id, self.author, self.text)
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "author", "text"]
    }
}

/// Execute `wave comments`.
///
/// Without `--file` or `--from` the configured `sources.comments` document is used.
///
/// # Errors
///
/// Returns an error if no document is selected or it cannot be loaded.
pub fn run_comments(
    args: &CommentsArgs,
    config: &EffectiveConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let (name, result) = if let Some(path) = &args.file {
        let path = if path.is_relative() {
            config.project_root.join(path)
        } else {
            path.clone()
        };
        (path.display().to_string(), read_comments_file(&path))
    } else {
        let source = match &args.from {
            Some(raw) => Source::parse(raw).resolve(&config.project_root),
            None => config.comments_source().ok_or_else(|| {
                fail(
                    output,
                    WaveError::Config {
                        path: config.project_path.display().to_string(),
                        message: "sources.comments is not set; pass --file or --from".to_string(),
                    },
                )
            })?,
        };
        (source.to_string(), config.fetcher().fetch_comments(&source))
    };

    let comments = result.map_err(|err| fail(output, err))?;
    config
        .telemetry_sink()
        .record(&comments_loaded_event(&name, &comments));

    if comments.is_empty() && !output.is_json() {
        println!("No comments in {name}");
        return Ok(());
    }
    render_list(&comments, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CommentsArgs,
    }

    #[test]
    fn file_and_from_conflict() {
        assert!(Wrapper::try_parse_from(["test", "--file", "a.json", "--from", "b.json"]).is_err());
    }

    #[test]
    fn no_flags_is_allowed() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.file.is_none());
        assert!(w.args.from.is_none());
    }

    #[test]
    fn comment_text_row() {
        let comment = Comment {
            id: "c1".into(),
            author: "Ann".into(),
            text: "hello".into(),
        };
        let mut buf = Vec::new();
        comment.render_table(&mut buf).expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "c1\tAnn\thello\n");
    }
}
