//! Loading post and comment documents from URLs or local files.

use crate::error::WaveError;
use crate::model::{self, Comment, CommentsDocument, Post};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("wave/", env!("CARGO_PKG_VERSION"));

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `http://` or `https://` URL.
    Url(String),
    /// Local file path (also used for `file://` URLs).
    Path(PathBuf),
}

impl Source {
    /// Classify a source string. Only the `http(s)://` and `file://` prefixes
    /// are recognized; everything else is treated as a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else if let Some(path) = trimmed.strip_prefix("file://") {
            Self::Path(PathBuf::from(path))
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    /// Resolve relative paths against `base`. URLs are returned unchanged.
    #[must_use]
    pub fn resolve(self, base: &Path) -> Self {
        match self {
            Self::Path(path) if path.is_relative() => Self::Path(base.join(path)),
            other => other,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Blocking document loader shared by the CLI commands and TUI workers.
#[derive(Debug, Clone)]
pub struct Fetcher {
    agent: ureq::Agent,
}

impl Fetcher {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }

    /// Read the raw body of a source.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::Fetch`] on network failure, non-2xx status or an
    /// unreadable file.
    pub fn fetch_text(&self, source: &Source) -> Result<String, WaveError> {
        let name = source.to_string();
        debug!(source = %name, "fetching document");
        match source {
            Source::Url(url) => {
                let response = self
                    .agent
                    .get(url)
                    .set("Accept", "application/json")
                    .call()
                    .map_err(|err| WaveError::fetch(&name, describe_ureq_error(err)))?;
                response
                    .into_string()
                    .map_err(|err| WaveError::fetch(&name, err))
            }
            Source::Path(path) => {
                std::fs::read_to_string(path).map_err(|err| WaveError::fetch(&name, err))
            }
        }
    }

    /// Load the post collection from `source`.
    ///
    /// # Errors
    ///
    /// [`WaveError::Fetch`] when the document cannot be loaded,
    /// [`WaveError::Parse`] when it is not a post array,
    /// [`WaveError::Validation`] on duplicate post ids.
    pub fn fetch_posts(&self, source: &Source) -> Result<Vec<Post>, WaveError> {
        let body = self.fetch_text(source)?;
        model::parse_posts(&source.to_string(), &body)
    }

    /// Load the raw comments document from `source`.
    ///
    /// # Errors
    ///
    /// [`WaveError::Fetch`] or [`WaveError::Parse`].
    pub fn fetch_comments_document(&self, source: &Source) -> Result<CommentsDocument, WaveError> {
        let body = self.fetch_text(source)?;
        model::parse_comments_document(&source.to_string(), &body)
    }

    /// Load a comments document from `source` and unwrap it into canonical comments.
    ///
    /// # Errors
    ///
    /// [`WaveError::Fetch`] or [`WaveError::Parse`].
    pub fn fetch_comments(&self, source: &Source) -> Result<Vec<Comment>, WaveError> {
        self.fetch_comments_document(source)?
            .to_comments()
            .map_err(|err| WaveError::parse(source.to_string(), err))
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Read a user-selected comments file. Every failure, including an
/// unreadable file, is reported as a parse failure so the caller can show a
/// single alert.
///
/// # Errors
///
/// Returns [`WaveError::Parse`].
pub fn read_comments_file(path: &Path) -> Result<Vec<Comment>, WaveError> {
    let name = path.display().to_string();
    let body = std::fs::read_to_string(path).map_err(|err| WaveError::parse(&name, err))?;
    model::parse_comments(&name, &body)
}

fn describe_ureq_error(err: ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, response) => {
            format!("HTTP {code} {}", response.status_text())
        }
        ureq::Error::Transport(transport) => transport.to_string(),
    }
}
