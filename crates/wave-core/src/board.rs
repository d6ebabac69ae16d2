//! Presentation state for the post board.
//!
//! The board owns every piece of UI state: the displayed cards, each card's
//! summary state and locally added comments, the comments feed, and the
//! active data source. All mutation happens through methods called on the UI
//! thread; background work only produces inputs for those methods.
//!
//! # Card lifecycle
//!
//! ```text
//! Idle --begin_summarize--> Summarizing --ok--> Summarized
//!                                       \--err-> Failed
//! ```
//!
//! There is no way back to `Idle` short of reloading the collection.
//!
//! # Loads
//!
//! Every load is tagged with a generation. Only the completion of the most
//! recently started load is applied; older completions are dropped.

use crate::config::DataSource;
use crate::diagnostics::DiagnosticEvent;
use crate::error::WaveError;
use crate::fetch::Source;
use crate::model::{Comment, Post};
use crate::summarize::{FALLBACK_SUMMARY, SummarizeOutput};
use chrono::Utc;
use serde_json::json;

/// Summary state of one card.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SummaryState {
    #[default]
    Idle,
    Summarizing,
    Summarized(String),
    /// The flow failed; the card shows [`FALLBACK_SUMMARY`].
    Failed(String),
}

impl SummaryState {
    /// Text the card shows in its summary slot, if any.
    #[must_use]
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Summarizing => Some("Summarizing..."),
            Self::Summarized(summary) => Some(summary),
            Self::Failed(_) => Some(FALLBACK_SUMMARY),
        }
    }

    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Summarizing => "summarizing",
            Self::Summarized(_) => "summarized",
            Self::Failed(_) => "summarize-failed",
        }
    }
}

/// A displayed post plus its ephemeral UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub post: Post,
    /// Starts as the post's own comments; local additions are appended.
    pub comments: Vec<Comment>,
    pub summary: SummaryState,
}

impl PostCard {
    #[must_use]
    pub fn new(post: Post) -> Self {
        let comments = post.comments.clone();
        Self {
            post,
            comments,
            summary: SummaryState::Idle,
        }
    }

    /// Append a locally authored comment. Whitespace-only text is ignored.
    ///
    /// The id is `now_ms` rendered as a string, bumped until it differs from
    /// every id already on the card.
    pub fn add_comment_at(&mut self, author: &str, text: &str, now_ms: i64) -> Option<&Comment> {
        if text.trim().is_empty() {
            return None;
        }
        let mut candidate = now_ms;
        while self.comments.iter().any(|c| c.id == candidate.to_string()) {
            candidate += 1;
        }
        self.comments.push(Comment {
            id: candidate.to_string(),
            author: author.to_string(),
            text: text.to_string(),
        });
        self.comments.last()
    }

    /// Move `Idle -> Summarizing`. Returns `false` (no-op) in any other state.
    pub fn begin_summarize(&mut self) -> bool {
        if !self.summary.is_idle() {
            return false;
        }
        self.summary = SummaryState::Summarizing;
        true
    }

    /// Apply a flow result. Ignored unless the card is `Summarizing`.
    pub fn finish_summarize(&mut self, result: Result<SummarizeOutput, WaveError>) -> bool {
        if self.summary != SummaryState::Summarizing {
            return false;
        }
        self.summary = match result {
            Ok(output) => SummaryState::Summarized(output.summary),
            Err(err) => SummaryState::Failed(err.to_string()),
        };
        true
    }
}

/// State of the post collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loading,
    Ready,
    /// The last load failed; the message is shown with a retry hint.
    Failed(String),
}

/// A started load. Hand it to a worker and pass it back on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub kind: DataSource,
    pub source: Source,
}

impl LoadTicket {
    #[must_use]
    pub fn loaded_event(&self, posts: &[Post]) -> DiagnosticEvent {
        let comment_count: usize = posts.iter().map(|p| p.comments.len()).sum();
        DiagnosticEvent::new(
            "dataLoad",
            json!({
                "source": self.source.to_string(),
                "dataSource": self.kind.as_str(),
                "generation": self.generation,
                "posts": posts.len(),
                "comments": comment_count,
                "at": Utc::now().to_rfc3339(),
            }),
        )
    }

    #[must_use]
    pub fn failed_event(&self, err: &WaveError) -> DiagnosticEvent {
        DiagnosticEvent::new(
            "dataLoadFailed",
            json!({
                "source": self.source.to_string(),
                "dataSource": self.kind.as_str(),
                "generation": self.generation,
                "code": err.code().code(),
                "message": err.to_string(),
                "at": Utc::now().to_rfc3339(),
            }),
        )
    }
}

/// Event recorded when a comments document is loaded into the feed.
#[must_use]
pub fn comments_loaded_event(source: &str, comments: &[Comment]) -> DiagnosticEvent {
    DiagnosticEvent::new(
        "commentsLoad",
        json!({
            "source": source,
            "comments": comments.len(),
            "at": Utc::now().to_rfc3339(),
        }),
    )
}

/// A summarize request for a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizeJob {
    pub generation: u64,
    pub post_id: String,
    pub content: String,
}

/// What happened to a load completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// A newer load was started; the result was dropped.
    Stale,
}

/// All state behind the post board.
#[derive(Debug, Clone)]
pub struct Board {
    local: Source,
    remote: Source,
    kind: DataSource,
    generation: u64,
    load: LoadState,
    cards: Vec<PostCard>,
    feed: Vec<Comment>,
}

impl Board {
    #[must_use]
    pub const fn new(local: Source, remote: Source, initial: DataSource) -> Self {
        Self {
            local,
            remote,
            kind: initial,
            generation: 0,
            load: LoadState::NotLoaded,
            cards: Vec::new(),
            feed: Vec::new(),
        }
    }

    #[must_use]
    pub const fn data_source(&self) -> DataSource {
        self.kind
    }

    #[must_use]
    pub const fn source_for(&self, kind: DataSource) -> &Source {
        match kind {
            DataSource::Local => &self.local,
            DataSource::Remote => &self.remote,
        }
    }

    #[must_use]
    pub const fn active_source(&self) -> &Source {
        self.source_for(self.kind)
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `ticket` belongs to the most recently started load.
    #[must_use]
    pub const fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load
    }

    #[must_use]
    pub fn cards(&self) -> &[PostCard] {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, post_id: &str) -> Option<&PostCard> {
        self.cards.iter().find(|card| card.post.id == post_id)
    }

    fn card_mut(&mut self, post_id: &str) -> Option<&mut PostCard> {
        self.cards.iter_mut().find(|card| card.post.id == post_id)
    }

    #[must_use]
    pub fn feed(&self) -> &[Comment] {
        &self.feed
    }

    /// Start a load of the active source (initial load or retry).
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.load = LoadState::Loading;
        LoadTicket {
            generation: self.generation,
            kind: self.kind,
            source: self.active_source().clone(),
        }
    }

    /// Switch to the other source and start exactly one load against it.
    pub fn toggle_source(&mut self) -> LoadTicket {
        self.kind = self.kind.toggled();
        self.begin_load()
    }

    /// Apply a load result. Success replaces every card, discarding summaries
    /// and added comments. Failure clears the cards and records the error.
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<Post>, WaveError>,
    ) -> LoadOutcome {
        if !self.is_current(ticket) {
            return LoadOutcome::Stale;
        }
        match result {
            Ok(posts) => {
                self.cards = posts.into_iter().map(PostCard::new).collect();
                self.load = LoadState::Ready;
                LoadOutcome::Applied
            }
            Err(err) => {
                self.cards.clear();
                self.load = LoadState::Failed(err.to_string());
                LoadOutcome::Failed
            }
        }
    }

    /// Start summarizing a card. `None` if the card is missing or not idle.
    pub fn begin_summarize(&mut self, post_id: &str) -> Option<SummarizeJob> {
        let generation = self.generation;
        let card = self.card_mut(post_id)?;
        if !card.begin_summarize() {
            return None;
        }
        Some(SummarizeJob {
            generation,
            post_id: card.post.id.clone(),
            content: card.post.content.clone(),
        })
    }

    /// Apply a summarize result. Results for a replaced collection are dropped.
    pub fn finish_summarize(
        &mut self,
        job: &SummarizeJob,
        result: Result<SummarizeOutput, WaveError>,
    ) -> bool {
        if job.generation != self.generation {
            return false;
        }
        self.card_mut(&job.post_id)
            .is_some_and(|card| card.finish_summarize(result))
    }

    /// Append a local comment to a card. Returns the new comment's id.
    pub fn add_comment(&mut self, post_id: &str, author: &str, text: &str) -> Option<String> {
        self.add_comment_at(post_id, author, text, Utc::now().timestamp_millis())
    }

    pub fn add_comment_at(
        &mut self,
        post_id: &str,
        author: &str,
        text: &str,
        now_ms: i64,
    ) -> Option<String> {
        self.card_mut(post_id)?
            .add_comment_at(author, text, now_ms)
            .map(|comment| comment.id.clone())
    }

    /// Replace the comments feed wholesale.
    pub fn replace_feed(&mut self, comments: Vec<Comment>) {
        self.feed = comments;
    }
}
