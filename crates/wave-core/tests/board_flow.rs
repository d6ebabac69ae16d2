//! End-to-end board flow through the public API: fetch from disk, summarize,
//! comment, toggle sources and export diagnostics.

use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use wave_core::board::comments_loaded_event;
use wave_core::diagnostics::{FileSink, TelemetrySink};
use wave_core::fetch::read_comments_file;
use wave_core::summarize::{OutputShape, TextGenerator};
use wave_core::{
    Board, DataSource, FALLBACK_SUMMARY, Fetcher, LoadOutcome, LoadState, Source, SummarizeFlow,
    SummarizeInput, SummaryState, WaveError,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

struct Scripted(Result<Value, WaveError>);

impl TextGenerator for Scripted {
    fn generate_structured(&self, _prompt: &str, _shape: &OutputShape) -> Result<Value, WaveError> {
        self.0.clone()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn flow(reply: Result<Value, WaveError>) -> SummarizeFlow {
    SummarizeFlow::new(Arc::new(Scripted(reply)))
}

fn project() -> (TempDir, Board) {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("local.json"),
        r#"[{"id": "1", "title": "Sample Wave Post", "content": "This is a sample wave post content.",
             "comments": [{"id": "1", "author": "John Doe", "text": "Great post!"}]}]"#,
    )
    .expect("write local");
    fs::write(
        dir.path().join("remote.json"),
        r#"[{"id": "9", "title": "Remote", "content": "Elsewhere.",
             "comments": {"a": {"x": {"actor": {"displayName": "Ann"}, "object": {"content": "hey"}}}}}]"#,
    )
    .expect("write remote");
    let board = Board::new(
        Source::Path(dir.path().join("local.json")),
        Source::Path(dir.path().join("remote.json")),
        DataSource::Local,
    );
    (dir, board)
}

fn load(board: &mut Board, fetcher: &Fetcher) -> LoadOutcome {
    let ticket = board.begin_load();
    let result = fetcher.fetch_posts(&ticket.source);
    board.finish_load(&ticket, result)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn sample_post_scenario() {
    let (_dir, mut board) = project();
    let fetcher = Fetcher::default();
    assert_eq!(load(&mut board, &fetcher), LoadOutcome::Applied);

    let card = board.card("1").expect("card");
    assert_eq!(card.comments.len(), 1);
    assert_eq!(card.comments[0].author, "John Doe");
    assert_eq!(card.comments[0].text, "Great post!");

    let job = board.begin_summarize("1").expect("idle card");
    let output = flow(Ok(json!({"summary": "A sample post."})))
        .summarize(&SummarizeInput::new(job.content.clone()));
    assert!(board.finish_summarize(&job, output));
    assert_eq!(
        board.card("1").expect("card").summary,
        SummaryState::Summarized("A sample post.".into())
    );
}

#[test]
fn failed_generation_settles_on_fallback() {
    let (_dir, mut board) = project();
    load(&mut board, &Fetcher::default());

    let job = board.begin_summarize("1").expect("idle card");
    let output = flow(Ok(json!({"text": "wrong field"})))
        .summarize(&SummarizeInput::new(job.content.clone()));
    assert!(output.as_ref().is_err_and(WaveError::is_generation_failure));
    board.finish_summarize(&job, output);

    let summary = &board.card("1").expect("card").summary;
    assert!(matches!(summary, SummaryState::Failed(_)));
    assert_eq!(summary.display_text(), Some(FALLBACK_SUMMARY));
}

#[test]
fn toggle_round_trip_discards_local_edits() {
    let (_dir, mut board) = project();
    let fetcher = Fetcher::default();
    load(&mut board, &fetcher);
    board
        .add_comment("1", "CurrentUser", "Nice!")
        .expect("comment added");
    assert_eq!(board.card("1").expect("card").comments.len(), 2);

    let ticket = board.toggle_source();
    assert_eq!(ticket.kind, DataSource::Remote);
    let result = fetcher.fetch_posts(&ticket.source);
    board.finish_load(&ticket, result);
    assert_eq!(board.cards()[0].comments[0].author, "Ann");

    let ticket = board.toggle_source();
    let result = fetcher.fetch_posts(&ticket.source);
    board.finish_load(&ticket, result);
    assert_eq!(board.card("1").expect("card").comments.len(), 1);
}

#[test]
fn unreadable_source_fails_load_and_clears_cards() {
    let (dir, mut board) = project();
    let fetcher = Fetcher::default();
    load(&mut board, &fetcher);
    fs::remove_file(dir.path().join("remote.json")).expect("remove");

    let ticket = board.toggle_source();
    let result = fetcher.fetch_posts(&ticket.source);
    assert!(matches!(result, Err(WaveError::Fetch { .. })));
    assert_eq!(board.finish_load(&ticket, result), LoadOutcome::Failed);
    assert!(board.cards().is_empty());
    assert!(matches!(board.load_state(), LoadState::Failed(_)));
}

#[test]
fn comments_file_and_diagnostics_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("comments.json");
    fs::write(
        &path,
        r#"{"comments": {"c1": {"k": {"actor": {"displayName": "Bea"}, "object": {"content": "hello"}}}}}"#,
    )
    .expect("write comments");

    let comments = read_comments_file(&path).expect("comments");
    assert_eq!(comments[0].author, "Bea");

    let sink = FileSink::new(dir.path().join("diag"));
    sink.record(&comments_loaded_event("comments.json", &comments));
    sink.record(&comments_loaded_event("comments.json", &comments));

    let record: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("diag/log.json")).expect("log.json"),
    )
    .expect("record");
    assert_eq!(record["type"], "commentsLoad");
    assert_eq!(record["comments"], 1);
    assert!(dir.path().join("diag/log (1).json").exists());
}

#[test]
fn missing_comments_file_is_parse_failure() {
    let dir = TempDir::new().expect("tempdir");
    let err = read_comments_file(&dir.path().join("absent.json")).expect_err("missing file");
    assert!(matches!(err, WaveError::Parse { .. }));
}
