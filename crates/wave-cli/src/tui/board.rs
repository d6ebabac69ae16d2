//! TUI board view for wave.
//!
//! Provides a full-screen terminal UI with:
//! - Post list with a summary marker and comment count per card
//! - Right-side detail pane with the summary, content and comments
//! - Optional comments feed pane loaded from a comments document
//! - Key bindings: j/k navigate, enter open, s summarize, c comment, t toggle source,
//!   o open comments file, C feed pane, r reload, ? help, q quit

use super::editor::{EditAction, LineInput, TextArea, with_cursor};
use super::worker::{FeedRequest, Job, JobResult, Workers};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use wave_core::board::{LoadOutcome, LoadTicket, comments_loaded_event};
use wave_core::diagnostics::TelemetrySink;
use wave_core::{Board, Comment, LoadState, PostCard, Source, SummaryState};

const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Normal,
    /// Comment editor is open.
    Comment,
    /// Comments file path prompt is open.
    OpenFile,
    /// Blocking message, dismissed with Enter or Esc.
    Alert,
    /// Help overlay is open.
    Help,
}

/// Comment being written, bound to the post it was opened on.
struct CommentDraft {
    post_id: String,
    post_title: String,
    editor: TextArea,
}

/// Main application state for the board view.
pub struct BoardView {
    board: Board,
    workers: Workers,
    sink: Arc<dyn TelemetrySink>,
    /// Display name attached to comments added here.
    author: String,
    /// Relative comment file paths resolve against this directory.
    project_root: PathBuf,
    /// Selected row in `board.cards()`.
    table_state: TableState,
    input_mode: InputMode,
    comment_draft: Option<CommentDraft>,
    path_prompt: Option<LineInput>,
    alert: Option<String>,
    help_query: String,
    show_detail: bool,
    detail_scroll: u16,
    show_feed: bool,
    should_quit: bool,
    status_msg: Option<(String, Instant)>,
}

impl BoardView {
    pub fn new(
        board: Board,
        workers: Workers,
        sink: Arc<dyn TelemetrySink>,
        author: String,
        project_root: PathBuf,
    ) -> Self {
        Self {
            board,
            workers,
            sink,
            author,
            project_root,
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            comment_draft: None,
            path_prompt: None,
            alert: None,
            help_query: String::new(),
            show_detail: false,
            detail_scroll: 0,
            show_feed: false,
            should_quit: false,
            status_msg: None,
        }
    }

    /// Kick off the initial post load and, if configured, the comments feed.
    pub fn start(&mut self, comments: Option<Source>) {
        let ticket = self.board.begin_load();
        self.submit_load(ticket);
        if let Some(source) = comments {
            self.workers
                .submit(Job::LoadFeed(FeedRequest::Configured(source)));
        }
    }

    fn submit_load(&mut self, ticket: LoadTicket) {
        self.set_status(format!("Loading {} posts from {}", ticket.kind, ticket.source));
        self.workers.submit(Job::LoadPosts(ticket));
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    fn select_next(&mut self) {
        let len = self.board.cards().len();
        if len == 0 {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| (i + 1).min(len - 1));
        self.table_state.select(Some(i));
        self.detail_scroll = 0;
    }

    fn select_prev(&mut self) {
        if self.board.cards().is_empty() {
            return;
        }
        let i = self
            .table_state
            .selected()
            .map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(i));
        self.detail_scroll = 0;
    }

    fn select_first(&mut self) {
        if !self.board.cards().is_empty() {
            self.table_state.select(Some(0));
            self.detail_scroll = 0;
        }
    }

    fn select_last(&mut self) {
        let len = self.board.cards().len();
        if len > 0 {
            self.table_state.select(Some(len - 1));
            self.detail_scroll = 0;
        }
    }

    fn reset_selection(&mut self) {
        let first = (!self.board.cards().is_empty()).then_some(0);
        self.table_state.select(first);
        self.detail_scroll = 0;
    }

    /// Currently selected card (if any).
    pub fn selected_card(&self) -> Option<&PostCard> {
        self.table_state
            .selected()
            .and_then(|i| self.board.cards().get(i))
    }

    fn selected_post_id(&self) -> Option<String> {
        self.selected_card().map(|card| card.post.id.clone())
    }

    fn scroll_detail_by(&mut self, delta: i32) {
        let max = self
            .selected_card()
            .map_or(0, |card| detail_lines(card).len().saturating_sub(1));
        let max = i32::try_from(max).unwrap_or(i32::MAX);
        let next = (i32::from(self.detail_scroll) + delta).clamp(0, max);
        self.detail_scroll = u16::try_from(next).unwrap_or(u16::MAX);
    }

    // -----------------------------------------------------------------------
    // Keys
    // -----------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match self.input_mode {
            InputMode::Comment => self.handle_comment_key(key),
            InputMode::OpenFile => self.handle_open_file_key(key),
            InputMode::Alert => self.handle_alert_key(key),
            InputMode::Help => self.handle_help_key(key),
            InputMode::Normal => self.handle_normal_key(key, ctrl),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,

            KeyCode::Char('j') | KeyCode::Down => {
                if self.show_detail {
                    self.scroll_detail_by(1);
                } else {
                    self.select_next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.show_detail {
                    self.scroll_detail_by(-1);
                } else {
                    self.select_prev();
                }
            }
            KeyCode::Char('g') | KeyCode::Home => {
                if self.show_detail {
                    self.detail_scroll = 0;
                } else {
                    self.select_first();
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                if self.show_detail {
                    self.scroll_detail_by(i32::from(u16::MAX));
                } else {
                    self.select_last();
                }
            }

            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                if self.selected_card().is_some() {
                    self.show_detail = true;
                    self.detail_scroll = 0;
                }
            }
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Esc if self.show_detail => {
                self.show_detail = false;
                self.detail_scroll = 0;
            }

            KeyCode::Char('s') => self.summarize_selected(),

            KeyCode::Char('c') => {
                if let Some(card) = self.selected_card() {
                    self.comment_draft = Some(CommentDraft {
                        post_id: card.post.id.clone(),
                        post_title: card.post.title.clone(),
                        editor: TextArea::default(),
                    });
                    self.input_mode = InputMode::Comment;
                }
            }

            KeyCode::Char('t') => {
                let ticket = self.board.toggle_source();
                self.reset_selection();
                self.submit_load(ticket);
            }

            KeyCode::Char('r') => {
                let ticket = self.board.begin_load();
                self.submit_load(ticket);
            }

            KeyCode::Char('o') => {
                self.path_prompt = Some(LineInput::default());
                self.input_mode = InputMode::OpenFile;
            }

            KeyCode::Char('C') => {
                self.show_feed = !self.show_feed;
                self.set_status(format!(
                    "Comments feed {}",
                    if self.show_feed { "shown" } else { "hidden" }
                ));
            }

            KeyCode::Char('?') => {
                self.help_query.clear();
                self.input_mode = InputMode::Help;
            }

            _ => {}
        }
    }

    fn summarize_selected(&mut self) {
        let Some(post_id) = self.selected_post_id() else {
            return;
        };
        match self.board.begin_summarize(&post_id) {
            Some(job) => {
                info!(post_id = %job.post_id, "summarize requested");
                self.workers.submit(Job::Summarize(job));
            }
            None => {
                let label = self
                    .board
                    .card(&post_id)
                    .map_or("missing", |card| card.summary.label());
                self.set_status(format!("Post {post_id} is already {label}"));
            }
        }
    }

    fn handle_comment_key(&mut self, key: KeyEvent) {
        let Some(draft) = self.comment_draft.as_mut() else {
            self.input_mode = InputMode::Normal;
            return;
        };

        match draft.editor.handle_key(key) {
            EditAction::None => {}
            EditAction::Cancel => {
                self.comment_draft = None;
                self.input_mode = InputMode::Normal;
            }
            EditAction::Submit => {
                let text = draft.editor.text();
                let post_id = std::mem::take(&mut draft.post_id);
                self.comment_draft = None;
                self.input_mode = InputMode::Normal;

                match self.board.add_comment(&post_id, &self.author, &text) {
                    Some(id) => {
                        debug!(post_id = %post_id, comment_id = %id, "comment added");
                        self.set_status(format!("Comment added to post {post_id}"));
                    }
                    None => self.set_status("Empty comment ignored".to_string()),
                }
            }
        }
    }

    fn handle_open_file_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.path_prompt.as_mut() else {
            self.input_mode = InputMode::Normal;
            return;
        };

        match prompt.handle_key(key) {
            EditAction::None => {}
            EditAction::Cancel => {
                self.path_prompt = None;
                self.input_mode = InputMode::Normal;
            }
            EditAction::Submit => {
                let raw = prompt.value().trim().to_string();
                self.path_prompt = None;
                self.input_mode = InputMode::Normal;
                if raw.is_empty() {
                    return;
                }
                let path = PathBuf::from(&raw);
                let path = if path.is_relative() {
                    self.project_root.join(path)
                } else {
                    path
                };
                self.set_status(format!("Reading {}", path.display()));
                self.workers.submit(Job::LoadFeed(FeedRequest::File(path)));
            }
        }
    }

    fn handle_alert_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            self.alert = None;
            self.input_mode = InputMode::Normal;
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.help_query.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.help_query.pop();
            }
            KeyCode::Char(c) => {
                self.help_query.push(c);
            }
            _ => {}
        }
    }

    fn show_alert(&mut self, message: String) {
        self.alert = Some(message);
        self.comment_draft = None;
        self.path_prompt = None;
        self.input_mode = InputMode::Alert;
    }

    /// A load replaced the cards, so an open draft has lost its post.
    fn discard_draft(&mut self) {
        if let Some(draft) = &self.comment_draft {
            let message = format!(
                "Posts reloaded; the unsent comment on \"{}\" was discarded",
                draft.post_title
            );
            debug!(post_id = %draft.post_id, "discarding comment draft");
            self.show_alert(message);
        }
    }

    // -----------------------------------------------------------------------
    // Job results
    // -----------------------------------------------------------------------

    /// Apply every finished background job.
    pub fn tick(&mut self) {
        while let Some(result) = self.workers.try_recv() {
            self.apply(result);
        }
    }

    fn apply(&mut self, result: JobResult) {
        match result {
            JobResult::Posts { ticket, result } => {
                if !self.board.is_current(&ticket) {
                    debug!(generation = ticket.generation, "dropping stale load");
                    return;
                }
                match &result {
                    Ok(posts) => self.sink.record(&ticket.loaded_event(posts)),
                    Err(err) => self.sink.record(&ticket.failed_event(err)),
                }
                let outcome = self.board.finish_load(&ticket, result);
                if outcome != LoadOutcome::Stale {
                    self.discard_draft();
                }
                match outcome {
                    LoadOutcome::Applied => {
                        self.reset_selection();
                        self.set_status(format!(
                            "Loaded {} posts from {}",
                            self.board.cards().len(),
                            ticket.kind
                        ));
                    }
                    LoadOutcome::Failed => {
                        self.reset_selection();
                        self.show_detail = false;
                        self.set_status("Load failed: press r to retry".to_string());
                    }
                    LoadOutcome::Stale => {}
                }
            }
            JobResult::Summary { job, result } => {
                let failed = result.as_ref().err().map(ToString::to_string);
                if !self.board.finish_summarize(&job, result) {
                    debug!(post_id = %job.post_id, "summary no longer applies");
                    return;
                }
                match failed {
                    None => self.set_status(format!("Summary ready for post {}", job.post_id)),
                    Some(err) => self.set_status(format!("Summarize failed: {err}")),
                }
            }
            JobResult::Feed { request, result } => match result {
                Ok(comments) => {
                    let label = request.label();
                    self.sink.record(&comments_loaded_event(&label, &comments));
                    self.set_status(format!("Loaded {} comments from {label}", comments.len()));
                    self.board.replace_feed(comments);
                    self.show_feed = true;
                }
                Err(err) => match request {
                    FeedRequest::File(_) => {
                        self.show_alert(format!("Error parsing JSON file: {err}"));
                    }
                    FeedRequest::Configured(_) => {
                        self.set_status(format!("Comments feed unavailable: {err}"));
                    }
                },
            },
        }
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_msg = Some((msg, Instant::now()));
    }

    /// Returns true once the user asked to quit.
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Render the board into `area` within the given frame.
    pub fn render(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        render_into(frame, self, area);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

const fn summary_marker(state: &SummaryState) -> (&'static str, Color) {
    match state {
        SummaryState::Idle => ("·", Color::DarkGray),
        SummaryState::Summarizing => ("…", Color::Yellow),
        SummaryState::Summarized(_) => ("✓", Color::Green),
        SummaryState::Failed(_) => ("✗", Color::Red),
    }
}

fn build_row(card: &PostCard) -> Row<'static> {
    let (marker, color) = summary_marker(&card.summary);
    Row::new([Cell::from(Line::from(vec![
        Span::styled(format!("{marker} "), Style::default().fg(color)),
        Span::styled(
            card.post.title.clone(),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("  ({})", card.comments.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]))])
}

fn heading(text: impl Into<String>) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.into(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )])
}

fn summary_line(state: &SummaryState) -> Line<'static> {
    let label = Span::styled("Summary: ", Style::default().fg(Color::DarkGray));
    let value = match state {
        SummaryState::Idle => Span::styled(
            "press s to summarize",
            Style::default().fg(Color::DarkGray),
        ),
        SummaryState::Summarizing => Span::styled(
            "Summarizing...",
            Style::default().fg(Color::Yellow),
        ),
        SummaryState::Summarized(text) => Span::raw(text.clone()),
        SummaryState::Failed(_) => Span::styled(
            state.display_text().unwrap_or_default().to_string(),
            Style::default().fg(Color::Red),
        ),
    };
    Line::from(vec![label, value])
}

fn push_comments(lines: &mut Vec<Line<'static>>, comments: &[Comment]) {
    for comment in comments {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            comment.author.clone(),
            Style::default().fg(Color::Cyan),
        )]));
        for line in comment.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
    }
}

fn detail_lines(card: &PostCard) -> Vec<Line<'static>> {
    let mut lines = vec![heading(card.post.title.clone()), Line::from("")];
    lines.push(Line::from(vec![
        Span::styled("ID: ", Style::default().fg(Color::DarkGray)),
        Span::styled(card.post.id.clone(), Style::default().fg(Color::Cyan)),
    ]));
    lines.push(summary_line(&card.summary));
    lines.push(Line::from(""));
    for line in card.post.content.lines() {
        lines.push(Line::from(line.to_string()));
    }
    lines.push(Line::from(""));
    lines.push(heading(format!("Comments ({})", card.comments.len())));
    push_comments(&mut lines, &card.comments);
    lines
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let (border_color, title_color) = if focused {
        (Color::Green, Color::White)
    } else {
        (Color::DarkGray, Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_style(
            Style::default()
                .fg(title_color)
                .add_modifier(Modifier::BOLD),
        )
}

fn render_list_panel(frame: &mut ratatui::Frame<'_>, app: &mut BoardView, area: Rect) {
    let loading = matches!(app.board.load_state(), LoadState::Loading);
    let title = format!(
        " wave · {} · {} posts{} ",
        app.board.data_source(),
        app.board.cards().len(),
        if loading { " (loading)" } else { "" }
    );
    let block = panel_block(title, !app.show_detail);

    let dim = Style::default().fg(Color::DarkGray);
    let placeholder: Option<Vec<Line<'static>>> = match app.board.load_state() {
        LoadState::Failed(message) => Some(vec![
            Line::from(vec![Span::styled(
                "Could not load posts",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(message.clone()),
            Line::from(""),
            Line::from(vec![Span::styled("Press r to retry or t to switch source", dim)]),
        ]),
        _ if !app.board.cards().is_empty() => None,
        LoadState::Ready => Some(vec![Line::from(vec![Span::styled("No posts", dim)])]),
        LoadState::NotLoaded | LoadState::Loading => Some(vec![Line::from(vec![Span::styled(
            format!("Loading posts from {}...", app.board.active_source()),
            dim,
        )])]),
    };

    if let Some(lines) = placeholder {
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false }),
            area,
        );
        return;
    }

    let rows: Vec<Row<'static>> = app.board.cards().iter().map(build_row).collect();
    let table = Table::new(rows, [Constraint::Min(10)])
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(" ");
    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_detail_panel(frame: &mut ratatui::Frame<'_>, app: &BoardView, area: Rect) {
    let block = panel_block(" Post ".to_string(), true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(card) = app.selected_card() {
        frame.render_widget(
            Paragraph::new(detail_lines(card))
                .scroll((app.detail_scroll, 0))
                .wrap(Wrap { trim: false }),
            inner,
        );
    } else {
        frame.render_widget(
            Paragraph::new(Line::from(vec![Span::styled(
                "No post selected",
                Style::default().fg(Color::DarkGray),
            )])),
            inner,
        );
    }
}

fn render_feed_panel(frame: &mut ratatui::Frame<'_>, app: &BoardView, area: Rect) {
    let feed = app.board.feed();
    let block = panel_block(format!(" Comments feed ({}) ", feed.len()), false);
    let mut lines: Vec<Line<'static>> = Vec::new();
    if feed.is_empty() {
        lines.push(Line::from(vec![Span::styled(
            "No comments loaded. Press o to open a file.",
            Style::default().fg(Color::DarkGray),
        )]));
    } else {
        push_comments(&mut lines, feed);
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn centered(area: Rect, max_width: u16, max_height: u16) -> Rect {
    let width = area.width.saturating_sub(8).min(max_width);
    let height = area.height.saturating_sub(6).min(max_height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn key_hints(pairs: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, desc) in pairs {
        spans.push(Span::styled((*key).to_string(), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {desc}  "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn render_comment_modal(frame: &mut ratatui::Frame<'_>, app: &BoardView, area: Rect) {
    let Some(draft) = app.comment_draft.as_ref() else {
        return;
    };
    let modal_area = centered(area, 96, 20);
    frame.render_widget(Clear, modal_area);

    let title = format!(" Comment on {} ", draft.post_title);
    let block = panel_block(title, true);
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Line::from(vec![Span::styled(
            format!("Posting as {}", app.author),
            Style::default().fg(Color::DarkGray),
        )])),
        chunks[0],
    );

    let lines: Vec<Line<'static>> = draft
        .editor
        .display_lines()
        .into_iter()
        .map(Line::from)
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Text "),
        ),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(key_hints(&[("Ctrl+S", "submit"), ("Esc", "cancel")])),
        chunks[2],
    );
}

fn render_open_file_prompt(frame: &mut ratatui::Frame<'_>, app: &BoardView, area: Rect) {
    let Some(prompt) = app.path_prompt.as_ref() else {
        return;
    };
    let modal_area = centered(area, 80, 5);
    frame.render_widget(Clear, modal_area);
    let block = panel_block(" Open comments file ".to_string(), true);
    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    let lines = vec![
        Line::from(vec![
            Span::styled("Path: ", Style::default().fg(Color::DarkGray)),
            Span::styled(prompt.display(), Style::default().fg(Color::White)),
        ]),
        key_hints(&[("Enter", "open"), ("Esc", "cancel")]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_alert(frame: &mut ratatui::Frame<'_>, app: &BoardView, area: Rect) {
    let Some(message) = app.alert.as_ref() else {
        return;
    };
    let modal_area = centered(area, 72, 8);
    frame.render_widget(Clear, modal_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ")
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
    let lines = vec![
        Line::from(message.clone()),
        Line::from(""),
        key_hints(&[("Enter", "dismiss")]),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        modal_area,
    );
}

fn help_hotkeys() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("j/k", "list", "move selection"),
        ("g/G", "list", "first/last post"),
        ("enter/l", "list", "open post detail"),
        ("s", "global", "summarize selected post"),
        ("c", "global", "comment on selected post"),
        ("t", "global", "toggle local/remote source"),
        ("r", "global", "reload current source"),
        ("o", "global", "open comments file"),
        ("C", "global", "show/hide comments feed"),
        ("?", "global", "open help overlay"),
        ("q", "global", "quit tui"),
        ("j/k", "detail", "scroll detail pane"),
        ("h/esc", "detail", "close detail pane"),
        ("Ctrl+S", "comment", "submit comment"),
        ("Esc", "comment", "cancel comment"),
        ("Enter", "open", "read comments file"),
    ]
}

fn render_help_overlay(frame: &mut ratatui::Frame<'_>, app: &BoardView, area: Rect) {
    let popup = centered(area, 80, 24);
    frame.render_widget(Clear, popup);
    let block = panel_block(" Hotkeys ".to_string(), true);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let query = app.help_query.to_ascii_lowercase();
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(vec![
            Span::styled("Filter: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                with_cursor(&app.help_query, app.help_query.chars().count()),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(""),
    ];
    let before = lines.len();
    lines.extend(
        help_hotkeys()
            .into_iter()
            .filter(|(key, ctx, desc)| {
                query.is_empty()
                    || key.to_ascii_lowercase().contains(&query)
                    || ctx.contains(&query)
                    || desc.contains(&query)
            })
            .map(|(key, ctx, desc)| {
                Line::from(vec![
                    Span::styled(format!("{key:10}"), Style::default().fg(Color::Cyan)),
                    Span::styled(format!("{ctx:8}"), Style::default().fg(Color::Cyan)),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }),
    );
    if lines.len() == before {
        lines.push(Line::from(vec![Span::styled(
            "No hotkeys match the current filter",
            Style::default().fg(Color::DarkGray),
        )]));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the board into a specific area of the frame.
fn render_into(frame: &mut ratatui::Frame<'_>, app: &mut BoardView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    let (content_area, status_area) = (chunks[0], chunks[1]);

    let (main_area, feed_area) = if app.show_feed {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(content_area);
        (split[0], Some(split[1]))
    } else {
        (content_area, None)
    };

    if app.show_detail {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(main_area);
        render_list_panel(frame, app, split[0]);
        render_detail_panel(frame, app, split[1]);
    } else {
        render_list_panel(frame, app, main_area);
    }

    if let Some(feed_area) = feed_area {
        render_feed_panel(frame, app, feed_area);
    }

    let status_text = build_status_bar(app, status_area.width);
    frame.render_widget(
        Paragraph::new(status_text).alignment(Alignment::Left),
        status_area,
    );

    match app.input_mode {
        InputMode::Comment => render_comment_modal(frame, app, area),
        InputMode::OpenFile => render_open_file_prompt(frame, app, area),
        InputMode::Alert => render_alert(frame, app, area),
        InputMode::Help => render_help_overlay(frame, app, area),
        InputMode::Normal => {}
    }
}

/// Build the status bar line: a recent status message, or key hints.
fn build_status_bar(app: &BoardView, width: u16) -> Line<'static> {
    if let Some((ref msg, at)) = app.status_msg
        && at.elapsed() < STATUS_TTL
    {
        return Line::from(vec![Span::styled(
            msg.clone(),
            Style::default().fg(Color::Cyan),
        )]);
    }

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Comment => &[("CTRL+S", "submit comment"), ("ESC", "cancel")],
        InputMode::OpenFile => &[("ENTER", "open"), ("ESC", "cancel")],
        InputMode::Alert => &[("ENTER", "dismiss")],
        InputMode::Help => &[("TYPE", "search keys"), ("ESC", "close help")],
        InputMode::Normal if app.show_detail => &[
            ("j/k", "scroll"),
            ("h/esc", "close"),
            ("s", "summarize"),
            ("c", "comment"),
            ("?", "help"),
            ("q", "quit"),
        ],
        InputMode::Normal => &[
            ("j/k", "nav"),
            ("enter", "open"),
            ("s", "summarize"),
            ("c", "comment"),
            ("t", "toggle source"),
            ("o", "open comments"),
            ("?", "help"),
            ("q", "quit"),
        ],
    };
    let mut spans = key_hints(hints).spans;

    let version = format!("wave {}", env!("CARGO_PKG_VERSION"));
    let left_len: usize = spans.iter().map(|span| span.content.chars().count()).sum();
    let right_len = version.chars().count();
    let width = usize::from(width);
    if width > left_len + right_len + 1 {
        spans.push(Span::raw(" ".repeat(width - left_len - right_len)));
    } else {
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(version, Style::default().fg(Color::DarkGray)));

    Line::from(spans)
}
