#![forbid(unsafe_code)]
//! wave-core library.
//!
//! Post and comment model, document fetching, the summarization flow,
//! diagnostic export, configuration and the board presentation state.
//!
//! # Conventions
//!
//! - **Errors**: Fallible operations return [`error::WaveError`]; binaries wrap it in `anyhow`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod board;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fetch;
pub mod model;
pub mod summarize;

#[cfg(test)]
mod test_http;

pub use board::{Board, LoadOutcome, LoadState, LoadTicket, PostCard, SummarizeJob, SummaryState};
pub use config::{DataSource, EffectiveConfig, WaveConfig, resolve_config};
pub use error::{ErrorCode, WaveError};
pub use fetch::{Fetcher, Source};
pub use model::{Comment, Post};
pub use summarize::{FALLBACK_SUMMARY, SummarizeFlow, SummarizeInput, SummarizeOutput};
