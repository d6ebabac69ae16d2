//! Background jobs for the board view.
//!
//! Each job runs on its own thread and reports back over a channel that the
//! view drains on every tick. Jobs are never cancelled; the board decides
//! whether a late result still applies.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, warn};
use wave_core::board::{LoadTicket, SummarizeJob};
use wave_core::fetch::read_comments_file;
use wave_core::{
    Comment, Fetcher, Post, Source, SummarizeFlow, SummarizeInput, SummarizeOutput, WaveError,
};

/// Where a comments feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedRequest {
    /// A file picked by the user. Failures are shown as an alert.
    File(PathBuf),
    /// The configured comments document.
    Configured(Source),
}

impl FeedRequest {
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Configured(source) => source.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum Job {
    LoadPosts(LoadTicket),
    Summarize(SummarizeJob),
    LoadFeed(FeedRequest),
}

#[derive(Debug)]
pub enum JobResult {
    Posts {
        ticket: LoadTicket,
        result: Result<Vec<Post>, WaveError>,
    },
    Summary {
        job: SummarizeJob,
        result: Result<SummarizeOutput, WaveError>,
    },
    Feed {
        request: FeedRequest,
        result: Result<Vec<Comment>, WaveError>,
    },
}

/// Everything a job needs, cheap to clone into a thread.
#[derive(Debug, Clone)]
struct JobContext {
    fetcher: Fetcher,
    flow: Result<SummarizeFlow, WaveError>,
}

impl JobContext {
    fn run(&self, job: Job) -> JobResult {
        match job {
            Job::LoadPosts(ticket) => {
                let result = self.fetcher.fetch_posts(&ticket.source);
                JobResult::Posts { ticket, result }
            }
            Job::Summarize(job) => {
                let result = match &self.flow {
                    Ok(flow) => flow.summarize(&SummarizeInput::new(job.content.clone())),
                    Err(err) => Err(err.clone()),
                };
                JobResult::Summary { job, result }
            }
            Job::LoadFeed(request) => {
                let result = match &request {
                    FeedRequest::File(path) => read_comments_file(path),
                    FeedRequest::Configured(source) => self.fetcher.fetch_comments(source),
                };
                JobResult::Feed { request, result }
            }
        }
    }
}

/// Job runner owned by the view.
pub struct Workers {
    context: JobContext,
    tx: Sender<JobResult>,
    rx: Receiver<JobResult>,
    inline: bool,
}

impl Workers {
    pub fn new(fetcher: Fetcher, flow: Result<SummarizeFlow, WaveError>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            context: JobContext { fetcher, flow },
            tx,
            rx,
            inline: false,
        }
    }

    /// Run jobs on the calling thread. Results still arrive through [`Workers::try_recv`].
    #[cfg(test)]
    pub fn inline(fetcher: Fetcher, flow: Result<SummarizeFlow, WaveError>) -> Self {
        Self {
            inline: true,
            ..Self::new(fetcher, flow)
        }
    }

    pub fn submit(&self, job: Job) {
        debug!(?job, "submitting job");
        if self.inline {
            if self.tx.send(self.context.run(job)).is_err() {
                warn!("job result dropped");
            }
            return;
        }
        let context = self.context.clone();
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name("wave-job".to_string())
            .spawn(move || {
                let result = context.run(job);
                if tx.send(result).is_err() {
                    debug!("board closed before job finished");
                }
            });
        if let Err(err) = spawned {
            warn!("could not spawn job thread: {err}");
        }
    }

    /// Next finished job, if any. Never blocks.
    pub fn try_recv(&self) -> Option<JobResult> {
        self.rx.try_recv().ok()
    }
}
