//! Local diagnostic export.
//!
//! Each recorded event becomes one pretty-printed JSON file in an export
//! directory, named like a browser download (`log.json`, `log (1).json`, ...).
//! Nothing is sent anywhere and nothing is appended to an existing file.

use serde_json::{Map, Value, json};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error};

const LOG_FILE_STEM: &str = "log";
const LOG_FILE_EXT: &str = "json";
const MAX_NAME_ATTEMPTS: usize = 10_000;

/// A diagnostic record: `{ "type": kind, ...payload }`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEvent {
    pub kind: String,
    /// Must be a JSON object; anything else is reported as a `logError`.
    pub payload: Value,
}

impl DiagnosticEvent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Flatten into the exported record.
    ///
    /// # Errors
    ///
    /// Returns a message when the payload is not a JSON object.
    pub fn to_record(&self) -> Result<Value, String> {
        let Value::Object(payload) = &self.payload else {
            return Err(format!(
                "diagnostic payload for '{}' must be a JSON object",
                self.kind
            ));
        };
        let mut record = Map::with_capacity(payload.len() + 1);
        record.insert("type".to_string(), Value::String(self.kind.clone()));
        for (key, value) in payload {
            if key != "type" {
                record.insert(key.clone(), value.clone());
            }
        }
        Ok(Value::Object(record))
    }

    /// The record written in place of an event that could not be exported.
    #[must_use]
    pub fn error_record(&self, message: &str) -> Value {
        json!({
            "type": "logError",
            "message": message,
            "data": self.payload,
        })
    }
}

/// Destination for diagnostic events. Recording never fails from the caller's
/// point of view.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: &DiagnosticEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}

/// Writes each event to its own file in `dir`.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_record(&self, record: &Value) -> Result<PathBuf, String> {
        let text = serde_json::to_string_pretty(record).map_err(|err| err.to_string())?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|err| format!("cannot create {}: {err}", self.dir.display()))?;
        for path in download_names(&self.dir) {
            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path);
            let mut file = match opened {
                Ok(file) => file,
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(format!("cannot create {}: {err}", path.display())),
            };
            file.write_all(text.as_bytes())
                .map_err(|err| format!("cannot write {}: {err}", path.display()))?;
            return Ok(path);
        }
        Err(format!("no free log file name in {}", self.dir.display()))
    }
}

impl TelemetrySink for FileSink {
    fn record(&self, event: &DiagnosticEvent) {
        let outcome = event
            .to_record()
            .and_then(|record| self.write_record(&record));
        match outcome {
            Ok(path) => debug!(kind = %event.kind, path = %path.display(), "diagnostic exported"),
            Err(message) => {
                if let Err(fallback_err) = self.write_record(&event.error_record(&message)) {
                    error!(
                        kind = %event.kind,
                        "diagnostic export failed: {message}; fallback also failed: {fallback_err}"
                    );
                }
            }
        }
    }
}

/// Keeps exported records in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Value>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<Value> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, event: &DiagnosticEvent) {
        let record = event
            .to_record()
            .unwrap_or_else(|message| event.error_record(&message));
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

/// `log.json`, then `log (1).json`, `log (2).json` and so on.
fn download_names(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    (0..MAX_NAME_ATTEMPTS).map(move |n| {
        let name = if n == 0 {
            format!("{LOG_FILE_STEM}.{LOG_FILE_EXT}")
        } else {
            format!("{LOG_FILE_STEM} ({n}).{LOG_FILE_EXT}")
        };
        dir.join(name)
    })
}
