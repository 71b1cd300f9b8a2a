//! Indexing progress reporting.
//!
//! Reports observable progress while files are chunked and upserted so
//! users see how much of a batch sequence is left. Progress is emitted
//! on **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event for indexing.
#[derive(Clone, Debug)]
pub enum IndexProgressEvent {
    /// A file has been split into chunks and is about to be stored.
    Chunked { file_id: String, chunks: u64 },
    /// Remote upsert phase: batch n of total for this file.
    Upserting {
        file_id: String,
        batch: u64,
        batches: u64,
    },
}

/// Reports indexing progress. Implementations write to stderr (human or
/// JSON).
pub trait IndexProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the indexing pipeline.
    fn report(&self, event: IndexProgressEvent);
}

/// Human-friendly progress on stderr: "index src/app.ts  upserting  2 / 4 batches".
pub struct StderrProgress;

impl IndexProgressReporter for StderrProgress {
    fn report(&self, event: IndexProgressEvent) {
        let line = match &event {
            IndexProgressEvent::Chunked { file_id, chunks } => {
                format!("index {}  {} chunks\n", file_id, format_number(*chunks))
            }
            IndexProgressEvent::Upserting {
                file_id,
                batch,
                batches,
            } => {
                format!(
                    "index {}  upserting  {} / {} batches\n",
                    file_id,
                    format_number(*batch),
                    format_number(*batches)
                )
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl IndexProgressReporter for JsonProgress {
    fn report(&self, event: IndexProgressEvent) {
        let obj = match &event {
            IndexProgressEvent::Chunked { file_id, chunks } => serde_json::json!({
                "event": "progress",
                "file": file_id,
                "phase": "chunked",
                "chunks": chunks
            }),
            IndexProgressEvent::Upserting {
                file_id,
                batch,
                batches,
            } => serde_json::json!({
                "event": "progress",
                "file": file_id,
                "phase": "upserting",
                "batch": batch,
                "batches": batches
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl IndexProgressReporter for NoProgress {
    fn report(&self, _event: IndexProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode. Caller can pass it to the engine.
    pub fn reporter(&self) -> Box<dyn IndexProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(1), "1");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }
}
