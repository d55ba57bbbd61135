//! Sweep journal — JSONL record of everything a sweep did.
//!
//! Each build, run, skip, and failure is appended to
//! `<results_dir>/sweep-journal.jsonl` as one JSON object per line. The
//! journal is the durable record of a sweep: progress markers on stdout
//! disappear with the terminal, the journal stays next to the result files
//! it describes.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SweepError;

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS`.
pub fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// SweepEvent
// ---------------------------------------------------------------------------

/// One thing that happened during a sweep. Indices are 1-based, matching
/// the progress markers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SweepEvent {
    SweepStarted {
        target: String,
        total_points: usize,
    },
    PointStarted {
        index: usize,
        total: usize,
        local_ws: u64,
        global_ws: u64,
    },
    BuildFinished {
        index: usize,
        artifact: String,
        duration_ms: u64,
    },
    PointCompleted {
        index: usize,
        result_file: String,
        duration_ms: u64,
    },
    PointFailed {
        index: usize,
        phase: String,
        detail: String,
    },
    PointSkipped {
        index: usize,
        result_file: String,
    },
    SweepFinished {
        target: String,
        completed: usize,
        failed: usize,
        skipped: usize,
        aborted: bool,
    },
}

impl fmt::Display for SweepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepEvent::SweepStarted {
                target,
                total_points,
            } => {
                write!(f, "sweep started: {} ({} points)", target, total_points)
            }
            SweepEvent::PointStarted {
                index,
                total,
                local_ws,
                global_ws,
            } => {
                write!(
                    f,
                    "point {}/{} started: ({}, {})",
                    index, total, local_ws, global_ws
                )
            }
            SweepEvent::BuildFinished {
                index,
                artifact,
                duration_ms,
            } => {
                write!(f, "point {} built: {} ({} ms)", index, artifact, duration_ms)
            }
            SweepEvent::PointCompleted {
                index,
                result_file,
                duration_ms,
            } => {
                write!(
                    f,
                    "point {} completed: {} ({} ms)",
                    index, result_file, duration_ms
                )
            }
            SweepEvent::PointFailed {
                index,
                phase,
                detail,
            } => {
                write!(f, "point {} failed in {}: {}", index, phase, detail)
            }
            SweepEvent::PointSkipped { index, result_file } => {
                write!(f, "point {} skipped: {} exists", index, result_file)
            }
            SweepEvent::SweepFinished {
                target,
                completed,
                failed,
                skipped,
                aborted,
            } => {
                write!(
                    f,
                    "sweep finished: {} ({} completed, {} failed, {} skipped{})",
                    target,
                    completed,
                    failed,
                    skipped,
                    if *aborted { ", aborted" } else { "" }
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// JournalRecord / Journal
// ---------------------------------------------------------------------------

/// One journal line: when it happened, twice (machine and human form), and
/// what happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalRecord {
    pub timestamp_ms: u64,
    pub stamp: String,
    pub event: SweepEvent,
}

/// Append-only JSONL journal at a fixed path.
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: PathBuf) -> Self {
        Journal { path }
    }

    /// Standard journal path inside a results directory.
    pub fn in_results_dir(results_dir: &Path) -> Self {
        Journal {
            path: results_dir.join("sweep-journal.jsonl"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event, stamped with the current time. Creates parent
    /// directories if they don't exist.
    pub fn record(&self, event: SweepEvent) -> Result<(), SweepError> {
        let record = JournalRecord {
            timestamp_ms: now_ms(),
            stamp: now_stamp(),
            event,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Load all records. Skips blank and malformed lines (printing a warning
    /// to stderr for malformed ones, which a crash mid-write can leave
    /// behind). Returns an empty vec if the file doesn't exist.
    pub fn load(&self) -> Result<Vec<JournalRecord>, SweepError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        let mut records = Vec::new();
        for (i, line) in data.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    eprintln!(
                        "warning: skipping malformed journal line {} in {}: {}",
                        i + 1,
                        self.path.display(),
                        e
                    );
                }
            }
        }
        Ok(records)
    }

    /// The last `n` records.
    pub fn tail(&self, n: usize) -> Result<Vec<JournalRecord>, SweepError> {
        let mut records = self.load()?;
        if records.len() > n {
            records.drain(..records.len() - n);
        }
        Ok(records)
    }
}
