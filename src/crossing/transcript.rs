//! Ordered, attributed record of every action taken during a simulation.
//!
//! Records are numbered from 1 with no gaps. Numbering and writing happen
//! while the state lock is held, so the order of the transcript is a valid
//! linearization of all worker actions.

use crate::core::errors::{CrossingError, Result};
use crate::crossing::state::Class;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Action keywords written to the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Starts,
    Waits,
    LeavesQueue,
    IsBack,
    Boards,
    CaptainExits,
    MemberExits,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Starts,
        Action::Waits,
        Action::LeavesQueue,
        Action::IsBack,
        Action::Boards,
        Action::CaptainExits,
        Action::MemberExits,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Action::Starts => "starts",
            Action::Waits => "waits",
            Action::LeavesQueue => "leaves queue",
            Action::IsBack => "is back",
            Action::Boards => "boards",
            Action::CaptainExits => "captain exits",
            Action::MemberExits => "member exits",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.keyword() == keyword)
    }

    /// `starts` and `is back` are written without pier counts
    pub fn carries_snapshot(self) -> bool {
        !matches!(self, Action::Starts | Action::IsBack)
    }

    pub fn is_exit(self) -> bool {
        matches!(self, Action::CaptainExits | Action::MemberExits)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Pier occupancy at the time a record was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PierSnapshot {
    pub hackers: usize,
    pub serfs: usize,
}

impl PierSnapshot {
    pub fn total(&self) -> usize {
        self.hackers + self.serfs
    }
}

/// One transcript line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seq: u64,
    pub class: Class,
    pub id: u32,
    pub action: Action,
    pub snapshot: Option<PierSnapshot>,
}

impl ActionRecord {
    /// Parse a line produced by the `Display` implementation
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.trim_end().split(": ");
        let seq = fields.next()?.parse().ok()?;
        let (tag, id) = fields.next()?.split_once(' ')?;
        let class = Class::from_tag(tag)?;
        let id = id.parse().ok()?;
        let action = Action::from_keyword(fields.next()?)?;

        let snapshot = match (fields.next(), fields.next()) {
            (Some(hackers), Some(serfs)) => Some(PierSnapshot {
                hackers: hackers.parse().ok()?,
                serfs: serfs.parse().ok()?,
            }),
            (None, None) => None,
            _ => return None,
        };
        if fields.next().is_some() || snapshot.is_some() != action.carries_snapshot() {
            return None;
        }

        Some(Self {
            seq,
            class,
            id,
            action,
            snapshot,
        })
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}: {}", self.seq, self.class, self.id, self.action)?;
        if let Some(snapshot) = self.snapshot {
            write!(f, ": {}: {}", snapshot.hackers, snapshot.serfs)?;
        }
        Ok(())
    }
}

/// Destination for transcript records
pub trait TranscriptSink: Send {
    fn write_record(&mut self, record: &ActionRecord) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one line per record to a file, flushing after every line
pub struct FileTranscript {
    writer: LineWriter<File>,
}

impl FileTranscript {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            CrossingError::transcript(format!("create {}", path.display()), e)
        })?;
        Ok(Self {
            writer: LineWriter::new(file),
        })
    }
}

impl TranscriptSink for FileTranscript {
    fn write_record(&mut self, record: &ActionRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", record)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Keeps records in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryTranscript {
    records: Arc<Mutex<Vec<ActionRecord>>>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ActionRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records().iter().map(ToString::to_string).collect()
    }
}

impl TranscriptSink for MemoryTranscript {
    fn write_record(&mut self, record: &ActionRecord) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        Ok(())
    }
}

/// Sequence counter and sink, owned by the shared state
pub(crate) struct Transcript {
    sink: Box<dyn TranscriptSink>,
    next_seq: u64,
    written: u64,
    first_error: Option<io::Error>,
}

impl Transcript {
    pub(crate) fn new(sink: Box<dyn TranscriptSink>) -> Self {
        Self {
            sink,
            next_seq: 1,
            written: 0,
            first_error: None,
        }
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Write `record` and advance the counter. A failed write still consumes
    /// its sequence number; the first failure is kept for the final report.
    pub(crate) fn append(&mut self, record: &ActionRecord) -> u64 {
        debug_assert_eq!(record.seq, self.next_seq);
        self.next_seq += 1;
        match self.sink.write_record(record) {
            Ok(()) => self.written += 1,
            Err(e) => {
                warn!(seq = record.seq, error = %e, "Failed to write transcript record");
                self.first_error.get_or_insert(e);
            }
        }
        record.seq
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    pub(crate) fn written(&self) -> u64 {
        self.written
    }

    pub(crate) fn take_error(&mut self) -> Result<()> {
        match self.first_error.take() {
            Some(e) => Err(CrossingError::transcript("write transcript record", e)),
            None => Ok(()),
        }
    }
}
