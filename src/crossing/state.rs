use crate::core::config::SimulationConfig;
use crate::core::errors::{CrossingError, Result, SignalKind};
use crate::core::signal::Signal;
use crate::crossing::arrival::Arrival;
use crate::crossing::formation::Composition;
use crate::crossing::transcript::{Action, ActionRecord, PierSnapshot, Transcript, TranscriptSink};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use tokio::sync::Mutex;
use tracing::debug;

/// The two populations crossing the river
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    Hacker,
    Serf,
}

impl Class {
    pub const ALL: [Class; 2] = [Class::Hacker, Class::Serf];

    /// Tag used in transcript lines
    pub fn tag(self) -> &'static str {
        match self {
            Class::Hacker => "HACK",
            Class::Serf => "SERF",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "HACK" => Some(Class::Hacker),
            "SERF" => Some(Class::Serf),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Class::Hacker => Class::Serf,
            Class::Serf => Class::Hacker,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A pair of per-class counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    hackers: usize,
    serfs: usize,
}

impl ClassCounts {
    pub fn new(hackers: usize, serfs: usize) -> Self {
        Self { hackers, serfs }
    }

    pub fn total(&self) -> usize {
        self.hackers + self.serfs
    }
}

impl Index<Class> for ClassCounts {
    type Output = usize;

    fn index(&self, class: Class) -> &usize {
        match class {
            Class::Hacker => &self.hackers,
            Class::Serf => &self.serfs,
        }
    }
}

impl IndexMut<Class> for ClassCounts {
    fn index_mut(&mut self, class: Class) -> &mut usize {
        match class {
            Class::Hacker => &mut self.hackers,
            Class::Serf => &mut self.serfs,
        }
    }
}

/// Running totals reported once the simulation finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingStats {
    pub same_class_groups: usize,
    pub mixed_groups: usize,
    pub rejections: usize,
}

impl CrossingStats {
    pub fn groups(&self) -> usize {
        self.same_class_groups + self.mixed_groups
    }

    pub(crate) fn record_group(&mut self, composition: Composition) {
        match composition {
            Composition::SameClass(_) => self.same_class_groups += 1,
            Composition::Mixed => self.mixed_groups += 1,
        }
    }
}

/// Everything guarded by the state lock.
///
/// Every counter update and the transcript line describing it happen in the
/// same critical section.
pub struct SharedState {
    /// Admitted and not yet boarded
    pub(crate) pier: ClassCounts,
    /// Admitted and not yet assigned to a boarding group
    pub(crate) unassigned: ClassCounts,
    /// Crew members aboard the current group
    pub(crate) onboard: usize,
    /// Crew members of the current group that have disembarked
    pub(crate) exited: usize,
    pub(crate) stats: CrossingStats,
    transcript: Transcript,
}

impl SharedState {
    pub(crate) fn new(sink: Box<dyn TranscriptSink>) -> Self {
        Self {
            pier: ClassCounts::default(),
            unassigned: ClassCounts::default(),
            onboard: 0,
            exited: 0,
            stats: CrossingStats::default(),
            transcript: Transcript::new(sink),
        }
    }

    pub fn snapshot(&self) -> PierSnapshot {
        PierSnapshot {
            hackers: self.pier[Class::Hacker],
            serfs: self.pier[Class::Serf],
        }
    }

    /// Append a record for `arrival`, returning its sequence number
    pub(crate) fn emit(&mut self, arrival: &Arrival, action: Action) -> u64 {
        let snapshot = action.carries_snapshot().then(|| self.snapshot());
        let record = ActionRecord {
            seq: self.transcript.next_seq(),
            class: arrival.class,
            id: arrival.id,
            action,
            snapshot,
        };
        debug!(seq = record.seq, arrival = %arrival, action = %action, "{}", record);
        self.transcript.append(&record)
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }
}

/// Shared handle passed to every worker: the state lock, the formation
/// lock and the counting signals that pass turns between workers.
pub struct Crossing {
    pub(crate) config: SimulationConfig,
    pub(crate) state: Mutex<SharedState>,
    /// Held by a captain from boarding until its own exit record
    pub(crate) formation: Mutex<()>,
    pub(crate) hacker_permits: Signal,
    pub(crate) serf_permits: Signal,
    pub(crate) onboard_complete: Signal,
    pub(crate) cruise_finished: Signal,
    pub(crate) captain_last: Signal,
}

impl Crossing {
    pub fn new(config: SimulationConfig, sink: Box<dyn TranscriptSink>) -> Self {
        Self {
            config,
            state: Mutex::new(SharedState::new(sink)),
            formation: Mutex::new(()),
            hacker_permits: Signal::new(SignalKind::HackerPermit),
            serf_permits: Signal::new(SignalKind::SerfPermit),
            onboard_complete: Signal::new(SignalKind::OnboardComplete),
            cruise_finished: Signal::new(SignalKind::CruiseFinished),
            captain_last: Signal::new(SignalKind::CaptainLast),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub(crate) fn permits(&self, class: Class) -> &Signal {
        match class {
            Class::Hacker => &self.hacker_permits,
            Class::Serf => &self.serf_permits,
        }
    }

    fn signals(&self) -> [&Signal; 5] {
        [
            &self.hacker_permits,
            &self.serf_permits,
            &self.onboard_complete,
            &self.cruise_finished,
            &self.captain_last,
        ]
    }

    /// Fail every pending and future wait. Safe to call repeatedly.
    pub(crate) fn close_signals(&self) {
        for signal in self.signals() {
            signal.close();
        }
    }

    pub async fn snapshot(&self) -> PierSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn stats(&self) -> CrossingStats {
        self.state.lock().await.stats
    }

    /// Flush the transcript and surface the first write failure, if any
    pub(crate) async fn finish_transcript(&self) -> Result<u64> {
        let mut state = self.state.lock().await;
        let transcript = state.transcript_mut();
        transcript
            .flush()
            .map_err(|e| CrossingError::transcript("flush transcript", e))?;
        transcript.take_error()?;
        Ok(transcript.written())
    }
}
