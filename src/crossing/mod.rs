//! River crossing protocol: pier admission, group formation, boarding and
//! exit ordering, and the generators that feed arrivals into it.

pub mod arrival;
pub mod boat;
pub mod formation;
pub mod generator;
pub mod pier;
pub mod state;
pub mod transcript;

pub use arrival::Arrival;
pub use formation::{assign_role, Composition, Role, CREW_SIZE, GROUP_SIZE};
pub use generator::Generator;
pub use pier::Admission;
pub use state::{Class, ClassCounts, Crossing, CrossingStats, SharedState};
pub use transcript::{
    Action, ActionRecord, FileTranscript, MemoryTranscript, PierSnapshot, TranscriptSink,
};

use crate::core::errors::{CrossingError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinSet};

/// Uniformly random duration in `[0, bound)`, zero when `bound` is zero
pub fn random_below(bound: Duration) -> Duration {
    let micros = u64::try_from(bound.as_micros()).unwrap_or(u64::MAX);
    if micros == 0 {
        return Duration::ZERO;
    }
    Duration::from_micros(fastrand::u64(0..micros))
}

/// Spawn a worker onto the current runtime
pub(crate) fn spawn_worker<F>(workers: &mut JoinSet<Result<()>>, task: F) -> Result<AbortHandle>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let handle = Handle::try_current()
        .map_err(|e| CrossingError::worker_creation("no runtime available for worker", e))?;
    Ok(workers.spawn_on(task, &handle))
}
