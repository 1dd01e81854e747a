use crate::core::config::SimulationConfig;
use crate::core::errors::{CrossingError, Result};
use crate::crossing::{spawn_worker, Class, Crossing, CrossingStats, Generator, TranscriptSink};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Summary of a finished simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// Transcript records successfully written
    pub records: u64,
    pub stats: CrossingStats,
}

/// Owns the shared crossing state for one run
pub struct Simulation {
    crossing: Arc<Crossing>,
    torn_down: AtomicBool,
}

impl Simulation {
    /// Validate the configuration and create every shared resource
    pub fn new(config: SimulationConfig, sink: impl TranscriptSink + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            crossing: Arc::new(Crossing::new(config, Box::new(sink))),
            torn_down: AtomicBool::new(false),
        })
    }

    pub fn crossing(&self) -> &Arc<Crossing> {
        &self.crossing
    }

    /// Run both generators to completion
    pub async fn run(&self) -> Result<SimulationReport> {
        let config = self.crossing.config();
        info!(
            total_persons = config.total_persons,
            pier_capacity = config.pier_capacity,
            "Starting simulation"
        );

        let mut generators = JoinSet::new();
        for class in Class::ALL {
            let generator = Generator::for_class(&self.crossing, class);
            spawn_worker(&mut generators, generator.run(self.crossing.clone()))?;
        }

        let mut outcome = Ok(());
        while let Some(joined) = generators.join_next().await {
            let result = joined.map_err(CrossingError::from).and_then(|result| result);
            if outcome.is_ok() {
                outcome = result;
            }
        }
        outcome?;

        let records = self.crossing.finish_transcript().await?;
        let stats = self.crossing.stats().await;
        info!(records, groups = stats.groups(), rejections = stats.rejections, "Simulation finished");

        Ok(SimulationReport { records, stats })
    }

    /// Release shared resources. Pending waits fail instead of hanging.
    /// Safe to call any number of times from any thread.
    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Tearing down simulation");
        self.crossing.close_signals();

        // Best effort: a worker may still hold the state lock
        if let Ok(mut state) = self.crossing.state.try_lock() {
            let _ = state.transcript_mut().flush();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.teardown();
    }
}
