//! # River Crossing
//!
//! Two populations, hackers and serfs, share one boat that carries exactly
//! four. A boat leaves only with four of one class or two of each, one of the
//! four steers as captain, and the captain always disembarks last.
//!
//! Every arrival is its own worker on a multi-threaded tokio runtime. Workers
//! coordinate through a short-lived state lock (counters plus the transcript),
//! a long-lived formation lock held by the captain in flight, and counting
//! signals that hand the turn from one worker to the next.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use river_crossing::{MemoryTranscript, Simulation, SimulationConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SimulationConfig::builder().total_persons(8).build()?;
//!     let transcript = MemoryTranscript::new();
//!
//!     let simulation = Simulation::new(config, transcript.clone())?;
//!     let report = simulation.run().await?;
//!     simulation.teardown();
//!
//!     for line in transcript.lines() {
//!         println!("{}", line);
//!     }
//!     println!("{} groups crossed", report.stats.groups());
//!     Ok(())
//! }
//! ```

// Ambient infrastructure
pub mod core {
    pub mod config;
    pub mod errors;
    pub mod signal;
}

pub mod crossing;
pub mod simulation;

// Re-exports for convenience
pub use crate::core::config::{SimulationConfig, SimulationConfigBuilder};
pub use crate::core::errors::{CrossingError, Result, SignalKind};
pub use crate::core::signal::Signal;
pub use crate::crossing::{
    Action, ActionRecord, Admission, Arrival, Class, Composition, Crossing, CrossingStats,
    FileTranscript, Generator, MemoryTranscript, PierSnapshot, Role, TranscriptSink,
};
pub use crate::simulation::{Simulation, SimulationReport};
