use crate::core::errors::{CrossingError, Result};
use crate::crossing::arrival::Arrival;
use crate::crossing::state::{Class, Crossing};
use crate::crossing::{random_below, spawn_worker};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Produces the arrivals of one class
#[derive(Debug, Clone)]
pub struct Generator {
    class: Class,
    population: u32,
    interval: Duration,
}

impl Generator {
    pub fn new(class: Class, population: u32, interval: Duration) -> Self {
        Self {
            class,
            population,
            interval,
        }
    }

    /// Generator for `class` as configured on `crossing`
    pub fn for_class(crossing: &Crossing, class: Class) -> Self {
        let config = crossing.config();
        let interval = match class {
            Class::Hacker => config.hacker_interval,
            Class::Serf => config.serf_interval,
        };
        Self::new(class, config.per_class_population(), interval)
    }

    /// Spawn every arrival, each after a random pause below the interval,
    /// then wait for all of them to disembark.
    pub async fn run(self, crossing: Arc<Crossing>) -> Result<()> {
        info!(class = %self.class, population = self.population, "Generator started");

        let mut workers = JoinSet::new();
        for id in 1..=self.population {
            if !self.interval.is_zero() {
                sleep(random_below(self.interval)).await;
            }
            let arrival = Arrival::new(self.class, id);
            debug!(arrival = %arrival, "Spawning arrival");
            spawn_worker(&mut workers, arrival.run(crossing.clone()))?;
        }

        let mut first_error: Option<CrossingError> = None;
        while let Some(joined) = workers.join_next().await {
            let outcome = joined.map_err(CrossingError::from).and_then(|result| result);
            if let Err(e) = outcome {
                error!(class = %self.class, error = %e, "Arrival failed");
                first_error.get_or_insert(e);
            }
        }

        info!(class = %self.class, "Generator finished");
        first_error.map_or(Ok(()), Err)
    }
}
