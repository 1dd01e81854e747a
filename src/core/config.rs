use crate::core::errors::{CrossingError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of positional arguments the simulation expects
pub const ARGUMENT_COUNT: usize = 6;

/// Longest accepted interval or duration, in milliseconds
pub const MAX_INTERVAL_MS: u64 = 2000;

/// Shortest accepted pier return bound, in milliseconds
pub const MIN_PIER_RETURN_MS: u64 = 20;

/// Smallest accepted pier capacity
pub const MIN_PIER_CAPACITY: usize = 5;

/// Simulation parameters, one per positional argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Total number of arrivals across both classes
    pub total_persons: u32,
    /// Upper bound of the random delay between two hacker arrivals
    pub hacker_interval: Duration,
    /// Upper bound of the random delay between two serf arrivals
    pub serf_interval: Duration,
    /// Upper bound of the random cruise duration
    pub cruise_duration: Duration,
    /// Upper bound of the random delay before a rejected arrival returns
    pub pier_return_bound: Duration,
    /// Maximum number of arrivals waiting on the pier
    pub pier_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_persons: 8,
            hacker_interval: Duration::ZERO,
            serf_interval: Duration::ZERO,
            cruise_duration: Duration::ZERO,
            pier_return_bound: Duration::from_millis(MIN_PIER_RETURN_MS),
            pier_capacity: MIN_PIER_CAPACITY,
        }
    }
}

impl SimulationConfig {
    /// Create a new builder for SimulationConfig
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::new()
    }

    /// Parse the positional arguments in the order
    /// `totalPersons hackerIntervalMs serfIntervalMs cruiseDurationMs pierReturnBoundMs pierCapacity`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        if args.len() != ARGUMENT_COUNT {
            return Err(CrossingError::argument_count(ARGUMENT_COUNT, args.len()));
        }

        // Every value must be numeric before any range is checked
        let names = [
            "totalPersons",
            "hackerIntervalMs",
            "serfIntervalMs",
            "cruiseDurationMs",
            "pierReturnBoundMs",
            "pierCapacity",
        ];
        let mut values = [0i64; ARGUMENT_COUNT];
        for (slot, (name, raw)) in values.iter_mut().zip(names.iter().zip(args)) {
            *slot = parse_integer(*name, raw.as_ref())?;
        }

        let [total, hacker, serf, cruise, pier_return, capacity] = values;

        let total_persons = u32::try_from(total)
            .map_err(|_| CrossingError::argument_range(names[0], total, "an even number >= 2"))?;
        let pier_capacity = usize::try_from(capacity).map_err(|_| {
            CrossingError::argument_range(names[5], capacity, format!(">= {}", MIN_PIER_CAPACITY))
        })?;

        let config = Self {
            total_persons,
            hacker_interval: millis(names[1], hacker)?,
            serf_interval: millis(names[2], serf)?,
            cruise_duration: millis(names[3], cruise)?,
            pier_return_bound: millis(names[4], pier_return)?,
            pier_capacity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let total = i64::from(self.total_persons);
        if self.total_persons < 2 || self.total_persons % 2 != 0 {
            return Err(CrossingError::argument_range(
                "totalPersons",
                total,
                "an even number >= 2",
            ));
        }
        // Groups take members in pairs, so each class needs an even head count
        if self.per_class_population() % 2 != 0 {
            return Err(CrossingError::argument_range(
                "totalPersons",
                total,
                "a multiple of 4 so both classes can be fully grouped",
            ));
        }

        check_interval("hackerIntervalMs", self.hacker_interval, 0)?;
        check_interval("serfIntervalMs", self.serf_interval, 0)?;
        check_interval("cruiseDurationMs", self.cruise_duration, 0)?;
        check_interval("pierReturnBoundMs", self.pier_return_bound, MIN_PIER_RETURN_MS)?;

        if self.pier_capacity < MIN_PIER_CAPACITY {
            return Err(CrossingError::argument_range(
                "pierCapacity",
                i64::try_from(self.pier_capacity).unwrap_or(i64::MAX),
                format!(">= {}", MIN_PIER_CAPACITY),
            ));
        }

        Ok(())
    }

    /// Number of arrivals each generator produces
    pub fn per_class_population(&self) -> u32 {
        self.total_persons / 2
    }
}

fn parse_integer(name: &'static str, raw: &str) -> Result<i64> {
    let digits = raw.strip_prefix(&['+', '-'][..]).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CrossingError::argument_format(name, raw));
    }
    // Too many digits to fit still counts as a number, just an out-of-range one
    let saturated = if raw.starts_with('-') { i64::MIN } else { i64::MAX };
    Ok(raw.parse::<i64>().unwrap_or(saturated))
}

fn millis(name: &'static str, value: i64) -> Result<Duration> {
    u64::try_from(value)
        .map(Duration::from_millis)
        .map_err(|_| CrossingError::argument_range(name, value, format!("0..={}", MAX_INTERVAL_MS)))
}

fn check_interval(name: &'static str, value: Duration, min_ms: u64) -> Result<()> {
    let ms = value.as_millis();
    if ms < u128::from(min_ms) || ms > u128::from(MAX_INTERVAL_MS) {
        return Err(CrossingError::argument_range(
            name,
            i64::try_from(ms).unwrap_or(i64::MAX),
            format!("{}..={}", min_ms, MAX_INTERVAL_MS),
        ));
    }
    Ok(())
}

/// Builder for SimulationConfig
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
        }
    }

    /// Set the total population
    pub fn total_persons(mut self, total: u32) -> Self {
        self.config.total_persons = total;
        self
    }

    /// Set both generator intervals
    pub fn intervals(mut self, hacker: Duration, serf: Duration) -> Self {
        self.config.hacker_interval = hacker;
        self.config.serf_interval = serf;
        self
    }

    /// Set the cruise duration bound
    pub fn cruise_duration(mut self, duration: Duration) -> Self {
        self.config.cruise_duration = duration;
        self
    }

    /// Set the pier return bound
    pub fn pier_return_bound(mut self, bound: Duration) -> Self {
        self.config.pier_return_bound = bound;
        self
    }

    /// Set the pier capacity
    pub fn pier_capacity(mut self, capacity: usize) -> Self {
        self.config.pier_capacity = capacity;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<SimulationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SimulationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
