//! Serializable configuration for wheel geometry and channel sizing.

use crate::error::{Error, ErrorKind};

use serde::{Deserialize, Serialize};

/// Configuration for a single wheel level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelLevelConfig {
    /// Diagnostic label, e.g. `"HOUR"`.
    pub name: String,
    /// Duration of one slot, in milliseconds.
    pub interval_ms: u64,
    /// Number of slots in this level.
    pub scales: usize,
    /// Expected max timers per slot; a sizing hint only, never enforced.
    pub cap_hint: usize,
}

impl WheelLevelConfig {
    pub fn new(
        name: impl Into<String>,
        interval_ms: u64,
        scales: usize,
        cap_hint: usize,
    ) -> Self {
        Self {
            name: name.into(),
            interval_ms,
            scales,
            cap_hint,
        }
    }
}

/// Configuration for a [`Scheduler`](crate::Scheduler).
///
/// Defaults to the reference layout: `{1s x 60, 60s x 60, 3600s x 12}`,
/// a channel capacity of 2048, a sampler tolerance of 100ms and a sampler
/// period of 50ms (half the tolerance, so every timer is seen within one
/// tolerance window of its due time).
///
/// # Usage example
/// ```
/// use timingwheel::SchedulerConfig;
///
/// let config = SchedulerConfig::default()
///     .channel_capacity(4096)
///     .sample_tolerance_ms(200);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Wheel levels, ordered coarsest first; the last entry is the leaf.
    pub levels: Vec<WheelLevelConfig>,
    pub channel_capacity: usize,
    pub sample_period_ms: u64,
    pub sample_tolerance_ms: u64,
}

/// `MAX_DELAY_MS` from the reference design: the sampler's lateness
/// tolerance, and the window it requests from `drain_due`.
pub const DEFAULT_SAMPLE_TOLERANCE_MS: u64 = 100;

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            levels: vec![
                WheelLevelConfig::new("HOUR", 3_600_000, 12, 2048),
                WheelLevelConfig::new("MINUTE", 60_000, 60, 2048),
                WheelLevelConfig::new("SECOND", 1_000, 60, 2048),
            ],
            channel_capacity: 2048,
            sample_period_ms: DEFAULT_SAMPLE_TOLERANCE_MS / 2,
            sample_tolerance_ms: DEFAULT_SAMPLE_TOLERANCE_MS,
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn sample_period_ms(mut self, period_ms: u64) -> Self {
        self.sample_period_ms = period_ms;
        self
    }

    pub fn sample_tolerance_ms(mut self, tolerance_ms: u64) -> Self {
        self.sample_tolerance_ms = tolerance_ms;
        self
    }

    pub fn levels(mut self, levels: Vec<WheelLevelConfig>) -> Self {
        self.levels = levels;
        self
    }

    /// Validates the configuration, returning `Err` for anything that
    /// cannot possibly build a working wheel hierarchy: no levels, a level
    /// with zero scales or interval, or a zero-capacity channel.
    pub fn validate(&self) -> Result<(), Error> {
        if self.levels.is_empty() {
            return Err(ErrorKind::InvalidConfig {
                msg: "levels must not be empty",
            }
            .into());
        }
        for level in &self.levels {
            if level.scales == 0 {
                return Err(ErrorKind::InvalidConfig {
                    msg: "a wheel level must have at least one slot",
                }
                .into());
            }
            if level.interval_ms == 0 {
                return Err(ErrorKind::InvalidConfig {
                    msg: "a wheel level must have a non-zero interval",
                }
                .into());
            }
        }
        if self.channel_capacity == 0 {
            return Err(ErrorKind::InvalidConfig {
                msg: "channel_capacity must be non-zero",
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_matches_reference_layout() {
        let config = SchedulerConfig::default();
        assert_eq!(config.levels.len(), 3);
        assert_eq!(config.levels[0].name, "HOUR");
        assert_eq!(config.levels[0].scales, 12);
        assert_eq!(config.levels[2].name, "SECOND");
        assert_eq!(config.channel_capacity, 2048);
        assert_eq!(config.sample_tolerance_ms, 100);
        assert_eq!(config.sample_period_ms, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_levels_is_invalid() {
        let config = SchedulerConfig::default().levels(vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_scales_is_invalid() {
        let config = SchedulerConfig::default().levels(vec![WheelLevelConfig::new(
            "BAD", 1_000, 0, 16,
        )]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_channel_capacity_is_invalid() {
        let config = SchedulerConfig::default().channel_capacity(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = SchedulerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let de: SchedulerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, de);
    }
}
