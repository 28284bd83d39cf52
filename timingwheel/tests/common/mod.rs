use timingwheel::{SchedulerConfig, WheelLevelConfig};

/// A three-level hierarchy with the same shape as the reference
/// HOUR/MINUTE/SECOND layout, scaled down by roughly 1000x so cascading
/// and forced re-homing are exercised in tens of milliseconds.
pub fn small_config() -> SchedulerConfig {
    SchedulerConfig::default()
        .levels(vec![
            WheelLevelConfig::new("COARSE", 200, 12, 64),
            WheelLevelConfig::new("MEDIUM", 40, 5, 64),
            WheelLevelConfig::new("FINE", 8, 5, 64),
        ])
        .sample_period_ms(5)
        .sample_tolerance_ms(10)
}
