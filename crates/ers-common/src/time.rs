//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Shared primitives and utilities for the simulator runtime."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::time::Duration;

/// Convert a duration into microseconds, saturating at `u64::MAX`.
pub fn duration_to_micros(duration: Duration) -> u64 {
    duration
        .as_secs()
        .saturating_mul(1_000_000)
        .saturating_add(u64::from(duration.subsec_micros()))
}

/// Absolute distance between an observed interval and its target.
pub fn abs_jitter(actual: Duration, expected: Duration) -> Duration {
    if actual > expected {
        actual - expected
    } else {
        expected - actual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn micros_saturate() {
        assert_eq!(duration_to_micros(Duration::from_millis(3)), 3_000);
        assert_eq!(duration_to_micros(Duration::MAX), u64::MAX);
    }

    #[test]
    fn jitter_is_symmetric_in_magnitude() {
        let target = Duration::from_millis(100);
        assert_eq!(
            abs_jitter(Duration::from_millis(104), target),
            Duration::from_millis(4)
        );
        assert_eq!(
            abs_jitter(Duration::from_millis(96), target),
            Duration::from_millis(4)
        );
    }
}
