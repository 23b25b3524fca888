//! Millisecond clock used to stamp requests.

/// Source of the `timestamp` field (milliseconds since the Unix epoch).
pub trait Clock: Send + Sync {
    /// Current time in milliseconds.
    fn now_millis(&self) -> u64;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Clock frozen at one instant. Useful for fixtures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2023() {
        assert!(SystemClock.now_millis() > 1_700_000_000_000);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(1_700_000_000_000);
        assert_eq!(clock.now_millis(), clock.now_millis());
        assert_eq!(clock.now_millis(), 1_700_000_000_000);
    }
}
