use jiff::Timestamp;

/// Source of the current instant for creation, expiry and click timestamps.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current time of the clock
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-util"))]
mod manual {
    use super::Clock;
    use jiff::{SignedDuration, Timestamp};
    use std::sync::{Arc, Mutex};

    /// A clock that only moves when told to.
    ///
    /// Clones share the same underlying instant, so a test can keep one handle
    /// and advance the clock seen by the registry.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        inner: Arc<Mutex<Timestamp>>,
    }

    impl ManualClock {
        pub fn new(now: Timestamp) -> Self {
            Self {
                inner: Arc::new(Mutex::new(now)),
            }
        }

        pub fn set(&self, now: Timestamp) {
            *self.lock() = now;
        }

        /// Moves the clock forward (or backward, for a negative duration).
        pub fn advance(&self, by: SignedDuration) {
            let mut now = self.lock();
            *now = now.checked_add(by).unwrap_or(*now);
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
            // a poisoned guard still holds a valid timestamp
            self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Timestamp {
            *self.lock()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;

    #[test]
    fn manual_clock_advances_shared_state() {
        let base = Timestamp::from_second(1_000).unwrap();
        let clock = ManualClock::new(base);
        let handle = clock.clone();

        handle.advance(SignedDuration::from_mins(5));

        assert_eq!(clock.now(), Timestamp::from_second(1_300).unwrap());
    }

    #[test]
    fn manual_clock_set_overrides() {
        let clock = ManualClock::new(Timestamp::from_second(0).unwrap());
        let target = Timestamp::from_second(42).unwrap();
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
