//! Injectable time source.
//!
//! Content records, check-ins and token expiry checks all read the current
//! time; routing them through [`Clock`] lets tests pin it.

use chrono::{DateTime, Utc};

/// A source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The current time as a Unix timestamp in seconds.
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_timestamp_matches_now() {
        let clock = SystemClock;
        assert_eq!(clock.now().timestamp(), clock.unix_timestamp());
    }

    #[test]
    fn fixed_clock_is_injectable() {
        struct Frozen(DateTime<Utc>);
        impl Clock for Frozen {
            fn now(&self) -> DateTime<Utc> {
                self.0
            }
        }

        let frozen = Frozen(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        assert_eq!(frozen.unix_timestamp(), 1_700_000_000);
    }
}
