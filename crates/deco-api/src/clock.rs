use std::sync::Mutex;

use chrono::{Local, NaiveDateTime};

/// Source of the server's local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Render a creation stamp, e.g. `2024-12-10T09:30:00.000000`.
/// Fixed width, so string order matches time order.
pub fn iso_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
    }

    #[test]
    fn timestamp_has_microseconds() {
        assert_eq!(iso_timestamp(at(2024, 12, 10, 9, 30, 0)), "2024-12-10T09:30:00.000000");
    }

    #[test]
    fn timestamps_sort_chronologically() {
        let earlier = iso_timestamp(at(2024, 9, 30, 23, 59, 59));
        let later = iso_timestamp(at(2024, 10, 1, 0, 0, 0));
        assert!(earlier < later);
    }

    #[test]
    fn fixed_clock_moves_only_on_set() {
        let clock = FixedClock::new(at(2024, 12, 10, 12, 0, 0));
        assert_eq!(clock.now(), at(2024, 12, 10, 12, 0, 0));
        clock.set(at(2024, 12, 25, 0, 0, 0));
        assert_eq!(clock.now(), at(2024, 12, 25, 0, 0, 0));
    }
}
