//! Seasonal visibility gate for tree messages.
//!
//! From November 1 until the first instant of December 25 (server local time)
//! every message body is replaced with a placeholder. Only the calendar day is
//! consulted; the hour never matters.

use chrono::Datelike;

use deco_types::models::Message;

pub const WRAPPED_PLACEHOLDER: &str = "🎁 Wrapped until Dec 25th!";

pub fn is_locked<T: Datelike>(now: &T) -> bool {
    match now.month() {
        11 => true,
        12 => now.day() < 25,
        _ => false,
    }
}

/// Mask every message body when locked. Order, count and all other fields
/// are left as they came in.
pub fn apply<T: Datelike>(now: &T, mut messages: Vec<Message>) -> Vec<Message> {
    if is_locked(now) {
        for msg in &mut messages {
            msg.content = WRAPPED_PLACEHOLDER.to_string();
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn at(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn messages() -> Vec<Message> {
        vec![
            Message {
                id: "m2".into(),
                tree_id: "t1".into(),
                content: "see you soon".into(),
                sender: "bob".into(),
                color: "green".into(),
                created_at: "2024-12-02T08:00:00.000000".into(),
            },
            Message {
                id: "m1".into(),
                tree_id: "t1".into(),
                content: "merry christmas".into(),
                sender: "carol".into(),
                color: "red".into(),
                created_at: "2024-12-01T08:00:00.000000".into(),
            },
        ]
    }

    #[test]
    fn known_dates() {
        assert!(is_locked(&date(12, 24)));
        assert!(!is_locked(&date(12, 25)));
        assert!(!is_locked(&date(1, 1)));
        assert!(is_locked(&date(11, 30)));
        assert!(is_locked(&date(11, 1)));
        assert!(is_locked(&date(12, 1)));
        assert!(!is_locked(&date(12, 31)));
        assert!(!is_locked(&date(10, 31)));
    }

    #[test]
    fn every_day_of_a_leap_year() {
        let mut day = date(1, 1);
        while day.year() == 2024 {
            let expected = day.month() == 11 || (day.month() == 12 && day.day() < 25);
            assert_eq!(is_locked(&day), expected, "{day}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn hour_is_ignored() {
        assert!(is_locked(&at(12, 24, 23, 59)));
        assert!(!is_locked(&at(12, 25, 0, 0)));
        assert!(!is_locked(&at(12, 25, 4, 59)));
        assert!(is_locked(&at(11, 1, 0, 0)));
        assert!(!is_locked(&at(10, 31, 23, 59)));
    }

    #[test]
    fn locked_masks_only_content() {
        let original = messages();
        let gated = apply(&at(12, 10, 12, 0), original.clone());

        assert_eq!(gated.len(), original.len());
        for (g, o) in gated.iter().zip(&original) {
            assert_eq!(g.content, WRAPPED_PLACEHOLDER);
            assert_eq!(g.id, o.id);
            assert_eq!(g.tree_id, o.tree_id);
            assert_eq!(g.sender, o.sender);
            assert_eq!(g.color, o.color);
            assert_eq!(g.created_at, o.created_at);
        }
    }

    #[test]
    fn unlocked_is_identity() {
        let original = messages();
        assert_eq!(apply(&at(12, 25, 0, 0), original.clone()), original);
        assert_eq!(apply(&at(6, 15, 9, 0), original.clone()), original);
    }

    #[test]
    fn applying_twice_equals_once() {
        for now in [at(11, 20, 10, 0), at(3, 3, 3, 0)] {
            let once = apply(&now, messages());
            let twice = apply(&now, once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(apply(&at(12, 1, 0, 0), Vec::new()).is_empty());
    }
}
