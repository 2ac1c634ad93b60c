//! Time-of-day helpers
//!
//! The core never reads the wall clock itself; callers pass the evaluated time
//! in through [`crate::charger::OperatorIntent`]. This module provides the
//! clock used by the HTTP layer when a request does not pin a time, plus the
//! `HH:MM` parsing and serde helpers shared by the API and the configuration.

use crate::error::Result;
use chrono::{Local, NaiveTime, Timelike};

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Source of the current time of day
pub trait Clock {
    fn now(&self) -> NaiveTime;
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// Round a time of day to the nearest slot boundary.
///
/// Halfway points round up; rounding past 23:59 wraps to 00:00.
pub fn round_to_slot(time: NaiveTime, slot_minutes: u32) -> NaiveTime {
    if slot_minutes == 0 {
        return time;
    }
    let slot_secs = slot_minutes * 60;
    let secs = time.num_seconds_from_midnight();
    let rounded = (secs + slot_secs / 2) / slot_secs * slot_secs % SECONDS_PER_DAY;
    NaiveTime::from_num_seconds_from_midnight_opt(rounded, 0).unwrap_or(NaiveTime::MIN)
}

/// Every selectable time of day at the given granularity, starting at 00:00
pub fn time_options(slot_minutes: u32) -> Vec<NaiveTime> {
    if slot_minutes == 0 {
        return Vec::new();
    }
    (0..SECONDS_PER_DAY / 60)
        .step_by(slot_minutes as usize)
        .filter_map(|minute| NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0))
        .collect()
}

/// Parse `HH:MM` (or `HH:MM:SS`)
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    match NaiveTime::parse_from_str(raw, "%H:%M") {
        Ok(t) => Ok(t),
        Err(_) => Ok(NaiveTime::parse_from_str(raw, "%H:%M:%S")?),
    }
}

/// Format as `HH:MM`
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Short 12-hour label such as `2am` or `5:30pm`
pub fn short_label(time: NaiveTime) -> String {
    if time.minute() == 0 {
        time.format("%-I%P").to_string()
    } else {
        time.format("%-I:%M%P").to_string()
    }
}

/// Serde adapter for `NaiveTime` as `HH:MM`
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hhmm(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<NaiveTime>` as `HH:MM` or null
pub mod hhmm_opt {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&super::format_hhmm(*t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| super::parse_hhmm(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn rounds_to_nearest_half_hour() {
        assert_eq!(round_to_slot(t(10, 14), 30), t(10, 0));
        assert_eq!(round_to_slot(t(10, 15), 30), t(10, 30));
        assert_eq!(round_to_slot(t(10, 44), 30), t(10, 30));
        assert_eq!(round_to_slot(t(23, 45), 30), t(0, 0));
    }

    #[test]
    fn lists_forty_eight_half_hour_options() {
        let options = time_options(30);
        assert_eq!(options.len(), 48);
        assert_eq!(options[0], t(0, 0));
        assert_eq!(options[1], t(0, 30));
        assert_eq!(options[47], t(23, 30));
    }

    #[test]
    fn parses_hhmm() {
        assert_eq!(parse_hhmm("02:15").unwrap(), t(2, 15));
        assert_eq!(parse_hhmm(" 23:30:00 ").unwrap(), t(23, 30));
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_hhmm("noon").is_err());
    }

    #[test]
    fn short_labels() {
        assert_eq!(short_label(t(2, 0)), "2am");
        assert_eq!(short_label(t(17, 30)), "5:30pm");
    }

    #[test]
    fn fixed_clock_returns_pinned_time() {
        assert_eq!(FixedClock(t(4, 30)).now(), t(4, 30));
    }
}
