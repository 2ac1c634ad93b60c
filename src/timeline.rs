//! Timeline projection
//!
//! Forecast of the charger mode over a fixed horizon, one sample per slot.
//! Every slot is resolved independently through [`crate::charger::resolve_mode`]
//! assuming the operator's current toggles hold; nothing is simulated forward
//! and the live state machine is never touched.

use crate::charger::{
    ChargerMode, ChargerSettings, ChargerState, MINUTES_PER_DAY, OperatorIntent, RuleFacts,
    minutes_until, resolve_mode,
};
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// Projection axis parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineSettings {
    /// First slot of the axis (05:00)
    pub anchor: NaiveTime,

    /// Distance between slots
    pub slot: Duration,

    /// Length of the axis; the closing boundary slot is included
    pub horizon: Duration,
}

impl TimelineSettings {
    /// Number of samples including the closing boundary
    pub fn slot_count(&self) -> usize {
        let slot = self.slot.num_minutes();
        if slot <= 0 {
            return 0;
        }
        usize::try_from(self.horizon.num_minutes() / slot + 1).unwrap_or(0)
    }

    /// Minutes from the anchor to `time`; times before the anchor belong to
    /// the following morning.
    pub fn offset_of(&self, time: NaiveTime) -> i64 {
        minutes_until(self.anchor, time)
    }
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            anchor: NaiveTime::from_hms_opt(5, 0, 0).unwrap_or(NaiveTime::MIN),
            slot: Duration::minutes(30),
            horizon: Duration::minutes(MINUTES_PER_DAY),
        }
    }
}

/// Forecast sample for one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedState {
    /// Time of day of the slot
    #[serde(with = "crate::clock::hhmm")]
    pub time: NaiveTime,

    /// Minutes since the anchor
    pub offset_minutes: i64,

    pub is_charging: bool,
    pub is_boost: bool,
}

impl ProjectedState {
    fn new(time: NaiveTime, offset_minutes: i64, mode: ChargerMode) -> Self {
        Self {
            time,
            offset_minutes,
            is_charging: mode.is_charging(),
            is_boost: mode.is_boost(),
        }
    }

    pub fn mode(&self) -> ChargerMode {
        match (self.is_charging, self.is_boost) {
            (true, true) => ChargerMode::BoostCharging,
            (true, false) => ChargerMode::ScheduledCharging,
            (false, _) => ChargerMode::Idle,
        }
    }
}

/// Project the charger mode over the configured horizon.
///
/// A slot is boosted when a boost is running and the slot lies in
/// `[now, now + boost_duration)`. The cancellation flag is read once from
/// `state`, so a canceled schedule blanks every automatic slot of the axis.
/// The plugged-in toggle is not consulted: the forecast assumes the car is
/// connected overnight.
pub fn project_timeline(
    state: &ChargerState,
    intent: &OperatorIntent,
    settings: &ChargerSettings,
) -> Vec<ProjectedState> {
    let axis = &settings.timeline;
    let slot_minutes = axis.slot.num_minutes();
    let boost_start = axis.offset_of(intent.now);
    let boost_end = boost_start + settings.boost_duration.num_minutes();

    (0..axis.slot_count())
        .map(|index| {
            let offset = i64::try_from(index).unwrap_or(i64::MAX) * slot_minutes;
            let time = axis.anchor + Duration::minutes(offset);
            let facts = RuleFacts {
                boost_active: state.is_boost && (boost_start..boost_end).contains(&offset),
                schedule_canceled: state.schedule_canceled_today,
                schedule_eligible: intent.at_home && settings.window.contains(time),
            };
            ProjectedState::new(time, offset, resolve_mode(&facts))
        })
        .collect()
}
