//! Simulated state of charge over a projected timeline

use crate::timeline::ProjectedState;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// State-of-charge model parameters, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeLevelSettings {
    pub baseline_percent: u8,
    pub step_percent: u8,
    pub max_percent: u8,
}

impl Default for ChargeLevelSettings {
    fn default() -> Self {
        Self {
            baseline_percent: 60,
            step_percent: 5,
            max_percent: 100,
        }
    }
}

/// Estimated charge level at one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeLevelPoint {
    #[serde(with = "crate::clock::hhmm")]
    pub time: NaiveTime,
    pub offset_minutes: i64,
    pub state_of_charge: u8,
}

/// Estimate the charge level at every slot.
///
/// Charging during a slot is credited at the slot's end, so the level grows
/// one slot after a charging slot and the first slot always reports the
/// baseline.
pub fn estimate_charge_levels(
    states: &[ProjectedState],
    settings: &ChargeLevelSettings,
) -> Vec<ChargeLevelPoint> {
    let mut level = settings.baseline_percent;
    let mut previous_charging = false;
    let mut points = Vec::with_capacity(states.len());

    for state in states {
        if previous_charging {
            level = level
                .saturating_add(settings.step_percent)
                .min(settings.max_percent);
        }
        points.push(ChargeLevelPoint {
            time: state.time,
            offset_minutes: state.offset_minutes,
            state_of_charge: level,
        });
        previous_charging = state.is_charging;
    }

    points
}
