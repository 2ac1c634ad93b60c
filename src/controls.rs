//! Control surface model for Nightcharge
//!
//! Pure functions describing what a front end should offer the operator:
//! the start/stop buttons, the status banner and the command a start press
//! translates into. Rendering is left to the caller.

use crate::charger::{ChargeWindow, ChargerState, NoticeLevel, OperatorIntent};
use crate::clock::short_label;
use serde::Serialize;

/// One button of the control surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    pub label: String,
    pub enabled: bool,
}

impl ButtonState {
    fn new(label: &str, enabled: bool) -> Self {
        Self {
            label: label.to_string(),
            enabled,
        }
    }
}

/// Start and stop buttons
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlPanel {
    pub start: ButtonState,
    pub stop: ButtonState,
}

/// Build the button states for the current car and charger situation
pub fn control_panel(intent: &OperatorIntent, state: &ChargerState) -> ControlPanel {
    let charging = state.is_charging;

    if !intent.plugged_in {
        return ControlPanel {
            start: ButtonState::new("Start Charge (Car not plugged in)", false),
            stop: ButtonState::new("Stop Charge (Car not plugged in)", false),
        };
    }

    if !intent.at_home {
        return ControlPanel {
            start: ButtonState::new("Start Charge: Boost (Away)", !charging),
            stop: ButtonState::new("Stop Charge", charging),
        };
    }

    match (charging, state.is_boost) {
        (true, true) => ControlPanel {
            start: ButtonState::new("Start Charge: Boost", false),
            stop: ButtonState::new("Stop Charge (Boost Mode)", true),
        },
        (true, false) => ControlPanel {
            start: ButtonState::new("Scheduled Charging Active", false),
            stop: ButtonState::new("Stop Charging", true),
        },
        (false, _) => ControlPanel {
            start: ButtonState::new("Start Charge: Boost", true),
            stop: ButtonState::new("Stop Charge", false),
        },
    }
}

/// Status line shown above the timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub level: NoticeLevel,
    pub message: String,
}

/// Describe whether the automatic schedule applies right now
pub fn status_banner(at_home: bool, state: &ChargerState, window: &ChargeWindow) -> Banner {
    if at_home && state.schedule_canceled_today {
        Banner {
            level: NoticeLevel::Success,
            message: "Car is at home, but scheduled charging will resume tomorrow".to_string(),
        }
    } else if at_home {
        Banner {
            level: NoticeLevel::Success,
            message: format!(
                "Car is at home - charging schedule active ({} to {})",
                short_label(window.start()),
                short_label(window.end())
            ),
        }
    } else {
        Banner {
            level: NoticeLevel::Warning,
            message: "Car is away - charging schedule disabled".to_string(),
        }
    }
}

/// Arguments of a start command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartRequest {
    pub override_schedule: bool,
    pub boost: bool,
}

/// Translate a start press into a command.
///
/// At home a boost overrides the schedule; away from home there is no
/// schedule to override. Returns `None` when a session is already running
/// at home.
pub fn start_request(intent: &OperatorIntent, state: &ChargerState) -> Option<StartRequest> {
    if intent.at_home {
        if state.is_charging {
            return None;
        }
        return Some(StartRequest {
            override_schedule: true,
            boost: true,
        });
    }
    Some(StartRequest {
        override_schedule: false,
        boost: true,
    })
}
