//! Charger state machine for Nightcharge
//!
//! This module owns the live charging state of one simulated charger and the
//! ordered rule table that decides between boost, scheduled charging and idle.
//! The same rule table drives the timeline projector, so the live evaluator
//! and the forecast cannot drift apart.

use crate::error::{NightchargeError, Result};
use crate::estimator::ChargeLevelSettings;
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use crate::timeline::{ProjectedState, TimelineSettings, project_timeline};
use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minutes in one day on the 24-hour clock
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Snapshot of what the operator reports for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorIntent {
    /// Car is plugged into the charger
    pub plugged_in: bool,

    /// Car is parked at home
    pub at_home: bool,

    /// Evaluated time of day
    #[serde(with = "crate::clock::hhmm")]
    pub now: NaiveTime,
}

impl OperatorIntent {
    pub fn new(plugged_in: bool, at_home: bool, now: NaiveTime) -> Self {
        Self {
            plugged_in,
            at_home,
            now,
        }
    }
}

/// Daily automatic charging window, half-open `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl ChargeWindow {
    /// Create a window; `start` must be strictly before `end`
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(NightchargeError::validation(
                "schedule",
                "window start must be before window end",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Whether `time` falls inside the window (end excluded)
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

impl Default for ChargeWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(2, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(5, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl fmt::Display for ChargeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", clock_hour(self.start), clock_hour(self.end))
    }
}

fn clock_hour(time: NaiveTime) -> String {
    if time.minute() == 0 {
        time.format("%-I %p").to_string()
    } else {
        time.format("%-I:%M %p").to_string()
    }
}

/// Typed settings consumed by the state machine, projector and estimator
#[derive(Debug, Clone, PartialEq)]
pub struct ChargerSettings {
    /// Automatic charging window
    pub window: ChargeWindow,

    /// Length of a boost session
    pub boost_duration: Duration,

    /// Projection horizon and granularity
    pub timeline: TimelineSettings,

    /// Simulated state-of-charge parameters
    pub charge_level: ChargeLevelSettings,
}

impl Default for ChargerSettings {
    fn default() -> Self {
        Self {
            window: ChargeWindow::default(),
            boost_duration: Duration::minutes(60),
            timeline: TimelineSettings::default(),
            charge_level: ChargeLevelSettings::default(),
        }
    }
}

/// Operating mode of the charger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargerMode {
    /// Not charging
    Idle,

    /// Charging inside the automatic window
    ScheduledCharging,

    /// Manual override session
    BoostCharging,
}

impl ChargerMode {
    pub fn is_charging(self) -> bool {
        !matches!(self, ChargerMode::Idle)
    }

    pub fn is_boost(self) -> bool {
        matches!(self, ChargerMode::BoostCharging)
    }
}

/// Inputs of the rule table for one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleFacts {
    /// A boost session covers this point in time
    pub boost_active: bool,

    /// Automatic charging was canceled for today
    pub schedule_canceled: bool,

    /// Car conditions and clock allow automatic charging
    pub schedule_eligible: bool,
}

type Rule = (fn(&RuleFacts) -> bool, ChargerMode);

fn boost_active(facts: &RuleFacts) -> bool {
    facts.boost_active
}

fn schedule_canceled(facts: &RuleFacts) -> bool {
    facts.schedule_canceled
}

fn schedule_eligible(facts: &RuleFacts) -> bool {
    facts.schedule_eligible
}

/// Ordered rules, first match wins: boost, cancellation gate, automatic window
const RULE_TABLE: [Rule; 3] = [
    (boost_active, ChargerMode::BoostCharging),
    (schedule_canceled, ChargerMode::Idle),
    (schedule_eligible, ChargerMode::ScheduledCharging),
];

/// Resolve the charger mode for one point in time
pub fn resolve_mode(facts: &RuleFacts) -> ChargerMode {
    RULE_TABLE
        .iter()
        .find(|(applies, _)| applies(facts))
        .map_or(ChargerMode::Idle, |(_, mode)| *mode)
}

/// Live charger state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargerState {
    /// Charger is delivering energy
    pub is_charging: bool,

    /// The active session is a manual boost
    pub is_boost: bool,

    /// Operator stopped a scheduled session today
    pub schedule_canceled_today: bool,

    /// Deadline of the active boost session
    #[serde(default, with = "crate::clock::hhmm_opt")]
    pub boost_ends_at: Option<NaiveTime>,

    /// Start of the active boost session
    #[serde(default, with = "crate::clock::hhmm_opt")]
    pub boost_started_at: Option<NaiveTime>,
}

impl ChargerState {
    pub fn mode(&self) -> ChargerMode {
        match (self.is_charging, self.is_boost) {
            (true, true) => ChargerMode::BoostCharging,
            (true, false) => ChargerMode::ScheduledCharging,
            (false, _) => ChargerMode::Idle,
        }
    }

    fn clear_boost(&mut self) {
        self.is_boost = false;
        self.boost_ends_at = None;
        self.boost_started_at = None;
    }
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
}

/// User-facing notification produced by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Automatic schedule claimed the charger
    ScheduledStarted { window: ChargeWindow },

    /// Scheduled session ended because the window closed or the car left
    ScheduledFinished,

    /// Explicit confirmation of a scheduled session
    ScheduledActive,

    /// Plain start without boost or schedule confirmation
    ChargingStarted,

    /// Boost session started
    BoostStarted { minutes: i64, ends_at: NaiveTime },

    /// Boost stopped by the operator
    BoostStopped,

    /// Boost ran for its full duration
    BoostExpired,

    /// Scheduled session stopped by the operator, suppressed until tomorrow
    ScheduleCanceled,
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::ScheduledStarted { .. }
            | Notice::ScheduledActive
            | Notice::ChargingStarted
            | Notice::BoostStarted { .. } => NoticeLevel::Success,
            Notice::ScheduledFinished
            | Notice::BoostStopped
            | Notice::BoostExpired
            | Notice::ScheduleCanceled => NoticeLevel::Info,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ScheduledStarted { window } => {
                write!(f, "Scheduled charging started ({}).", window)
            }
            Notice::ScheduledFinished => write!(f, "Scheduled charging finished."),
            Notice::ScheduledActive => write!(f, "Scheduled charging active."),
            Notice::ChargingStarted => write!(f, "Charging started."),
            Notice::BoostStarted { minutes, .. } => {
                write!(f, "Boost Mode: Charging started for {} minutes!", minutes)
            }
            Notice::BoostStopped => write!(f, "Boost Mode stopped early, reverting to schedule."),
            Notice::BoostExpired => write!(f, "Boost Mode finished, reverting to schedule."),
            Notice::ScheduleCanceled => write!(f, "Scheduled charging stopped until tomorrow."),
        }
    }
}

/// Minutes from `from` forward to `to` on a 24-hour clock
pub fn minutes_until(from: NaiveTime, to: NaiveTime) -> i64 {
    to.signed_duration_since(from)
        .num_minutes()
        .rem_euclid(MINUTES_PER_DAY)
}

/// State machine of one simulated charger
pub struct ChargerStateMachine {
    state: ChargerState,
    settings: ChargerSettings,
    /// The running scheduled session was started by the window rule
    rule_started: bool,
    notices: Vec<Notice>,
    logger: StructuredLogger,
}

impl ChargerStateMachine {
    /// Create an idle charger
    pub fn new(settings: ChargerSettings) -> Self {
        Self::with_context(settings, LogContext::new("charger"))
    }

    /// Create an idle charger logging under the given context
    pub fn with_context(settings: ChargerSettings, context: LogContext) -> Self {
        Self {
            state: ChargerState::default(),
            settings,
            rule_started: false,
            notices: Vec::new(),
            logger: get_logger_with_context(context),
        }
    }

    /// Current state without evaluating any rule
    pub fn state(&self) -> ChargerState {
        self.state
    }

    pub fn settings(&self) -> &ChargerSettings {
        &self.settings
    }

    /// Apply midnight rollover, boost expiry and the rule table at `intent.now`
    /// and return the resulting state.
    pub fn evaluate(&mut self, intent: &OperatorIntent) -> ChargerState {
        let now = intent.now;

        if now.hour() == 0 && now.minute() == 0 && self.state.schedule_canceled_today {
            self.state.schedule_canceled_today = false;
            self.logger
                .debug("Midnight rollover: automatic schedule re-enabled");
        }

        self.expire_boost(now);

        let facts = RuleFacts {
            boost_active: self.state.is_boost,
            schedule_canceled: self.state.schedule_canceled_today,
            schedule_eligible: intent.plugged_in
                && intent.at_home
                && self.settings.window.contains(now),
        };
        self.apply_mode(resolve_mode(&facts));

        self.state
    }

    fn expire_boost(&mut self, now: NaiveTime) {
        if !self.state.is_boost {
            return;
        }
        let Some(started) = self.state.boost_started_at else {
            return;
        };
        if minutes_until(started, now) < self.settings.boost_duration.num_minutes() {
            return;
        }
        self.state.clear_boost();
        self.state.is_charging = false;
        self.logger.info(&format!(
            "Boost session started at {} expired at {}",
            started.format("%H:%M"),
            now.format("%H:%M")
        ));
        self.notices.push(Notice::BoostExpired);
    }

    fn apply_mode(&mut self, target: ChargerMode) {
        match (self.state.mode(), target) {
            (ChargerMode::Idle, ChargerMode::ScheduledCharging) => {
                self.state.is_charging = true;
                self.state.is_boost = false;
                self.rule_started = true;
                let notice = Notice::ScheduledStarted {
                    window: self.settings.window,
                };
                self.logger.info(&notice.to_string());
                self.notices.push(notice);
            }
            (ChargerMode::ScheduledCharging, ChargerMode::Idle) => {
                if self.state.schedule_canceled_today {
                    self.state.is_charging = false;
                    self.rule_started = false;
                    self.logger
                        .debug("Schedule canceled for today; charger forced idle");
                } else if self.rule_started {
                    self.state.is_charging = false;
                    self.rule_started = false;
                    self.logger.info("Scheduled charging finished");
                    self.notices.push(Notice::ScheduledFinished);
                }
                // A manually confirmed session runs until stopped
            }
            // Boost is only entered by a start command and left by stop or expiry
            _ => {}
        }
    }

    /// Start a charging session.
    ///
    /// Fails with [`NightchargeError::AlreadyCharging`] and leaves the state
    /// untouched when a session is already running.
    pub fn start_charge(
        &mut self,
        override_schedule: bool,
        boost: bool,
        intent: &OperatorIntent,
    ) -> Result<Notice> {
        if self.state.is_charging {
            self.logger.warn("Start requested while already charging");
            return Err(NightchargeError::AlreadyCharging);
        }

        self.state.is_charging = true;
        self.state.is_boost = boost;
        self.rule_started = false;

        let notice = if boost {
            let ends_at = intent.now + self.settings.boost_duration;
            self.state.boost_started_at = Some(intent.now);
            self.state.boost_ends_at = Some(ends_at);
            Notice::BoostStarted {
                minutes: self.settings.boost_duration.num_minutes(),
                ends_at,
            }
        } else if override_schedule {
            Notice::ScheduledActive
        } else {
            Notice::ChargingStarted
        };

        self.logger.info(&notice.to_string());
        Ok(notice)
    }

    /// Stop the running session.
    ///
    /// Stopping a boost reverts control to the schedule; stopping a scheduled
    /// session cancels the schedule for the rest of the day.
    pub fn stop_charge(&mut self) -> Result<Notice> {
        if !self.state.is_charging {
            self.logger.warn("Stop requested while not charging");
            return Err(NightchargeError::NotCharging);
        }

        let notice = if self.state.is_boost {
            self.state.clear_boost();
            Notice::BoostStopped
        } else {
            self.state.schedule_canceled_today = true;
            Notice::ScheduleCanceled
        };
        self.state.is_charging = false;
        self.rule_started = false;

        self.logger.info(&notice.to_string());
        Ok(notice)
    }

    /// Forecast of the next 24 hours; does not mutate the live state
    pub fn project(&self, intent: &OperatorIntent) -> Vec<ProjectedState> {
        project_timeline(&self.state, intent, &self.settings)
    }

    /// Take the notices produced by evaluations since the last call
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl Default for ChargerStateMachine {
    fn default() -> Self {
        Self::new(ChargerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn home(now: NaiveTime) -> OperatorIntent {
        OperatorIntent::new(true, true, now)
    }

    #[test]
    fn rule_table_order() {
        let all = RuleFacts {
            boost_active: true,
            schedule_canceled: true,
            schedule_eligible: true,
        };
        assert_eq!(resolve_mode(&all), ChargerMode::BoostCharging);

        let canceled = RuleFacts {
            boost_active: false,
            ..all
        };
        assert_eq!(resolve_mode(&canceled), ChargerMode::Idle);

        let eligible = RuleFacts {
            schedule_eligible: true,
            ..RuleFacts::default()
        };
        assert_eq!(resolve_mode(&eligible), ChargerMode::ScheduledCharging);
        assert_eq!(resolve_mode(&RuleFacts::default()), ChargerMode::Idle);
    }

    #[test]
    fn window_is_half_open() {
        let window = ChargeWindow::default();
        assert!(!window.contains(t(1, 59)));
        assert!(window.contains(t(2, 0)));
        assert!(window.contains(t(4, 59)));
        assert!(!window.contains(t(5, 0)));
        assert_eq!(window.to_string(), "2 AM - 5 AM");
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert!(ChargeWindow::new(t(5, 0), t(2, 0)).is_err());
        assert!(ChargeWindow::new(t(2, 0), t(2, 0)).is_err());
    }

    #[test]
    fn minutes_until_wraps_midnight() {
        assert_eq!(minutes_until(t(23, 30), t(0, 30)), 60);
        assert_eq!(minutes_until(t(10, 0), t(10, 0)), 0);
        assert_eq!(minutes_until(t(10, 0), t(9, 30)), MINUTES_PER_DAY - 30);
    }

    #[test]
    fn scheduled_start_emits_notice_once() {
        let mut machine = ChargerStateMachine::default();
        machine.evaluate(&home(t(2, 0)));
        machine.evaluate(&home(t(2, 30)));
        let notices = machine.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(
            notices[0].to_string(),
            "Scheduled charging started (2 AM - 5 AM)."
        );
        assert!(machine.drain_notices().is_empty());
    }

    #[test]
    fn boost_notice_reports_deadline() {
        let mut machine = ChargerStateMachine::default();
        let notice = machine.start_charge(true, true, &home(t(23, 30))).unwrap();
        assert_eq!(
            notice,
            Notice::BoostStarted {
                minutes: 60,
                ends_at: t(0, 30)
            }
        );
        assert_eq!(notice.level(), NoticeLevel::Success);
    }

    #[test]
    fn state_mode_mapping() {
        let mut state = ChargerState::default();
        assert_eq!(state.mode(), ChargerMode::Idle);
        state.is_charging = true;
        assert_eq!(state.mode(), ChargerMode::ScheduledCharging);
        state.is_boost = true;
        assert_eq!(state.mode(), ChargerMode::BoostCharging);
    }
}
