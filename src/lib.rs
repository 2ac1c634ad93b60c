//! # Nightcharge - Home EV Charger Schedule Simulator
//!
//! Simulates a home EV charger that charges automatically inside a nightly
//! window, can be started early or boosted for a fixed time, and projects
//! its behavior and the car's charge level over the next day.
//!
//! ## Features
//!
//! - **Rule-driven state machine**: one ordered rule table drives both the
//!   live charger and the projection
//! - **Timeline projection**: a 24 hour axis anchored at the window end
//! - **Charge level estimate**: stepwise state of charge per slot
//! - **Web Interface**: REST API over independent simulation sessions
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! - `charger`: Charging window, rule table and the live state machine
//! - `timeline`: Projection of charger states across the day
//! - `estimator`: Charge level estimate over a projected timeline
//! - `controls`: Start/stop button model and status banner
//! - `clock`: Time-of-day sources, rounding and formatting
//! - `session`: Registry of independent simulation sessions
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `web`: HTTP server and REST API

pub mod charger;
pub mod clock;
pub mod config;
pub mod controls;
pub mod error;
pub mod estimator;
pub mod logging;
pub mod session;
pub mod timeline;
pub mod web;
pub mod web_schema;

// Re-export commonly used types
pub use charger::{ChargerMode, ChargerState, ChargerStateMachine, OperatorIntent};
pub use config::Config;
pub use error::{NightchargeError, Result};
