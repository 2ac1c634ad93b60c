//! Simulation session management for Nightcharge
//!
//! Each simulated charger lives in its own session with an independent
//! [`ChargerStateMachine`]; nothing is shared between sessions. The registry
//! is bounded and evicts the least recently used session when full.

use crate::charger::{ChargerSettings, ChargerState, ChargerStateMachine};
use crate::error::{NightchargeError, Result};
use crate::logging::{LogContext, get_logger};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One simulated charger
pub struct SimulationSession {
    /// Unique session ID
    pub id: String,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last time the session was accessed
    pub last_seen: DateTime<Utc>,

    machine: ChargerStateMachine,
}

impl SimulationSession {
    pub fn machine(&self) -> &ChargerStateMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut ChargerStateMachine {
        &mut self.machine
    }
}

/// Serializable overview of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub state: ChargerState,
}

/// Registry of simulation sessions
pub struct SessionRegistry {
    sessions: HashMap<String, SimulationSession>,
    settings: ChargerSettings,
    max_sessions: usize,
    logger: crate::logging::StructuredLogger,
}

impl SessionRegistry {
    /// Create an empty registry; new sessions use `settings`
    pub fn new(settings: ChargerSettings, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            settings,
            max_sessions: max_sessions.max(1),
            logger: get_logger("sessions"),
        }
    }

    /// Start a new session with an idle charger and return its id
    pub fn create(&mut self) -> String {
        if self.sessions.len() >= self.max_sessions {
            self.evict_least_recent();
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let machine = ChargerStateMachine::with_context(
            self.settings.clone(),
            LogContext::new("charger").with_session_id(id.clone()),
        );
        self.sessions.insert(
            id.clone(),
            SimulationSession {
                id: id.clone(),
                created_at: now,
                last_seen: now,
                machine,
            },
        );

        self.logger.info(&format!("Created simulation session {}", id));
        id
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .sessions
            .values()
            .min_by_key(|s| s.last_seen)
            .map(|s| s.id.clone());
        if let Some(id) = oldest {
            self.sessions.remove(&id);
            self.logger
                .info(&format!("Evicted simulation session {} (registry full)", id));
        }
    }

    /// Look up a session without touching it
    pub fn get(&self, id: &str) -> Result<&SimulationSession> {
        self.sessions
            .get(id)
            .ok_or_else(|| NightchargeError::session_not_found(id))
    }

    /// Charger of a session, marking the session as used
    pub fn machine_mut(&mut self, id: &str) -> Result<&mut ChargerStateMachine> {
        let session = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| NightchargeError::session_not_found(id))?;
        session.last_seen = Utc::now();
        Ok(session.machine_mut())
    }

    /// Drop a session
    pub fn remove(&mut self, id: &str) -> Result<()> {
        if self.sessions.remove(id).is_none() {
            return Err(NightchargeError::session_not_found(id));
        }
        self.logger
            .info(&format!("Removed simulation session {}", id));
        Ok(())
    }

    /// Overview of all sessions, oldest first
    pub fn summaries(&self) -> Vec<SessionSummary> {
        let mut list: Vec<SessionSummary> = self
            .sessions
            .values()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                created_at: s.created_at,
                last_seen: s.last_seen,
                state: s.machine.state(),
            })
            .collect();
        list.sort_by_key(|s| s.created_at);
        list
    }

    pub fn settings(&self) -> &ChargerSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(ChargerSettings::default(), 64)
    }
}
