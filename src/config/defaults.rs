use super::*;

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_time: "02:00".to_string(),
            end_time: "05:00".to_string(),
        }
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            anchor_time: "05:00".to_string(),
            slot_minutes: 30,
            horizon_hours: 24,
        }
    }
}

impl Default for ChargeLevelConfig {
    fn default() -> Self {
        Self {
            baseline_percent: 60,
            step_percent: 5,
            max_percent: 100,
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self { max_sessions: 64 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            web_level: None,
            file: "/tmp/nightcharge.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8088,
        }
    }
}
