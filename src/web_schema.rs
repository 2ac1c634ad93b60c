//! UI-oriented configuration schema for the Web UI
//!
//! Builds the JSON structure a front end uses to render an editable
//! configuration form, section by section.

use serde_json::{Value, json};

/// Build the UI configuration schema consumed by the web UI
pub fn build_ui_schema() -> Value {
    json!({
        "sections": {
            "schedule": {"title": "Charging window", "type": "object", "fields": {
                "start_time": {"type": "time", "title": "Start time"},
                "end_time": {"type": "time", "title": "End time"}
            }},
            "boost": {"title": "Boost", "type": "object", "fields": {
                "duration_minutes": {"type": "integer", "min": 1, "max": 1439, "title": "Boost duration (min)"}
            }},
            "timeline": {"title": "Timeline", "type": "object", "fields": {
                "anchor_time": {"type": "time", "title": "Axis start"},
                "slot_minutes": {"type": "enum", "values": [5, 10, 15, 20, 30, 60], "title": "Slot length (min)"},
                "horizon_hours": {"type": "integer", "min": 1, "max": 24, "title": "Horizon (h)"}
            }},
            "charge_level": {"title": "Charge level estimate", "type": "object", "fields": {
                "baseline_percent": {"type": "integer", "min": 0, "max": 100, "title": "Starting level (%)"},
                "step_percent": {"type": "integer", "min": 1, "max": 100, "title": "Gain per charging slot (%)"},
                "max_percent": {"type": "integer", "min": 0, "max": 100, "title": "Maximum level (%)"}
            }},
            "sessions": {"title": "Sessions", "type": "object", "fields": {
                "max_sessions": {"type": "integer", "min": 1, "title": "Max simulation sessions"}
            }},
            "logging": {"title": "Logging", "type": "object", "fields": {
                "level": {"type": "enum", "values": ["TRACE","DEBUG","INFO","WARN","ERROR"], "title": "Level"},
                "file": {"type": "string", "title": "File path"},
                "backup_count": {"type": "integer", "min": 0, "title": "Backups"},
                "console_output": {"type": "boolean", "title": "Console output"},
                "json_format": {"type": "boolean", "title": "JSON format"}
            }},
            "web": {"title": "Web UI", "type": "object", "fields": {
                "host": {"type": "string", "title": "Bind address"},
                "port": {"type": "integer", "min": 1, "max": 65535, "title": "Port"}
            }}
        }
    })
}
