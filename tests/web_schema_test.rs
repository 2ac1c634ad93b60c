#[test]
fn web_schema_has_expected_sections_and_fields() {
    let schema = nightcharge::web_schema::build_ui_schema();
    let sections = schema.get("sections").and_then(|v| v.as_object()).unwrap();
    for key in [
        "schedule", "boost", "timeline", "charge_level", "sessions", "logging", "web",
    ] {
        assert!(sections.get(key).is_some(), "missing section: {}", key);
    }

    let schedule = sections.get("schedule").unwrap().get("fields").unwrap();
    assert!(schedule.get("start_time").is_some());
    assert!(schedule.get("end_time").is_some());

    let logging = sections.get("logging").unwrap().get("fields").unwrap();
    assert!(logging.get("level").is_some());
    assert!(logging.get("file").is_some());
}

#[test]
fn web_schema_covers_every_config_section() {
    let schema = nightcharge::web_schema::build_ui_schema();
    let sections = schema["sections"].as_object().unwrap();
    let config = serde_json::to_value(nightcharge::config::Config::default()).unwrap();
    for key in config.as_object().unwrap().keys() {
        assert!(sections.contains_key(key), "schema lacks config section {}", key);
    }
}
