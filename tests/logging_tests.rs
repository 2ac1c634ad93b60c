#[test]
fn should_emit_filters_below_runtime_level() {
    use nightcharge::logging::{set_web_log_level, should_emit_to_web};
    use tracing::Level;
    // Runtime level WARN: INFO lines are dropped, ERROR passes
    set_web_log_level(Level::WARN);
    assert!(!should_emit_to_web(" INFO message"));
    assert!(should_emit_to_web(" ERROR something"));
    set_web_log_level(Level::INFO);
}

#[test]
fn json_lines_are_classified_by_level_field() {
    use nightcharge::logging::parse_line_level;
    use tracing::Level;
    let line = r#"{"timestamp":"2026-10-19T02:00:00Z","level":"DEBUG","fields":{"message":"x"}}"#;
    assert_eq!(parse_line_level(line), Some(Level::DEBUG));
}

#[test]
fn log_context_carries_session_id() {
    use nightcharge::logging::{LogContext, get_logger_with_context};
    let ctx = LogContext::new("charger").with_session_id("abc-123".to_string());
    let logger = get_logger_with_context(ctx);
    assert_eq!(logger.context().session_id.as_deref(), Some("abc-123"));
    logger.info("Context attached");
}
