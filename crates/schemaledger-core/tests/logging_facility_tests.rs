#![allow(clippy::unwrap_used, clippy::expect_used)]

use schemaledger_core::errors::LedgerError;
use schemaledger_core::logging_facility::test_capture::init_test_capture;
use schemaledger_core::{log_op_end, log_op_error, log_op_start};
use schemaledger_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, unit = "m1_add_sku");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have captured one start event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].unit.as_deref(), Some("m1_add_sku"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = LedgerError::NotApplied {
        name: "m1".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let error_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();

    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(error_events[0].field("err_code"), Some("ERR_NOT_APPLIED"));
    assert_eq!(error_events[0].level, tracing::Level::ERROR);
}
