use std::path::PathBuf;

use todo::error::{exit_codes, Error};
use todo::output::error_message;

#[test]
fn user_errors_exit_with_two() {
    let errors = [
        Error::Validation("bad".to_string()),
        Error::NotFound {
            id: 3,
            available: vec![1],
        },
        Error::AlreadyDone(1),
        Error::EmptyCollection,
        Error::InvalidConfig("max_backups".to_string()),
    ];
    for err in errors {
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR, "{err}");
        assert!(!err.is_corruption());
    }
}

#[test]
fn corruption_errors_exit_with_three() {
    let format = Error::Format {
        message: "invalid JSON".to_string(),
        backup: Some(PathBuf::from("/tmp/todo_backups/todo_20261018090000.bak")),
    };
    let schema = Error::Schema {
        record: 2,
        field: "status".to_string(),
        reason: "must be one of pending, done".to_string(),
        backup: None,
    };
    assert_eq!(format.exit_code(), exit_codes::DATA_CORRUPTED);
    assert_eq!(schema.exit_code(), exit_codes::DATA_CORRUPTED);
    assert!(format.is_corruption());
    assert_eq!(schema.kind(), "schema");
    assert_eq!(
        schema.details(),
        Some(serde_json::json!({ "record": 2, "field": "status" }))
    );
    assert!(error_message(&format).contains("todo_20261018090000.bak"));
}

#[test]
fn schema_error_reports_its_backup() {
    let err = Error::Schema {
        record: 1,
        field: "id".to_string(),
        reason: "duplicates id 1".to_string(),
        backup: Some(PathBuf::from("/tmp/todo_backups/todo_20261018090000.bak")),
    };
    assert_eq!(
        err.details(),
        Some(serde_json::json!({
            "record": 1,
            "field": "id",
            "backup": "/tmp/todo_backups/todo_20261018090000.bak",
        }))
    );
    assert!(error_message(&err)
        .ends_with("previous contents saved to /tmp/todo_backups/todo_20261018090000.bak"));
}

#[test]
fn save_failure_keeps_its_cause() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let err = Error::SaveFailed {
        path: PathBuf::from("/ro/todo.json"),
        source: Box::new(Error::Io(io)),
    };
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
    assert_eq!(err.kind(), "io");
    let source = std::error::Error::source(&err).expect("source");
    assert!(source.to_string().contains("read-only"));
    assert!(error_message(&err).contains("the change was not applied"));
}

#[test]
fn not_found_details_list_ids() {
    let err = Error::NotFound {
        id: 9,
        available: vec![1, 2],
    };
    assert_eq!(err.kind(), "not_found");
    assert_eq!(
        err.details(),
        Some(serde_json::json!({ "available_ids": [1, 2] }))
    );
}
