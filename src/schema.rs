//! Load-time validation of the data file.
//!
//! The file must be a JSON array of task objects. Records written before due
//! dates existed lack `due_date`; that field is filled with `null` instead of
//! being treated as a violation. Any other problem rejects the whole file.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::task::{parse_timestamp, TaskRecord, PRIORITY_NAMES};

const REQUIRED_FIELDS: [&str; 6] = ["id", "content", "priority", "status", "created", "modified"];
const STATUS_NAMES: [&str; 2] = ["pending", "done"];

/// Validate a parsed data file and convert it into records.
///
/// Records are numbered from 1 in error messages.
pub fn validate_collection(value: Value) -> Result<Vec<TaskRecord>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(Error::Format {
                message: format!("expected a JSON array, found {}", value_kind(&other)),
                backup: None,
            })
        }
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let position = index + 1;
        let record = validate_record(position, item)?;
        if !seen.insert(record.id) {
            return Err(schema_error(
                position,
                "id",
                format!("duplicates id {}", record.id),
            ));
        }
        records.push(record);
    }
    Ok(records)
}

fn validate_record(position: usize, item: Value) -> Result<TaskRecord> {
    let mut fields = match item {
        Value::Object(fields) => fields,
        other => {
            return Err(schema_error(
                position,
                "record",
                format!("must be an object, found {}", value_kind(&other)),
            ))
        }
    };

    for field in REQUIRED_FIELDS {
        if !fields.contains_key(field) {
            return Err(schema_error(position, field, "is missing".to_string()));
        }
    }

    match fields.get("id").and_then(Value::as_u64) {
        Some(id) if id > 0 => {}
        _ => {
            return Err(schema_error(
                position,
                "id",
                format!("must be a positive integer, found {}", fields["id"]),
            ))
        }
    }

    if !fields["content"].is_string() {
        return Err(schema_error(
            position,
            "content",
            format!("must be a string, found {}", value_kind(&fields["content"])),
        ));
    }

    check_enum(position, &fields, "priority", &PRIORITY_NAMES)?;
    check_enum(position, &fields, "status", &STATUS_NAMES)?;
    check_timestamp(position, &fields, "created")?;
    check_timestamp(position, &fields, "modified")?;

    match fields.get("due_date") {
        None => {
            fields.insert("due_date".to_string(), Value::Null);
        }
        Some(Value::Null) => {}
        Some(_) => check_timestamp(position, &fields, "due_date")?,
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|err| schema_error(position, "record", err.to_string()))
}

fn check_enum(
    position: usize,
    fields: &Map<String, Value>,
    field: &str,
    allowed: &[&str],
) -> Result<()> {
    match fields[field].as_str() {
        Some(value) if allowed.contains(&value) => Ok(()),
        _ => Err(schema_error(
            position,
            field,
            format!("must be one of {}, found {}", allowed.join(", "), fields[field]),
        )),
    }
}

fn check_timestamp(position: usize, fields: &Map<String, Value>, field: &str) -> Result<()> {
    let valid = fields[field]
        .as_str()
        .is_some_and(|raw| parse_timestamp(raw).is_ok());
    if valid {
        Ok(())
    } else {
        Err(schema_error(
            position,
            field,
            format!("must be a YYYY-MM-DD HH:MM timestamp, found {}", fields[field]),
        ))
    }
}

fn schema_error(record: usize, field: &str, reason: String) -> Error {
    Error::Schema {
        record,
        field: field.to_string(),
        reason,
        backup: None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: Value) -> Value {
        json!({
            "id": id,
            "content": "water plants",
            "priority": "normal",
            "status": "pending",
            "created": "2026-10-01 08:00",
            "modified": "2026-10-01 08:00",
            "due_date": null
        })
    }

    fn field_of(err: Error) -> String {
        match err {
            Error::Schema { field, .. } => field,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_records() {
        let records = validate_collection(json!([record(json!(1)), record(json!(2))]))
            .expect("valid");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, 2);
    }

    #[test]
    fn rejects_non_array() {
        let err = validate_collection(json!({"tasks": []})).expect_err("object");
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn migrates_missing_due_date() {
        let mut legacy = record(json!(3));
        legacy.as_object_mut().expect("object").remove("due_date");
        let records = validate_collection(json!([legacy])).expect("legacy");
        assert_eq!(records[0].due_date, None);
    }

    #[test]
    fn names_first_missing_field() {
        let mut broken = record(json!(1));
        broken.as_object_mut().expect("object").remove("status");
        let err = validate_collection(json!([broken])).expect_err("missing status");
        assert_eq!(field_of(err), "status");
    }

    #[test]
    fn rejects_bad_ids() {
        for id in [json!(0), json!(-4), json!("7"), json!(1.5)] {
            let err = validate_collection(json!([record(id)])).expect_err("bad id");
            assert_eq!(field_of(err), "id");
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = validate_collection(json!([record(json!(5)), record(json!(5))]))
            .expect_err("duplicate");
        match err {
            Error::Schema { record, field, .. } => {
                assert_eq!(record, 2);
                assert_eq!(field, "id");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_illegal_enums_and_timestamps() {
        let mut bad_priority = record(json!(1));
        bad_priority["priority"] = json!("urgent");
        assert_eq!(
            field_of(validate_collection(json!([bad_priority])).expect_err("priority")),
            "priority"
        );

        let mut bad_due = record(json!(1));
        bad_due["due_date"] = json!("tomorrow");
        assert_eq!(
            field_of(validate_collection(json!([bad_due])).expect_err("due")),
            "due_date"
        );
    }
}
