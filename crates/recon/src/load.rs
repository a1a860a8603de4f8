//! JSON loading with field-level validation.
//!
//! Input is a JSON array of objects. Each object must carry the three mapped
//! keys as strings; anything else on the object is ignored. A single bad
//! element fails the whole load.

use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};

use crate::config::FieldMapping;
use crate::error::ReconError;
use crate::model::Record;

/// Parse `data` into records, in input order.
///
/// `source` is the label used in error messages (e.g. `"sidecar"`).
pub fn load_records(
    source: &str,
    data: &[u8],
    fields: &FieldMapping,
) -> Result<Vec<Record>, ReconError> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| ReconError::parse(source, format!("invalid JSON: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ReconError::parse(
                source,
                format!("expected a JSON array of records, found {}", kind_of(&other)),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or_else(|| {
            ReconError::parse(
                source,
                format!("element {position}: expected an object, found {}", kind_of(item)),
            )
        })?;

        records.push(Record {
            operator: string_field(source, position, obj, &fields.operator)?,
            avs: string_field(source, position, obj, &fields.avs)?,
            snapshot: string_field(source, position, obj, &fields.snapshot)?,
        });
    }

    log::debug!("{source}: loaded {} record(s)", records.len());
    Ok(records)
}

/// Read everything from `reader`, then parse it.
pub fn load_records_from_reader<R: Read>(
    source: &str,
    mut reader: R,
    fields: &FieldMapping,
) -> Result<Vec<Record>, ReconError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).map_err(|e| ReconError::InputAccess {
        source: source.into(),
        path: "<stream>".into(),
        message: e.to_string(),
    })?;
    load_records(source, &data, fields)
}

pub fn load_records_from_path(
    source: &str,
    path: &Path,
    fields: &FieldMapping,
) -> Result<Vec<Record>, ReconError> {
    let data = std::fs::read(path).map_err(|e| ReconError::InputAccess {
        source: source.into(),
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    log::debug!("{source}: read {} byte(s) from {}", data.len(), path.display());
    load_records(source, &data, fields)
}

fn string_field(
    source: &str,
    position: usize,
    obj: &Map<String, Value>,
    key: &str,
) -> Result<String, ReconError> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ReconError::parse(
            source,
            format!(
                "element {position}: field '{key}' must be a string, found {}",
                kind_of(other)
            ),
        )),
        None => Err(ReconError::parse(
            source,
            format!("element {position}: missing field '{key}'"),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
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

    fn load(json: &str) -> Result<Vec<Record>, ReconError> {
        load_records("sidecar", json.as_bytes(), &FieldMapping::default())
    }

    fn parse_message(err: ReconError) -> String {
        match err {
            ReconError::Parse { source, message } => {
                assert_eq!(source, "sidecar");
                message
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn load_preserves_order() {
        let records = load(
            r#"[
                {"operator":"op2","avs":"avsB","snapshot":"2024-01-02"},
                {"operator":"op1","avs":"avsA","snapshot":"2024-01-01"}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], Record::new("op2", "avsB", "2024-01-02"));
        assert_eq!(records[1], Record::new("op1", "avsA", "2024-01-01"));
    }

    #[test]
    fn load_empty_array() {
        assert!(load("[]").unwrap().is_empty());
    }

    #[test]
    fn extra_fields_ignored() {
        let records =
            load(r#"[{"operator":"op1","avs":"avsA","snapshot":"s","block_number":12}]"#).unwrap();
        assert_eq!(records, vec![Record::new("op1", "avsA", "s")]);
    }

    #[test]
    fn object_instead_of_array() {
        let msg = parse_message(load(r#"{"operator":"op1","avs":"avsA","snapshot":"s"}"#).unwrap_err());
        assert!(msg.contains("expected a JSON array"), "{msg}");
        assert!(msg.contains("an object"), "{msg}");
    }

    #[test]
    fn missing_snapshot_field() {
        let msg = parse_message(
            load(r#"[{"operator":"op1","avs":"avsA","snapshot":"s"},{"operator":"op1","avs":"avsA"}]"#)
                .unwrap_err(),
        );
        assert_eq!(msg, "element 1: missing field 'snapshot'");
    }

    #[test]
    fn wrong_field_type() {
        let msg = parse_message(load(r#"[{"operator":7,"avs":"avsA","snapshot":"s"}]"#).unwrap_err());
        assert_eq!(msg, "element 0: field 'operator' must be a string, found a number");
    }

    #[test]
    fn null_field_rejected() {
        let msg = parse_message(load(r#"[{"operator":"op1","avs":null,"snapshot":"s"}]"#).unwrap_err());
        assert!(msg.contains("field 'avs' must be a string, found null"), "{msg}");
    }

    #[test]
    fn non_object_element() {
        let msg = parse_message(load(r#"["op1"]"#).unwrap_err());
        assert_eq!(msg, "element 0: expected an object, found a string");
    }

    #[test]
    fn invalid_json() {
        let msg = parse_message(load("[{\"operator\":").unwrap_err());
        assert!(msg.starts_with("invalid JSON"), "{msg}");
    }

    #[test]
    fn mapped_field_names() {
        let fields = FieldMapping {
            operator: "operator_address".into(),
            avs: "avs_address".into(),
            snapshot: "snapshot".into(),
        };
        let json = r#"[{"operator_address":"0xop","avs_address":"0xavs","snapshot":"2024-01-01"}]"#;
        let records = load_records("blocklake", json.as_bytes(), &fields).unwrap();
        assert_eq!(records[0], Record::new("0xop", "0xavs", "2024-01-01"));

        let err = load_records("blocklake", br#"[{"operator":"0xop"}]"#, &fields).unwrap_err();
        assert!(err.to_string().contains("missing field 'operator_address'"), "{err}");
    }

    #[test]
    fn missing_file_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_records_from_path("blocklake", &path, &FieldMapping::default()).unwrap_err();
        assert!(matches!(err, ReconError::InputAccess { .. }), "{err:?}");
    }

    #[test]
    fn load_from_reader() {
        let data: &[u8] = br#"[{"operator":"op1","avs":"avsA","snapshot":"s"}]"#;
        let records = load_records_from_reader("sidecar", data, &FieldMapping::default()).unwrap();
        assert_eq!(records.len(), 1);
    }
}
