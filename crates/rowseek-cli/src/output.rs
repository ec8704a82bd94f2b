//! Structured output of result records.
//!
//! JSON and YAML serialize the records as they are. CSV flattens every
//! record to dotted paths; the header is the union of all paths, in the
//! order they are first seen. A record that is not an object fills a
//! single `value` column.

use indexmap::IndexSet;
use rowseek::{flatten, to_text, FlatRow};
use serde_json::Value;
use thiserror::Error;

use crate::cli::OutputFormat;

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(String),
}

/// Serializes `records` in `format`. The result ends with a newline.
pub fn serialize(records: &[Value], format: OutputFormat) -> Result<String, SerializeError> {
    match format {
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(records)?;
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(records)?),
        OutputFormat::Csv => to_csv(records),
    }
}

fn to_csv(records: &[Value]) -> Result<String, SerializeError> {
    let rows: Vec<FlatRow> = records.iter().map(csv_row).collect();
    let headers: IndexSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut wtr = csv::Writer::from_writer(vec![]);
    if !headers.is_empty() {
        wtr.write_record(&headers)
            .map_err(|e| SerializeError::Csv(e.to_string()))?;
    }
    for row in &rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| to_text(row.get(*h)).into_owned())
            .collect();
        wtr.write_record(&cells)
            .map_err(|e| SerializeError::Csv(e.to_string()))?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| SerializeError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SerializeError::Csv(e.to_string()))
}

fn csv_row(record: &Value) -> FlatRow {
    match record {
        Value::Object(_) => flatten(record),
        scalar => {
            let mut row = FlatRow::new();
            row.insert("value".to_string(), scalar.clone());
            row
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Value> {
        vec![
            json!({"name": "Anna", "person": {"age": 31}}),
            json!({"name": "Bob, Jr.", "tags": ["a", "b"], "person": {"age": 40}}),
        ]
    }

    #[test]
    fn json_output() {
        let text = serialize(&records(), OutputFormat::Json).unwrap();
        let back: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records());
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn yaml_output() {
        let text = serialize(&records(), OutputFormat::Yaml).unwrap();
        assert!(text.contains("name: Anna"));
        let back: Vec<Value> = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, records());
    }

    #[test]
    fn csv_output_flattens_paths() {
        let text = serialize(&records(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,person.age,tags");
        assert_eq!(lines[1], "Anna,31,");
        assert_eq!(lines[2], r#""Bob, Jr.",40,"[""a"",""b""]""#);
    }

    #[test]
    fn csv_of_nothing_is_empty() {
        assert_eq!(serialize(&[], OutputFormat::Csv).unwrap(), "");
    }

    #[test]
    fn csv_headers_follow_record_order() {
        let records = vec![
            json!({"person": {"lastName": "Cole", "firstName": "Anna"}, "age": 31}),
            json!({"zone": "b", "age": 40}),
        ];
        let text = serialize(&records, OutputFormat::Csv).unwrap();
        assert_eq!(text.lines().next(), Some("person.lastName,person.firstName,age,zone"));
    }

    #[test]
    fn csv_of_scalars() {
        let text = serialize(&[json!(1), json!("x")], OutputFormat::Csv).unwrap();
        assert_eq!(text, "value\n1\nx\n");
    }
}
