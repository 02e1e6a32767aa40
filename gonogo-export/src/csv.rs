use std::path::{Path, PathBuf};

use gonogo_core::ResponseRecord;
use serde_json::Value;
use tracing::info;

use crate::error::ExportError;

/// Serialize records to delimited text. The header is the first record's
/// key order (record field order is preserved through serde_json); string
/// fields are double-quoted, booleans and integers are literal, absent
/// optionals are empty. Embedded quotes and commas are left as-is — the
/// collection pipeline downstream consumes this format unescaped.
pub fn records_to_csv(records: &[ResponseRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let rows: Vec<Value> = records
        .iter()
        .map(|r| serde_json::to_value(r).unwrap_or(Value::Null))
        .collect();
    let Some(first) = rows.first().and_then(Value::as_object) else {
        return String::new();
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(","));
    for row in &rows {
        let fields: Vec<String> = headers
            .iter()
            .map(|h| match row.get(h) {
                Some(Value::String(s)) => format!("\"{s}\""),
                Some(Value::Null) | None => String::new(),
                Some(v) => v.to_string(),
            })
            .collect();
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Deterministic export file name for one participant's data.
pub fn data_file_name(participant: &str) -> String {
    format!("behavioral_task_data_{participant}.csv")
}

/// Write the CSV snapshot next to the binary (or wherever `dir` points).
/// Safe to call repeatedly; each call rewrites the same full snapshot.
pub fn save_csv(dir: &Path, participant: &str, csv: &str) -> Result<PathBuf, ExportError> {
    let path = dir.join(data_file_name(participant));
    std::fs::write(&path, csv).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), bytes = csv.len(), "data file written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonogo_core::{RecordPhase, StimulusColor};
    use pretty_assertions::assert_eq;

    fn sample_records() -> Vec<ResponseRecord> {
        vec![
            ResponseRecord {
                participant: "participant_test".to_string(),
                trial: 1,
                phase: RecordPhase::Practice,
                color: StimulusColor::Green,
                target: true,
                response: Some("spacebar".to_string()),
                reaction_time: Some(312),
                correct: true,
                timestamp: "2026-08-08T10:00:00.000Z".to_string(),
            },
            ResponseRecord {
                participant: "participant_test".to_string(),
                trial: 2,
                phase: RecordPhase::Practice,
                color: StimulusColor::Red,
                target: false,
                response: None,
                reaction_time: None,
                correct: true,
                timestamp: "2026-08-08T10:00:05.250Z".to_string(),
            },
        ]
    }

    #[test]
    fn header_follows_record_field_order() {
        let csv = records_to_csv(&sample_records());
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "participant,trial,phase,color,target,response,reaction_time,correct,timestamp"
        );
    }

    #[test]
    fn row_count_is_records_plus_header() {
        let csv = records_to_csv(&sample_records());
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn strings_are_quoted_and_absent_optionals_are_empty() {
        let csv = records_to_csv(&sample_records());
        let mut lines = csv.lines().skip(1);
        assert_eq!(
            lines.next().unwrap(),
            "\"participant_test\",1,\"practice\",\"green\",true,\"spacebar\",312,true,\"2026-08-08T10:00:00.000Z\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"participant_test\",2,\"practice\",\"red\",false,,,true,\"2026-08-08T10:00:05.250Z\""
        );
    }

    #[test]
    fn embedded_quotes_are_not_escaped() {
        let mut records = sample_records();
        records[0].participant = "participant_\"odd\"".to_string();
        let csv = records_to_csv(&records);
        assert!(csv.contains("\"participant_\"odd\"\""));
    }

    #[test]
    fn empty_record_set_exports_nothing() {
        assert_eq!(records_to_csv(&[]), "");
    }

    #[test]
    fn file_name_is_derived_from_the_participant() {
        assert_eq!(
            data_file_name("participant_1700000000000"),
            "behavioral_task_data_participant_1700000000000.csv"
        );
    }

    #[test]
    fn save_writes_an_identical_snapshot_each_time() {
        let dir = std::env::temp_dir();
        let participant = format!("participant_csv_test_{}", std::process::id());
        let csv = records_to_csv(&sample_records());

        let first = save_csv(&dir, &participant, &csv).unwrap();
        let second = save_csv(&dir, &participant, &csv).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&second).unwrap(), csv);

        let _ = std::fs::remove_file(first);
    }
}
