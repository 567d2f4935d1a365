use chrono::NaiveDate;
use shared_types::{ShiftRecord, StoreRow};
use std::collections::HashSet;

/// Final ordering/de-duplication and the mapping onto store rows
#[derive(Debug, Clone)]
pub struct RecordEmitter {
    default_title: String,
}

type RecordKey = (NaiveDate, String, String, String, Option<String>);

impl RecordEmitter {
    pub fn new(default_title: impl Into<String>) -> Self {
        Self {
            default_title: default_title.into(),
        }
    }

    /// Source order is kept; later exact duplicates are removed.
    pub fn emit(&self, records: Vec<ShiftRecord>) -> (Vec<ShiftRecord>, usize) {
        let before = records.len();
        let mut seen: HashSet<RecordKey> = HashSet::new();
        let unique: Vec<ShiftRecord> = records
            .into_iter()
            .filter(|r| {
                seen.insert((
                    r.date,
                    r.time_text.clone(),
                    r.location.clone(),
                    r.notes.clone(),
                    r.title.clone(),
                ))
            })
            .collect();
        let removed = before - unique.len();
        (unique, removed)
    }

    pub fn to_store_row(&self, record: &ShiftRecord) -> StoreRow {
        let title = record
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.default_title.as_str())
            .to_string();

        StoreRow {
            title,
            date: record.date.format("%Y-%m-%d").to_string(),
            time: record.time_text.clone(),
            location: record.location.clone(),
            notes: record.notes.clone(),
        }
    }

    pub fn to_store_rows(&self, records: &[ShiftRecord]) -> Vec<StoreRow> {
        records.iter().map(|r| self.to_store_row(r)).collect()
    }
}

impl Default for RecordEmitter {
    fn default() -> Self {
        Self::new("Shift")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, location: &str, title: Option<&str>) -> ShiftRecord {
        ShiftRecord {
            date: NaiveDate::from_ymd_opt(2025, 9, day).unwrap(),
            time_text: "8 AM - 6 PM".to_string(),
            location: location.to_string(),
            notes: "Jeshad".to_string(),
            title: title.map(str::to_string),
            source_line: format!("8 AM - 6 PM {location} Jeshad"),
        }
    }

    #[test]
    fn test_emit_removes_duplicates_keeping_order() {
        let emitter = RecordEmitter::default();
        let (records, removed) = emitter.emit(vec![
            record(9, "Mesa", None),
            record(8, "Tempe", None),
            record(9, "Mesa", None),
        ]);

        assert_eq!(removed, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location, "Mesa");
        assert_eq!(records[1].location, "Tempe");
    }

    #[test]
    fn test_store_row_uses_fallback_title() {
        let emitter = RecordEmitter::new("Work Shift");

        let row = emitter.to_store_row(&record(9, "Mesa", None));
        assert_eq!(row.title, "Work Shift");
        assert_eq!(row.date, "2025-09-09");
        assert_eq!(row.location, "Mesa");

        let row = emitter.to_store_row(&record(9, "Mesa", Some("Resume Basics")));
        assert_eq!(row.title, "Resume Basics");
    }

    #[test]
    fn test_store_row_json_has_no_weekday() {
        let row = RecordEmitter::default().to_store_row(&record(9, "Mesa", None));
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["time"], "8 AM - 6 PM");
        assert!(json.get("weekday").is_none());
        assert_eq!(json.as_object().unwrap().len(), 5);
    }
}
