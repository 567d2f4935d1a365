use shared_types::{NameFilter, ShiftRecord};

/// Keep records whose source line or notes mention the configured name.
///
/// Returns the kept records and how many were removed.
pub fn apply(records: Vec<ShiftRecord>, filter: &NameFilter) -> (Vec<ShiftRecord>, usize) {
    if !filter.enabled {
        return (records, 0);
    }

    let before = records.len();
    let kept: Vec<ShiftRecord> = records
        .into_iter()
        .filter(|r| filter.accepts(&r.source_line) || filter.accepts(&r.notes))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(line: &str, notes: &str) -> ShiftRecord {
        ShiftRecord {
            date: NaiveDate::from_ymd_opt(2025, 9, 9).unwrap(),
            time_text: "8 AM - 6 PM".to_string(),
            location: "Mesa".to_string(),
            notes: notes.to_string(),
            title: None,
            source_line: line.to_string(),
        }
    }

    fn records() -> Vec<ShiftRecord> {
        vec![
            record("8 AM - 6 PM Mesa jeshad", "jeshad"),
            record("8 AM - 6 PM Tempe Maria", "Maria"),
        ]
    }

    #[test]
    fn test_enabled_keeps_matching_rows() {
        let (kept, removed) = apply(records(), &NameFilter::new("Jeshad", true));
        assert_eq!(kept.len(), 1);
        assert_eq!(removed, 1);
        assert_eq!(kept[0].notes, "jeshad");
    }

    #[test]
    fn test_disabled_returns_everything() {
        let (kept, removed) = apply(records(), &NameFilter::new("Jeshad", false));
        assert_eq!(kept, records());
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_absent_name_empties_the_sequence() {
        let (kept, removed) = apply(records(), &NameFilter::new("Priya", true));
        assert!(kept.is_empty());
        assert_eq!(removed, 2);
    }
}
