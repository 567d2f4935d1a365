use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive calendar range a schedule email claims to cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Returns `None` when `start` falls after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// True when start and end sit in different calendar months (or years)
    pub fn crosses_month(&self) -> bool {
        (self.start.year(), self.start.month()) != (self.end.year(), self.end.month())
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Best-effort time text: either canonical `H[:MM] AM/PM` form or the input as given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "kebab-case")]
pub enum TimeText {
    Normalized(String),
    PassedThrough(String),
}

impl TimeText {
    pub fn as_str(&self) -> &str {
        match self {
            TimeText::Normalized(s) | TimeText::PassedThrough(s) => s,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, TimeText::Normalized(_))
    }

    pub fn into_string(self) -> String {
        match self {
            TimeText::Normalized(s) | TimeText::PassedThrough(s) => s,
        }
    }
}

impl fmt::Display for TimeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Override found inside a row, paired with the exact text it was matched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Annotation {
    /// "until 2:30" style phrase shortening the shift's end time
    EarlyOut {
        new_end_time: TimeText,
        matched: String,
    },
    /// "WORKSHOP (...)" phrase replacing the record title
    Workshop { title: String, matched: String },
}

impl Annotation {
    pub fn matched(&self) -> &str {
        match self {
            Annotation::EarlyOut { matched, .. } | Annotation::Workshop { matched, .. } => matched,
        }
    }
}

/// One shift, tied to a single calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub date: NaiveDate,
    pub time_text: String, // Empty for rows without a time range
    pub location: String,
    pub notes: String,
    pub title: Option<String>, // Only set by a workshop annotation
    pub source_line: String,
}

impl ShiftRecord {
    pub fn has_time(&self) -> bool {
        !self.time_text.is_empty()
    }
}
