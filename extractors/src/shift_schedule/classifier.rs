//! Line classification and the two-state machine that carries the active day.
//!
//! `AwaitingHeader` --day header--> `InDay(date)` --day header--> `InDay(other date)`.
//! Rows are only built in `InDay`; an unresolvable header drops back to `AwaitingHeader`.

use chrono::{Datelike, NaiveDate, Weekday};
use regex::{Captures, Regex};
use serde::Serialize;
use shared_types::{DateWindow, ShiftRecord};
use tracing::{debug, warn};

use super::annotations::AnnotationExtractor;
use super::date_window::{next_month, DateWindowLocator};
use super::sites::SiteMatcher;

/// Regex fragment for two times joined by a dash variant or "to", groups t1/t2
pub(crate) const TIME_RANGE: &str = r"(?i)\b(?P<t1>\d{1,2}(?::\d{2})?(?:\s*[ap]\.?\s?m\b\.?|\b))\s*(?:-|–|—|\bto\b)\s*(?P<t2>\d{1,2}(?::\d{2})?(?:\s*[ap]\.?\s?m\b\.?|\b))";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// `trailing_text` is set when the header line carries more than the day and weekday
    DayHeader { day: u32, weekday: Weekday, trailing_text: bool },
    TimedRow,
    TimelessRow,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierState {
    AwaitingHeader,
    InDay(NaiveDate),
}

/// Counters surfaced to callers for troubleshooting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub lines_seen: usize,
    pub headers_seen: usize,
    pub rows_built: usize,
    pub rows_without_header: usize,
    pub rows_out_of_window: usize,
    pub rows_filtered_by_name: usize,
    pub header_text_ignored: usize,
    pub duplicates_removed: usize,
    pub times_passed_through: usize,
}

pub struct LineClassifier {
    day_header: Regex,
    time_range: Regex,
    window_phrase: DateWindowLocator,
    sites: SiteMatcher,
    annotations: AnnotationExtractor,
    keep_timeless_rows: bool,
}

impl LineClassifier {
    pub fn new(sites: SiteMatcher, annotations: AnnotationExtractor, keep_timeless_rows: bool) -> Self {
        Self {
            day_header: Regex::new(
                r"(?i)^(?P<day>\d{1,2})(?:st|nd|rd|th)?[.,]?\s+(?P<weekday>monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|friday|fri|saturday|sat|sunday|sun)\b",
            )
            .expect("day header pattern compiles"),
            time_range: Regex::new(TIME_RANGE).expect("time range pattern compiles"),
            window_phrase: DateWindowLocator::new(),
            sites,
            annotations,
            keep_timeless_rows,
        }
    }

    /// Classify one whitespace-normalized, non-empty line.
    pub fn classify(&self, line: &str) -> LineClass {
        let unmarked = strip_markup(line);
        if let Some(caps) = self.day_header.captures(unmarked) {
            let trailing_text = caps
                .get(0)
                .is_some_and(|m| !strip_markup(&unmarked[m.end()..]).is_empty());
            let day = caps.name("day").and_then(|m| m.as_str().parse().ok());
            let weekday = caps.name("weekday").and_then(|m| weekday_from_name(m.as_str()));
            if let (Some(day), Some(weekday)) = (day, weekday) {
                return LineClass::DayHeader { day, weekday, trailing_text };
            }
        }

        // A date range like "Sept 12 - 13" only hides time ranges it overlaps
        if find_time_range(&self.time_range, &self.window_phrase, line).is_some() {
            return LineClass::TimedRow;
        }

        if self.keep_timeless_rows
            && (self.sites.starts_with_site(line) || self.annotations.has_workshop(line))
        {
            return LineClass::TimelessRow;
        }

        LineClass::Other
    }
}

/// Per-call parse state. Owns the rows it accepts until [`finish`](Self::finish).
pub struct ParseState {
    state: ClassifierState,
    window: DateWindow,
    rows: Vec<ShiftRecord>,
    pub stats: ParseStats,
}

impl ParseState {
    pub fn new(window: DateWindow) -> Self {
        Self {
            state: ClassifierState::AwaitingHeader,
            window,
            rows: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    pub fn state(&self) -> ClassifierState {
        self.state
    }

    pub fn current_date(&self) -> Option<NaiveDate> {
        match self.state {
            ClassifierState::InDay(date) => Some(date),
            ClassifierState::AwaitingHeader => None,
        }
    }

    /// Transition on a day header line.
    pub fn enter_day(&mut self, day: u32, weekday: Weekday) {
        self.stats.headers_seen += 1;
        match resolve_header_date(&self.window, day) {
            Some(date) => {
                if date.weekday() != weekday {
                    warn!(%date, header_weekday = %weekday, actual = %date.weekday(), "Day header weekday does not match its date");
                }
                debug!(%date, "Entering day");
                self.state = ClassifierState::InDay(date);
            }
            None => {
                warn!(day, window = %self.window, "Day header does not resolve to a calendar date");
                self.state = ClassifierState::AwaitingHeader;
            }
        }
    }

    /// Header lines never produce rows, so anything after the weekday is lost
    pub fn skip_header_text(&mut self, line: &str) {
        warn!(line, "Ignoring text after day header");
        self.stats.header_text_ignored += 1;
    }

    /// A row-like line seen before any header
    pub fn skip_headerless_row(&mut self, line: &str) {
        debug!(line, "Row before first day header, ignoring");
        self.stats.rows_without_header += 1;
    }

    /// Accept a built row, dropping it when its date falls outside the window.
    pub fn push_row(&mut self, record: ShiftRecord) {
        if !self.window.contains(record.date) {
            warn!(date = %record.date, window = %self.window, line = %record.source_line, "Dropping row outside date window");
            self.stats.rows_out_of_window += 1;
            return;
        }
        self.stats.rows_built += 1;
        self.rows.push(record);
    }

    pub fn finish(self) -> (Vec<ShiftRecord>, ParseStats) {
        (self.rows, self.stats)
    }
}

/// First time range in `line` that is not part of a date-range phrase
pub(crate) fn find_time_range<'t>(
    time_range: &Regex,
    dates: &DateWindowLocator,
    line: &'t str,
) -> Option<Captures<'t>> {
    let phrases = dates.phrase_spans(line);
    time_range.captures_iter(line).find(|caps| {
        caps.get(0).is_some_and(|m| {
            !phrases
                .iter()
                .any(|p| m.start() < p.end && p.start < m.end())
        })
    })
}

/// Map a header's day number onto the window: the first month of the window in which the
/// day lands inside it, else the start month (or, for a day before the start day in a
/// month-crossing window, the end month). The fallback may fall outside the window.
pub fn resolve_header_date(window: &DateWindow, day: u32) -> Option<NaiveDate> {
    let (start, end) = (window.start(), window.end());

    let (mut year, mut month) = (start.year(), start.month());
    while (year, month) <= (end.year(), end.month()) {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if window.contains(date) {
                return Some(date);
            }
        }
        (year, month) = next_month(year, month);
    }

    if window.crosses_month() && day < start.day() {
        NaiveDate::from_ymd_opt(end.year(), end.month(), day)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month(), day)
    }
}

fn strip_markup(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '#' | '>' | '|' | ':' | '.'))
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let weekday = match prefix.as_str() {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}
