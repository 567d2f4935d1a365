//! Work-schedule email parsing.
//!
//! Flow: date window → line classifier (day headers carry the active date) → row builder
//! (time normalization, early-out and workshop annotations) → name filter → emitter.
//!
//! ```rust,ignore
//! use extractors::ShiftScheduleExtractor;
//! use shared_types::NameFilter;
//!
//! let extractor = ShiftScheduleExtractor::with_defaults();
//! let parse = extractor.parse(subject, body, 2025, &NameFilter::new("Jeshad", true))?;
//! for row in extractor.store_rows(&parse) { /* hand off */ }
//! ```

mod annotations;
mod classifier;
mod date_window;
mod emitter;
mod html;
mod name_filter;
mod row_builder;
mod sites;
mod time_normalizer;

pub use annotations::{AnnotationExtractor, AnnotationScan};
pub use classifier::{resolve_header_date, ClassifierState, LineClass, LineClassifier, ParseState, ParseStats};
pub use date_window::DateWindowLocator;
pub use emitter::RecordEmitter;
pub use html::{html_to_text, looks_like_html};
pub use row_builder::{BuiltRow, RowBuilder};
pub use sites::SiteMatcher;
pub use time_normalizer::{ClockTime, Meridiem, TimeNormalizer};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{
    DateWindow, ExtractionError, ExtractionInput, Extractor, NameFilter, ScheduleError,
    ShiftRecord, StoreRow,
};
use tracing::{debug, info};

/// Configuration for the schedule parser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftScheduleConfig {
    /// Location names recognized inside rows
    pub known_sites: Vec<String>,
    /// Keep rows without a time range when they start with a known site or name a workshop
    pub keep_timeless_rows: bool,
    /// Title for store rows without a workshop override
    pub default_title: String,
}

impl Default for ShiftScheduleConfig {
    fn default() -> Self {
        Self {
            known_sites: [
                "Aeroterra",
                "CTEC",
                "Guadalupe",
                "Tempe",
                "Chandler",
                "Mesa",
                "Superior",
                "Sierra Vista",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            keep_timeless_rows: true,
            default_title: "Shift".to_string(),
        }
    }
}

/// Outcome of one parse call
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleParse {
    pub window: DateWindow,
    pub records: Vec<ShiftRecord>,
    pub stats: ParseStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    Rows(usize),
    NoRowsParsed,
}

impl ScheduleParse {
    pub fn status(&self) -> ParseStatus {
        if self.records.is_empty() {
            ParseStatus::NoRowsParsed
        } else {
            ParseStatus::Rows(self.records.len())
        }
    }

    /// The records, or [`ScheduleError::NoRowsParsed`] when nothing survived.
    pub fn into_records(self) -> Result<Vec<ShiftRecord>, ScheduleError> {
        if self.records.is_empty() {
            Err(ScheduleError::NoRowsParsed)
        } else {
            Ok(self.records)
        }
    }
}

/// Parser for loosely formatted shift schedule emails
pub struct ShiftScheduleExtractor {
    locator: DateWindowLocator,
    classifier: LineClassifier,
    row_builder: RowBuilder,
    emitter: RecordEmitter,
}

impl ShiftScheduleExtractor {
    pub fn new(config: ShiftScheduleConfig) -> Self {
        let normalizer = TimeNormalizer::new();
        let annotations = AnnotationExtractor::new(normalizer.clone());
        let sites = SiteMatcher::new(&config.known_sites);

        Self {
            locator: DateWindowLocator::new(),
            classifier: LineClassifier::new(sites.clone(), annotations.clone(), config.keep_timeless_rows),
            row_builder: RowBuilder::new(sites, annotations, normalizer),
            emitter: RecordEmitter::new(config.default_title),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ShiftScheduleConfig::default())
    }

    /// Parse a schedule whose window dates belong to `reference_year`.
    pub fn parse(
        &self,
        subject: &str,
        body: &str,
        reference_year: i32,
        filter: &NameFilter,
    ) -> Result<ScheduleParse, ScheduleError> {
        let window = self.locator.locate(subject, body, reference_year)?;
        Ok(self.parse_within(body, window, filter))
    }

    /// Parse a schedule, inferring the year from a date close to when it was sent.
    pub fn parse_near(
        &self,
        subject: &str,
        body: &str,
        anchor: NaiveDate,
        filter: &NameFilter,
    ) -> Result<ScheduleParse, ScheduleError> {
        let window = self.locator.locate_near(subject, body, anchor)?;
        Ok(self.parse_within(body, window, filter))
    }

    pub fn store_rows(&self, parse: &ScheduleParse) -> Vec<StoreRow> {
        self.emitter.to_store_rows(&parse.records)
    }

    fn parse_within(&self, body: &str, window: DateWindow, filter: &NameFilter) -> ScheduleParse {
        let mut state = ParseState::new(window);

        for raw in body.lines() {
            let line = raw.replace('\u{a0}', " ").split_whitespace().collect::<Vec<_>>().join(" ");
            if line.is_empty() {
                continue;
            }
            state.stats.lines_seen += 1;

            let class = self.classifier.classify(&line);
            debug!(line = %line, ?class, state = ?state.state(), "Classified line");

            match class {
                LineClass::DayHeader { day, weekday, trailing_text } => {
                    state.enter_day(day, weekday);
                    if trailing_text {
                        state.skip_header_text(&line);
                    }
                }
                LineClass::TimedRow | LineClass::TimelessRow => match state.current_date() {
                    Some(date) => {
                        let built = self.row_builder.build(&line, date);
                        if built.time_passed_through() {
                            state.stats.times_passed_through += 1;
                        }
                        state.push_row(built.record);
                    }
                    None => state.skip_headerless_row(&line),
                },
                LineClass::Other => {}
            }
        }

        let (rows, mut stats) = state.finish();
        let (rows, filtered) = name_filter::apply(rows, filter);
        stats.rows_filtered_by_name = filtered;
        let (records, duplicates) = self.emitter.emit(rows);
        stats.duplicates_removed = duplicates;

        info!(
            %window,
            records = records.len(),
            headers = stats.headers_seen,
            dropped_out_of_window = stats.rows_out_of_window,
            dropped_without_header = stats.rows_without_header,
            filtered_by_name = stats.rows_filtered_by_name,
            header_text_ignored = stats.header_text_ignored,
            "Parsed schedule"
        );

        ScheduleParse { window, records, stats }
    }
}

impl Extractor for ShiftScheduleExtractor {
    type Output = ScheduleParse;

    fn extract(&self, input: &ExtractionInput) -> Result<ScheduleParse, ExtractionError> {
        let body = if !input.body_text.trim().is_empty() {
            if looks_like_html(&input.body_text) {
                html_to_text(&input.body_text)
            } else {
                input.body_text.clone()
            }
        } else if let Some(html) = input.body_html.as_deref().filter(|h| !h.trim().is_empty()) {
            html_to_text(html)
        } else {
            return Err(ExtractionError::InvalidInput(format!(
                "email {} has no body",
                input.email_id
            )));
        };

        if let Some(year) = input.reference_year {
            return Ok(self.parse(&input.subject, &body, year, &input.name_filter)?);
        }

        let tz: chrono_tz::Tz = input.user_timezone.parse().map_err(|_| {
            ExtractionError::ConfigError(format!("unknown timezone '{}'", input.user_timezone))
        })?;
        let received = match input.received_at {
            Some(ts) => DateTime::<Utc>::from_timestamp(ts, 0).ok_or_else(|| {
                ExtractionError::InvalidInput(format!("received_at {ts} is out of range"))
            })?,
            None => Utc::now(),
        };
        let anchor = received.with_timezone(&tz).date_naive();
        debug!(%anchor, timezone = %tz, "Inferring schedule year from anchor date");

        Ok(self.parse_near(&input.subject, &body, anchor, &input.name_filter)?)
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    const SUBJECT: &str = "Staff schedule";
    const BODY: &str = "\
Hi all,

Here is the schedule for September 1st - 14th. Please check your rows.

8 AM - 6 PM Mesa Jeshad

9 Tuesday
8 AM - 6 PM Sierra Vista Jeshad, Maria
Tempe 12 - 6 PM Jeshad - until 2:30
Mesa WORKSHOP (Cybersecurity - Spot the Scammer) Jeshad

**10 Wednesday**
9 AM - 2 Chandler Jeshad
Guadalupe 10 AM - 4 PM Maria

20 Saturday
8 AM - 6 PM Mesa Jeshad

Thanks!
Sent from my phone
";

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn parse(filter: &NameFilter) -> ScheduleParse {
        ShiftScheduleExtractor::with_defaults()
            .parse(SUBJECT, BODY, 2025, filter)
            .unwrap()
    }

    #[test]
    fn test_full_schedule_unfiltered() {
        let parse = parse(&NameFilter::disabled());

        assert_eq!(parse.window.start(), date(9, 1));
        assert_eq!(parse.window.end(), date(9, 14));
        assert_eq!(parse.records.len(), 5);

        let first = &parse.records[0];
        assert_eq!(first.date, date(9, 9));
        assert_eq!(first.time_text, "8 AM - 6 PM");
        assert_eq!(first.location, "Sierra Vista");
        assert_eq!(first.notes, "Jeshad, Maria");

        let early = &parse.records[1];
        assert_eq!(early.date, date(9, 9));
        assert_eq!(early.location, "Tempe");
        assert_eq!(early.time_text, "12 PM - 2:30 PM");
        assert_eq!(early.notes, "Jeshad");

        let workshop = &parse.records[2];
        assert_eq!(workshop.title.as_deref(), Some("Cybersecurity - Spot the Scammer"));
        assert_eq!(workshop.location, "Mesa");
        assert_eq!(workshop.time_text, "");

        assert_eq!(parse.records[3].date, date(9, 10));
        assert_eq!(parse.records[3].time_text, "9 AM - 2");
        assert_eq!(parse.records[4].location, "Guadalupe");
    }

    #[test]
    fn test_stats_track_dropped_rows() {
        let stats = parse(&NameFilter::disabled()).stats;

        assert_eq!(stats.headers_seen, 3);
        assert_eq!(stats.rows_without_header, 1);
        assert_eq!(stats.rows_out_of_window, 1);
        assert_eq!(stats.times_passed_through, 1);
        assert_eq!(stats.rows_built, 5);
    }

    #[test]
    fn test_records_stay_inside_window() {
        let parse = parse(&NameFilter::disabled());
        assert!(parse.records.iter().all(|r| parse.window.contains(r.date)));
        assert!(parse.records.iter().all(|r| r.date.weekday() != chrono::Weekday::Sat));
    }

    #[test]
    fn test_name_filter_keeps_named_rows() {
        let parse = parse(&NameFilter::new("jeshad", true));

        assert_eq!(parse.records.len(), 4);
        assert_eq!(parse.stats.rows_filtered_by_name, 1);
        assert!(parse.records.iter().all(|r| r.location != "Guadalupe"));
        assert_eq!(parse.status(), ParseStatus::Rows(4));
    }

    #[test]
    fn test_absent_name_signals_no_rows() {
        let parse = parse(&NameFilter::new("Priya", true));

        assert_eq!(parse.status(), ParseStatus::NoRowsParsed);
        assert_eq!(parse.into_records(), Err(ScheduleError::NoRowsParsed));
    }

    #[test]
    fn test_date_ranges_in_notes_do_not_hide_rows() {
        let body = "Schedule for September 1st - 14th\n9 Tuesday\n8 AM - 6 PM Mesa Jeshad, off Sept 12 - 13\nTempe 12 - 6 PM Maria may 3 - 4 PM";
        let parse = ShiftScheduleExtractor::with_defaults()
            .parse("", body, 2025, &NameFilter::disabled())
            .unwrap();

        assert_eq!(parse.records.len(), 2);
        assert_eq!(parse.stats.rows_built, 2);

        assert_eq!(parse.records[0].time_text, "8 AM - 6 PM");
        assert_eq!(parse.records[0].location, "Mesa");
        assert_eq!(parse.records[0].notes, "Jeshad, off Sept 12 - 13");

        assert_eq!(parse.records[1].time_text, "12 PM - 6 PM");
        assert_eq!(parse.records[1].location, "Tempe");
        assert_eq!(parse.records[1].notes, "Maria may 3 - 4 PM");
    }

    #[test]
    fn test_text_after_day_header_is_counted() {
        let body = "Schedule for September 1st - 14th\n9 Tuesday 8 AM - 6 PM Mesa Jeshad\n8 AM - 6 PM Tempe Jeshad";
        let parse = ShiftScheduleExtractor::with_defaults()
            .parse("", body, 2025, &NameFilter::disabled())
            .unwrap();

        assert_eq!(parse.stats.headers_seen, 1);
        assert_eq!(parse.stats.header_text_ignored, 1);
        assert_eq!(parse.records.len(), 1);
        assert_eq!(parse.records[0].location, "Tempe");
    }

    #[test]
    fn test_missing_window_is_an_error() {
        let result = ShiftScheduleExtractor::with_defaults().parse(
            "Lunch plans",
            "9 Tuesday\n8 AM - 6 PM Mesa Jeshad",
            2025,
            &NameFilter::disabled(),
        );
        assert!(matches!(result, Err(ScheduleError::NoDateWindowFound)));
    }

    #[test]
    fn test_year_rollover_schedule() {
        let body = "Schedule for December 28th - January 3rd\n\n30 Tuesday\n8 AM - 6 PM Mesa Jeshad\n2 Friday\n10 - 2 PM Tempe Jeshad";
        let parse = ShiftScheduleExtractor::with_defaults()
            .parse("", body, 2025, &NameFilter::disabled())
            .unwrap();

        assert_eq!(parse.records.len(), 2);
        assert_eq!(parse.records[0].date, NaiveDate::from_ymd_opt(2025, 12, 30).unwrap());
        assert_eq!(parse.records[1].date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(parse.records[1].time_text, "10 AM - 2 PM");
    }

    #[test]
    fn test_store_rows_use_default_title() {
        let extractor = ShiftScheduleExtractor::with_defaults();
        let parse = extractor.parse(SUBJECT, BODY, 2025, &NameFilter::disabled()).unwrap();
        let rows = extractor.store_rows(&parse);

        assert_eq!(rows[0].title, "Shift");
        assert_eq!(rows[0].date, "2025-09-09");
        assert_eq!(rows[2].title, "Cybersecurity - Spot the Scammer");
    }

    #[test]
    fn test_extract_html_body_with_received_date() {
        let html = "<html><body><p>Schedule for September 1st - 14th</p>\
                    <p>9 Tuesday<br>8 AM - 6 PM Mesa Jeshad</p></body></html>";
        let mut input = ExtractionInput::from_text("Schedule", "");
        input.body_html = Some(html.to_string());
        // 2025-08-28T12:00:00Z
        input.received_at = Some(1_756_382_400);
        input.user_timezone = "America/Phoenix".to_string();

        let parse = ShiftScheduleExtractor::with_defaults().extract(&input).unwrap();
        assert_eq!(parse.records.len(), 1);
        assert_eq!(parse.records[0].date, date(9, 9));
    }

    #[test]
    fn test_extract_rejects_bad_timezone_and_empty_body() {
        let extractor = ShiftScheduleExtractor::with_defaults();

        let mut input = ExtractionInput::from_text("Schedule", BODY);
        input.received_at = Some(1_756_382_400);
        input.user_timezone = "Mars/Olympus".to_string();
        assert!(matches!(extractor.extract(&input), Err(ExtractionError::ConfigError(_))));

        let empty = ExtractionInput::from_text("Schedule", "  ");
        assert!(matches!(extractor.extract(&empty), Err(ExtractionError::InvalidInput(_))));
    }

    #[test]
    fn test_extract_with_reference_year() {
        let mut input = ExtractionInput::from_text(SUBJECT, BODY);
        input.reference_year = Some(2025);
        input.name_filter = NameFilter::new("Maria", true);

        let parse = ShiftScheduleExtractor::with_defaults().extract(&input).unwrap();
        assert_eq!(parse.records.len(), 2);
        assert!(parse.records.iter().all(|r| r.source_line.contains("Maria")));
    }
}
