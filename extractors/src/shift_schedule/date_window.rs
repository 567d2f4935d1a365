use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use shared_types::{DateWindow, ScheduleError};
use std::ops::Range;
use tracing::debug;

/// English month names and their usual abbreviations
const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

/// Windows starting further ahead of the anchor than this belong to the previous year
const MAX_DAYS_AHEAD: i64 = 120;
/// Windows starting further behind the anchor than this belong to the next year
const MAX_DAYS_BEHIND: i64 = 250;

/// "<Month> <d>[st] - [<Month>] <d>[th]" with named groups m1, d1, m2, d2.
pub(crate) fn range_pattern() -> String {
    format!(
        r"\b(?P<m1>{MONTH})\b\.?\s+(?P<d1>\d{{1,2}})(?:st|nd|rd|th)?\s*(?:-|–|—|\bto\b|\bthrough\b|\bthru\b)\s*(?:(?P<m2>{MONTH})\b\.?\s+)?(?P<d2>\d{{1,2}})(?:st|nd|rd|th)?\b"
    )
}

pub struct DateWindowLocator {
    anchored: Regex,
    bare: Regex,
}

impl DateWindowLocator {
    pub fn new() -> Self {
        let range = range_pattern();
        Self {
            anchored: Regex::new(&format!(r"(?i)schedule\s+for\s+(?:[a-z]+,?\s+)?{range}"))
                .expect("anchored window pattern compiles"),
            bare: Regex::new(&format!("(?i){range}")).expect("window pattern compiles"),
        }
    }

    /// Find the window, resolving month/day pairs against `year`.
    ///
    /// A phrase introduced by "schedule for" beats a bare one, and the subject is searched
    /// before the body.
    pub fn locate(&self, subject: &str, body: &str, year: i32) -> Result<DateWindow, ScheduleError> {
        for pattern in [&self.anchored, &self.bare] {
            for text in [subject, body] {
                for caps in pattern.captures_iter(text) {
                    match resolve(&caps, year) {
                        Some(window) => {
                            debug!(phrase = %&caps[0], %window, "Resolved date window");
                            return Ok(window);
                        }
                        None => debug!(phrase = %&caps[0], year, "Skipping unresolvable date phrase"),
                    }
                }
            }
        }
        Err(ScheduleError::NoDateWindowFound)
    }

    /// Like [`locate`](Self::locate), inferring the year from a nearby date such as the
    /// day the email arrived.
    pub fn locate_near(
        &self,
        subject: &str,
        body: &str,
        anchor: NaiveDate,
    ) -> Result<DateWindow, ScheduleError> {
        let window = self.locate(subject, body, anchor.year())?;
        let lead = (window.start() - anchor).num_days();

        let shifted_year = if lead > MAX_DAYS_AHEAD {
            Some(anchor.year() - 1)
        } else if -lead > MAX_DAYS_BEHIND {
            Some(anchor.year() + 1)
        } else {
            None
        };

        match shifted_year {
            Some(year) => {
                debug!(%window, %anchor, year, "Window too far from anchor, shifting year");
                self.locate(subject, body, year)
            }
            None => Ok(window),
        }
    }

    /// True when the line holds a date-range phrase
    pub fn is_window_phrase(&self, line: &str) -> bool {
        self.bare.is_match(line)
    }

    /// Byte spans of every date-range phrase in `text`
    pub fn phrase_spans(&self, text: &str) -> Vec<Range<usize>> {
        self.bare.find_iter(text).map(|m| m.range()).collect()
    }
}

impl Default for DateWindowLocator {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// The month after (`year`, `month`)
pub(crate) fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn resolve(caps: &Captures, year: i32) -> Option<DateWindow> {
    let start_month = month_number(caps.name("m1")?.as_str())?;
    let start_day: u32 = caps.name("d1")?.as_str().parse().ok()?;
    let end_day: u32 = caps.name("d2")?.as_str().parse().ok()?;
    let start = NaiveDate::from_ymd_opt(year, start_month, start_day)?;

    let end = match caps.name("m2") {
        Some(m2) => {
            let end_month = month_number(m2.as_str())?;
            let end_year = if end_month < start_month { year + 1 } else { year };
            NaiveDate::from_ymd_opt(end_year, end_month, end_day)?
        }
        None if end_day >= start_day => NaiveDate::from_ymd_opt(year, start_month, end_day)?,
        None => {
            // "September 28th - 4th" runs into October
            let (end_year, end_month) = next_month(year, start_month);
            NaiveDate::from_ymd_opt(end_year, end_month, end_day)?
        }
    };

    DateWindow::new(start, end)
}
