//! Canonical `H[:MM] AM/PM` time text.
//!
//! Everything here is lenient: a side that cannot be made canonical is passed through
//! exactly as written and the result is tagged [`TimeText::PassedThrough`].

use regex::Regex;
use shared_types::TimeText;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn flip(self) -> Self {
        match self {
            Meridiem::Am => Meridiem::Pm,
            Meridiem::Pm => Meridiem::Am,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

/// A parsed time on the 12-hour clock. `hour` is always 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Option<Meridiem>,
}

impl ClockTime {
    fn with_meridiem(self, meridiem: Meridiem) -> Self {
        Self {
            meridiem: Some(meridiem),
            ..self
        }
    }

    fn minutes_since_midnight(&self) -> Option<u32> {
        let offset = match self.meridiem? {
            Meridiem::Am => 0,
            Meridiem::Pm => 12,
        };
        Some(((self.hour % 12) + offset) * 60 + self.minute)
    }

    /// Canonical text, only available once the meridiem is known
    fn canonical(&self) -> Option<String> {
        let meridiem = self.meridiem?;
        Some(if self.minute == 0 {
            format!("{} {}", self.hour, meridiem.as_str())
        } else {
            format!("{}:{:02} {}", self.hour, self.minute, meridiem.as_str())
        })
    }
}

#[derive(Debug, Clone)]
pub struct TimeNormalizer {
    token: Regex,
    range: Regex,
}

impl TimeNormalizer {
    pub fn new() -> Self {
        Self {
            token: Regex::new(
                r"(?i)^(?P<hour>\d{1,2})(?::(?P<minute>\d{2}))?\s*(?:(?P<meridiem>[ap])\.?\s?m\.?)?$",
            )
            .expect("time token pattern compiles"),
            range: Regex::new(r"(?i)^\s*(?P<start>.+?)\s*(?:-|–|—|\bto\b)\s*(?P<end>.+?)\s*$")
                .expect("time range pattern compiles"),
        }
    }

    /// Parse one token like "6", "2:30", "12 PM", "9am", "14:00".
    pub fn parse(&self, raw: &str) -> Option<ClockTime> {
        let caps = self.token.captures(raw.trim())?;
        let hour: u32 = caps.name("hour")?.as_str().parse().ok()?;
        let minute: u32 = match caps.name("minute") {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if minute > 59 {
            return None;
        }

        let meridiem = caps.name("meridiem").map(|m| {
            if m.as_str().eq_ignore_ascii_case("a") {
                Meridiem::Am
            } else {
                Meridiem::Pm
            }
        });

        match (hour, meridiem) {
            (1..=12, _) => Some(ClockTime {
                hour,
                minute,
                meridiem,
            }),
            // 24-hour clock without a meridiem
            (0, None) => Some(ClockTime {
                hour: 12,
                minute,
                meridiem: Some(Meridiem::Am),
            }),
            (13..=23, None) => Some(ClockTime {
                hour: hour - 12,
                minute,
                meridiem: Some(Meridiem::Pm),
            }),
            _ => None,
        }
    }

    /// Normalize a single time point.
    pub fn normalize_point(&self, raw: &str) -> TimeText {
        match self.parse(raw).and_then(|t| t.canonical()) {
            Some(text) => TimeText::Normalized(text),
            None => TimeText::PassedThrough(raw.trim().to_string()),
        }
    }

    /// Normalize a two-sided range.
    ///
    /// Only the end's meridiem is ever inherited, and only by a start that has none.
    pub fn normalize_range(&self, start: &str, end: &str) -> TimeText {
        let parsed_start = self.parse(start);
        let parsed_end = self.parse(end);

        let parsed_start = match (parsed_start, parsed_end) {
            (Some(s), Some(e)) if s.meridiem.is_none() => match e.meridiem {
                Some(m) => Some(inherit_start(s, e, m)),
                None => Some(s),
            },
            (s, _) => s,
        };

        let start_text = parsed_start.and_then(|t| t.canonical());
        let end_text = parsed_end.and_then(|t| t.canonical());

        match (start_text, end_text) {
            (Some(s), Some(e)) => TimeText::Normalized(format!("{s} - {e}")),
            (s, e) => TimeText::PassedThrough(format!(
                "{} - {}",
                s.unwrap_or_else(|| start.trim().to_string()),
                e.unwrap_or_else(|| end.trim().to_string())
            )),
        }
    }

    /// Normalize text that already holds a whole range, e.g. "8 AM - 2:30 PM".
    pub fn normalize_range_text(&self, text: &str) -> TimeText {
        match self.split_range(text) {
            Some((start, end)) => self.normalize_range(start, end),
            None => TimeText::PassedThrough(text.trim().to_string()),
        }
    }

    /// Replace the end side of `range` with an early-out time.
    ///
    /// A bare `new_end` takes the old end's meridiem, or the opposite one when that would
    /// land after the old end or before the start. Returns `None` when `range` has no
    /// recognisable end to replace or `new_end` is not a time.
    pub fn shorten_end(&self, range: &str, new_end: &TimeText) -> Option<TimeText> {
        let (start_raw, end_raw) = self.split_range(range)?;
        let mut replacement = self.parse(new_end.as_str())?;
        let start = self.parse(start_raw);
        let old_end = self.parse(end_raw);

        if replacement.meridiem.is_none() {
            if let Some((old_end, old_end_meridiem)) =
                old_end.and_then(|t| t.meridiem.map(|m| (t, m)))
            {
                let candidate = replacement.with_meridiem(old_end_meridiem);
                let after_old_end = minutes(candidate) > minutes(old_end);
                let before_start = match (start.and_then(minutes), minutes(candidate)) {
                    (Some(s), Some(c)) => c < s,
                    _ => false,
                };
                replacement = if after_old_end || before_start {
                    replacement.with_meridiem(old_end_meridiem.flip())
                } else {
                    candidate
                };
            }
        }

        let start_text = start_raw.trim();
        let start_canonical = start.and_then(|t| t.canonical()).as_deref() == Some(start_text);
        Some(match replacement.canonical() {
            Some(end_text) if start_canonical => {
                TimeText::Normalized(format!("{start_text} - {end_text}"))
            }
            Some(end_text) => TimeText::PassedThrough(format!("{start_text} - {end_text}")),
            None => TimeText::PassedThrough(format!("{start_text} - {}", new_end.as_str())),
        })
    }

    fn split_range<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        let caps = self.range.captures(text)?;
        Some((caps.name("start")?.as_str(), caps.name("end")?.as_str()))
    }
}

impl Default for TimeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn minutes(time: ClockTime) -> Option<u32> {
    time.minutes_since_midnight()
}

/// Give a bare start the end's meridiem, flipping it when the start would otherwise
/// come after the end ("11 - 1 PM" reads as 11 AM).
fn inherit_start(start: ClockTime, end: ClockTime, meridiem: Meridiem) -> ClockTime {
    let candidate = start.with_meridiem(meridiem);
    if minutes(candidate) > minutes(end) {
        start.with_meridiem(meridiem.flip())
    } else {
        candidate
    }
}
