use chrono::NaiveDate;
use regex::Regex;
use shared_types::{ShiftRecord, TimeText};
use tracing::debug;

use super::annotations::{trim_connectors, AnnotationExtractor};
use super::classifier::{find_time_range, TIME_RANGE};
use super::date_window::DateWindowLocator;
use super::sites::SiteMatcher;
use super::time_normalizer::TimeNormalizer;

/// A record plus how its time text came out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRow {
    pub record: ShiftRecord,
    pub time: Option<TimeText>,
}

impl BuiltRow {
    pub fn time_passed_through(&self) -> bool {
        matches!(self.time, Some(TimeText::PassedThrough(_)))
    }
}

pub struct RowBuilder {
    time_range: Regex,
    dates: DateWindowLocator,
    sites: SiteMatcher,
    annotations: AnnotationExtractor,
    normalizer: TimeNormalizer,
}

impl RowBuilder {
    pub fn new(sites: SiteMatcher, annotations: AnnotationExtractor, normalizer: TimeNormalizer) -> Self {
        Self {
            time_range: Regex::new(TIME_RANGE).expect("time range pattern compiles"),
            dates: DateWindowLocator::new(),
            sites,
            annotations,
            normalizer,
        }
    }

    /// Build the record for one site row dated `date`.
    pub fn build(&self, line: &str, date: NaiveDate) -> BuiltRow {
        let scan = self.annotations.scan(line);
        let cleaned = scan.cleaned.as_str();

        let (prefix, tail, mut time) = match find_time_range(&self.time_range, &self.dates, cleaned) {
            Some(caps) => {
                let whole = caps.get(0).map_or(0..0, |m| m.range());
                let time = match (caps.name("t1"), caps.name("t2")) {
                    (Some(t1), Some(t2)) => Some(self.normalizer.normalize_range(t1.as_str(), t2.as_str())),
                    _ => None,
                };
                (
                    trim_connectors(&cleaned[..whole.start]),
                    trim_connectors(&cleaned[whole.end..]),
                    time,
                )
            }
            None => (String::new(), cleaned.to_string(), None),
        };

        let (location, mut notes) = self.split_location(&prefix, &tail);

        if let Some((new_end, phrase)) = scan.early_out() {
            let shortened = time
                .as_ref()
                .and_then(|t| self.normalizer.shorten_end(t.as_str(), new_end));
            match shortened {
                Some(shortened) => time = Some(shortened),
                None => {
                    // Nothing to shorten, so keep the phrase visible
                    debug!(line, "Early-out without a usable time range, keeping it in notes");
                    notes = trim_connectors(&format!("{notes} {phrase}"));
                }
            }
        }

        let record = ShiftRecord {
            date,
            time_text: time.as_ref().map(|t| t.as_str().to_string()).unwrap_or_default(),
            location,
            notes,
            title: scan.workshop_title().map(str::to_string),
            source_line: line.to_string(),
        };

        BuiltRow { record, time }
    }

    /// Location from the leading phrase or a known site, the rest becomes notes.
    fn split_location(&self, prefix: &str, tail: &str) -> (String, String) {
        if let Some((site, rest)) = self.sites.take_site(prefix) {
            return (site, join_nonempty(&[&rest, tail]));
        }
        if !prefix.is_empty() {
            if let Some((site, rest)) = self.sites.take_site(tail) {
                return (site, join_nonempty(&[prefix, &rest]));
            }
            return (prefix.to_string(), tail.to_string());
        }
        self.sites.split_location(tail)
    }
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
