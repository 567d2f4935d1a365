use regex::Regex;
use shared_types::{Annotation, TimeText};
use std::ops::Range;

use super::time_normalizer::TimeNormalizer;

/// Result of scanning one row: the fragment with annotation text removed, plus what was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationScan {
    pub cleaned: String,
    pub annotations: Vec<Annotation>, // Left-to-right source order
}

impl AnnotationScan {
    /// Last early-out wins
    pub fn early_out(&self) -> Option<(&TimeText, &str)> {
        self.annotations.iter().rev().find_map(|a| match a {
            Annotation::EarlyOut {
                new_end_time,
                matched,
            } => Some((new_end_time, matched.as_str())),
            _ => None,
        })
    }

    /// Last non-empty workshop title wins
    pub fn workshop_title(&self) -> Option<&str> {
        self.annotations.iter().rev().find_map(|a| match a {
            Annotation::Workshop { title, .. } if !title.is_empty() => Some(title.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AnnotationExtractor {
    early_out: Regex,
    workshop: Regex,
    normalizer: TimeNormalizer,
}

impl AnnotationExtractor {
    pub fn new(normalizer: TimeNormalizer) -> Self {
        Self {
            early_out: Regex::new(
                r"(?i)[\s,;:(\-–—]*['’]?\b(?:until|till?)\b\.?\s*(?P<time>\d{1,2}(?::\d{2})?(?:\s*[ap]\.?\s?m\b\.?|\b))\)?",
            )
            .expect("early-out pattern compiles"),
            // Only the opening; the title runs to the balancing ")"
            workshop: Regex::new(r"(?i)[\s,;:\-–—]*\bworkshop\s*\(")
                .expect("workshop pattern compiles"),
            normalizer,
        }
    }

    /// Cheap check used by the classifier before a full scan
    pub fn has_workshop(&self, fragment: &str) -> bool {
        self.workshop.is_match(fragment)
    }

    pub fn scan(&self, fragment: &str) -> AnnotationScan {
        let mut found: Vec<(Range<usize>, Annotation)> = Vec::new();

        let mut pos = 0;
        while let Some(open) = self.workshop.find_at(fragment, pos) {
            let (title, end) = parenthesized(fragment, open.end());
            found.push((
                open.start()..end,
                Annotation::Workshop {
                    title: title.trim().to_string(),
                    matched: fragment[open.start()..end].to_string(),
                },
            ));
            pos = end;
        }

        for caps in self.early_out.captures_iter(fragment) {
            let (Some(whole), Some(time)) = (caps.get(0), caps.name("time")) else {
                continue;
            };
            found.push((
                whole.range(),
                Annotation::EarlyOut {
                    new_end_time: self.normalizer.normalize_point(time.as_str()),
                    matched: whole.as_str().to_string(),
                },
            ));
        }

        found.sort_by_key(|(range, _)| range.start);

        let mut cleaned = String::with_capacity(fragment.len());
        let mut annotations = Vec::with_capacity(found.len());
        let mut cursor = 0;
        for (range, annotation) in found {
            // An early-out inside a workshop title belongs to the title
            if range.start < cursor {
                continue;
            }
            cleaned.push_str(&fragment[cursor..range.start]);
            cleaned.push(' ');
            cursor = range.end;
            annotations.push(annotation);
        }
        cleaned.push_str(&fragment[cursor..]);

        AnnotationScan {
            cleaned: trim_connectors(&cleaned),
            annotations,
        }
    }
}

impl Default for AnnotationExtractor {
    fn default() -> Self {
        Self::new(TimeNormalizer::new())
    }
}

/// Text from `start` up to the ")" that closes an already-open parenthesis, and the byte
/// offset just past it. An unclosed title runs to the end of `text`.
fn parenthesized(text: &str, start: usize) -> (&str, usize) {
    let mut depth = 1usize;
    for (offset, c) in text[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let close = start + offset;
                    return (&text[start..close], close + 1);
                }
            }
            _ => {}
        }
    }
    (&text[start..], text.len())
}

/// Collapse whitespace and drop dangling separators left at either edge.
pub(crate) fn trim_connectors(text: &str) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(" ,", ",")
        .replace(" ;", ";");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '–' | '—'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> AnnotationExtractor {
        AnnotationExtractor::default()
    }

    #[test]
    fn test_early_out_stripped_from_note() {
        let scan = extractor().scan("Tempe - until 2:30");

        assert_eq!(scan.cleaned, "Tempe");
        let (time, matched) = scan.early_out().unwrap();
        assert_eq!(time, &TimeText::PassedThrough("2:30".into()));
        assert_eq!(matched, " - until 2:30");
    }

    #[test]
    fn test_workshop_title_extracted() {
        let scan = extractor().scan("Mesa WORKSHOP (Cybersecurity - Spot the Scammer)");

        assert_eq!(scan.cleaned, "Mesa");
        assert_eq!(scan.workshop_title(), Some("Cybersecurity - Spot the Scammer"));
        assert!(scan.early_out().is_none());
    }

    #[test]
    fn test_til_variants() {
        let scan = extractor().scan("Jeshad til. 4pm");
        assert_eq!(scan.cleaned, "Jeshad");
        assert_eq!(
            scan.early_out().map(|(t, _)| t.clone()),
            Some(TimeText::Normalized("4 PM".into()))
        );

        let scan = extractor().scan("Maria (till 1:15)");
        assert_eq!(scan.cleaned, "Maria");
        assert_eq!(
            scan.early_out().map(|(t, _)| t.as_str().to_string()),
            Some("1:15".to_string())
        );
    }

    #[test]
    fn test_last_early_out_wins() {
        let scan = extractor().scan("Jeshad until 1, Maria until 3 PM");

        assert_eq!(scan.cleaned, "Jeshad, Maria");
        assert_eq!(scan.annotations.len(), 2);
        assert_eq!(
            scan.early_out().map(|(t, _)| t.clone()),
            Some(TimeText::Normalized("3 PM".into()))
        );
    }

    #[test]
    fn test_both_annotations_on_one_row() {
        let scan = extractor().scan("Chandler workshop (Budgeting 101) - until 2 Jeshad");

        assert_eq!(scan.cleaned, "Chandler Jeshad");
        assert_eq!(scan.workshop_title(), Some("Budgeting 101"));
        assert_eq!(scan.early_out().map(|(t, _)| t.as_str()), Some("2"));
    }

    #[test]
    fn test_until_inside_workshop_title_is_not_early_out() {
        let scan = extractor().scan("Mesa WORKSHOP (Open until 5)");

        assert_eq!(scan.cleaned, "Mesa");
        assert_eq!(scan.workshop_title(), Some("Open until 5"));
        assert!(scan.early_out().is_none());
    }

    #[test]
    fn test_workshop_title_with_nested_parentheses() {
        let scan = extractor().scan("Mesa 10 AM - 12 PM WORKSHOP (Budgeting (Part 2)) Jeshad");

        assert_eq!(scan.workshop_title(), Some("Budgeting (Part 2)"));
        assert_eq!(scan.cleaned, "Mesa 10 AM - 12 PM Jeshad");
    }

    #[test]
    fn test_unclosed_workshop_runs_to_end() {
        let scan = extractor().scan("Tempe Jeshad WORKSHOP (Resume Basics");

        assert_eq!(scan.workshop_title(), Some("Resume Basics"));
        assert_eq!(scan.cleaned, "Tempe Jeshad");
    }

    #[test]
    fn test_plain_text_untouched() {
        let scan = extractor().scan("Guadalupe  Jeshad, open until further notice");

        assert_eq!(scan.cleaned, "Guadalupe Jeshad, open until further notice");
        assert!(scan.annotations.is_empty());
    }
}
