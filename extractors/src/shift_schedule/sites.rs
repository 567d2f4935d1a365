use regex::Regex;

/// A known site must start within this many bytes of the text searched
const SITE_SEARCH_LIMIT: usize = 40;

/// Finds configured location names inside row text, longest names first
#[derive(Debug, Clone)]
pub struct SiteMatcher {
    sites: Vec<(String, Regex)>,
}

impl SiteMatcher {
    pub fn new(known_sites: &[String]) -> Self {
        let mut names: Vec<&String> = known_sites.iter().filter(|s| !s.trim().is_empty()).collect();
        names.sort_by_key(|s| std::cmp::Reverse(s.len()));

        let sites = names
            .into_iter()
            .filter_map(|name| {
                let name = name.trim();
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name)))
                    .ok()
                    .map(|re| (name.to_string(), re))
            })
            .collect();

        Self { sites }
    }

    /// True when `text` begins with a known site
    pub fn starts_with_site(&self, text: &str) -> bool {
        self.sites
            .iter()
            .any(|(_, re)| re.find(text).is_some_and(|m| m.start() == 0))
    }

    /// Split `text` into (site, remainder) around the first known site near its start
    pub fn take_site(&self, text: &str) -> Option<(String, String)> {
        self.sites.iter().find_map(|(name, re)| {
            let m = re.find(text)?;
            if m.start() >= SITE_SEARCH_LIMIT {
                return None;
            }
            let rest = [text[..m.start()].trim(), text[m.end()..].trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            Some((name.clone(), rest))
        })
    }

    /// Location and notes for a fragment with no leading phrase: a known site if one is
    /// near the start, otherwise the first word.
    pub fn split_location(&self, text: &str) -> (String, String) {
        if let Some(found) = self.take_site(text) {
            return found;
        }
        let mut words = text.split_whitespace();
        let location = words
            .next()
            .map(|w| w.trim_matches(|c: char| c == ',' || c == ';').to_string())
            .unwrap_or_default();
        (location, words.collect::<Vec<_>>().join(" "))
    }
}
