use serde::{Deserialize, Serialize};

/// Optional retention rule keeping only rows that mention one person
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NameFilter {
    pub name: String,
    pub enabled: bool,
}

impl NameFilter {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
        }
    }

    /// A filter that lets every record through
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Case-insensitive substring check. Always true when disabled.
    pub fn accepts(&self, text: &str) -> bool {
        if !self.enabled {
            return true;
        }
        text.to_lowercase().contains(&self.name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_is_case_insensitive() {
        let filter = NameFilter::new("Jeshad", true);
        assert!(filter.accepts("8 AM - 6 PM Mesa JESHAD, Maria"));
        assert!(!filter.accepts("8 AM - 6 PM Mesa Maria"));
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let filter = NameFilter::new("Jeshad", false);
        assert!(filter.accepts("anything at all"));
        assert!(NameFilter::disabled().accepts(""));
    }
}
