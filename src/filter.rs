use regex::Regex;

use crate::parser::LogRecord;

/// A filter applied to parsed rows
#[derive(Clone, Debug)]
pub struct ActiveFilter {
    /// The pattern string
    pub pattern: String,
    /// Whether to treat the pattern as a regex
    pub is_regex: bool,
    /// Compiled regex (if is_regex is true and pattern is valid)
    compiled: Option<Regex>,
    /// Lowercased pattern for substring matching
    folded: String,
}

impl ActiveFilter {
    pub fn new(pattern: String, is_regex: bool) -> Self {
        let compiled = if is_regex {
            Regex::new(&pattern).ok()
        } else {
            None
        };
        let folded = pattern.to_lowercase();

        Self {
            pattern,
            is_regex,
            compiled,
            folded,
        }
    }

    /// Whether the regex failed to compile and substring matching is used instead
    pub fn is_invalid_regex(&self) -> bool {
        self.is_regex && self.compiled.is_none()
    }

    /// Check if a single value matches this filter
    pub fn matches(&self, value: &str) -> bool {
        match &self.compiled {
            Some(regex) => regex.is_match(value),
            // Invalid regex, treat as substring match
            None if self.is_regex => value.contains(&self.pattern),
            None => value.to_lowercase().contains(&self.folded),
        }
    }

    /// A record matches if any of its raw values does
    pub fn matches_record(&self, record: &LogRecord) -> bool {
        record.values().iter().any(|value| self.matches(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_substring_is_case_insensitive() {
        let filter = ActiveFilter::new("get".to_string(), false);
        assert!(filter.matches("GET"));
        assert!(!filter.matches("POST"));
    }

    #[test]
    fn test_regex_filter() {
        let filter = ActiveFilter::new(r"^5\d\d$".to_string(), true);
        assert!(filter.matches("503"));
        assert!(!filter.matches("200"));
        assert!(!filter.is_invalid_regex());
    }

    #[test]
    fn test_invalid_regex_falls_back_to_substring() {
        let filter = ActiveFilter::new("a(b".to_string(), true);
        assert!(filter.is_invalid_regex());
        assert!(filter.matches("xa(by"));
        assert!(!filter.matches("ab"));
    }

    #[test]
    fn test_matches_any_record_value() {
        let log = parse("#Fields: cs-method sc-status\nGET 200\nPOST 404").unwrap();
        let filter = ActiveFilter::new("404".to_string(), false);
        assert!(!filter.matches_record(&log.rows[0]));
        assert!(filter.matches_record(&log.rows[1]));
    }
}
