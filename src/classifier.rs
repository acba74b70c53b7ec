use regex::Regex;

/// Decides whether a line opens a new error block.
#[derive(Debug, Clone, Copy)]
pub struct LineClassifier<'a> {
    entry: &'a Regex,
}

impl<'a> LineClassifier<'a> {
    /// `entry` must already be anchored at both ends, as [`crate::Patterns`] builds it.
    pub fn new(entry: &'a Regex) -> Self {
        Self { entry }
    }

    /// True only if the whole line matches the entry pattern.
    pub fn is_block_start(&self, line: &str) -> bool {
        self.entry.is_match(line)
    }
}

#[cfg(test)]
mod tests {
    use crate::AnalysisConfig;

    #[test]
    fn test_default_entry_pattern() {
        let patterns = AnalysisConfig::default().compile().unwrap();
        let classifier = patterns.classifier();
        assert!(classifier.is_block_start("ERROR 2024-01-01 00:00:00 boom"));
        assert!(!classifier.is_block_start("INFO ok"));
        assert!(!classifier.is_block_start("\tat foo.bar()"));
        // The level must be followed by a space
        assert!(!classifier.is_block_start("ERRORS everywhere"));
    }

    #[test]
    fn test_full_line_match_not_search() {
        let patterns = AnalysisConfig::default().with_entry_pattern("ERROR").compile().unwrap();
        let classifier = patterns.classifier();
        assert!(classifier.is_block_start("ERROR"));
        assert!(!classifier.is_block_start("ERROR boom"));
        assert!(!classifier.is_block_start("2024-01-01 ERROR"));
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let patterns = AnalysisConfig::default().with_entry_pattern("ERROR|FATAL").compile().unwrap();
        let classifier = patterns.classifier();
        assert!(classifier.is_block_start("FATAL"));
        assert!(!classifier.is_block_start("ERROR and more"));
        assert!(!classifier.is_block_start("oh no FATAL"));
    }
}
