use regex::{NoExpand, Regex};
use std::{borrow::Borrow, fmt};

/// Normalized text of an error block. Two blocks with equal signatures are the same error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// First line of the signature, handy for one-line listings.
    pub fn headline(&self) -> &str {
        self.0.lines().next().unwrap_or("")
    }
}

impl From<String> for Signature {
    fn from(text: String) -> Self {
        Signature(text)
    }
}

impl From<&str> for Signature {
    fn from(text: &str) -> Self {
        Signature(text.to_owned())
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Signature {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips variable content (timestamps, worker ids) out of block text.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    pattern: &'a Regex,
    replacement: &'a str,
}

impl<'a> Normalizer<'a> {
    pub fn new(pattern: &'a Regex, replacement: &'a str) -> Self {
        Self { pattern, replacement }
    }

    /// Replace every match with the replacement literal, then trim surrounding whitespace.
    pub fn normalize(&self, text: &str) -> Signature {
        let replaced = self.pattern.replace_all(text, NoExpand(self.replacement));
        Signature(replaced.trim().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisConfig;

    fn normalize_default(text: &str) -> Signature {
        let patterns = AnalysisConfig::default().compile().unwrap();
        patterns.normalizer().normalize(text)
    }

    #[test]
    fn test_strips_plain_timestamp() {
        assert_eq!(normalize_default("ERROR 2024-01-01 00:00:00 boom").as_str(), "ERROR boom");
    }

    #[test]
    fn test_strips_millis_and_worker_id() {
        let a = normalize_default("ERROR 2023-05-06 10:11:12,345 [Webcontainer:7] NullPointerException\n\tat a.B.c()");
        let b = normalize_default("ERROR 2023-06-01 23:59:01,001 [Webcontainer:12] NullPointerException\n\tat a.B.c()");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "ERROR NullPointerException\n\tat a.B.c()");
        assert_eq!(a.headline(), "ERROR NullPointerException");
    }

    #[test]
    fn test_differences_outside_the_pattern_survive() {
        let a = normalize_default("ERROR 2024-01-01 00:00:00 boom\nat foo.bar()");
        let b = normalize_default("ERROR 2024-01-01 00:00:00 boom\nat foo.baz()");
        assert_ne!(a, b);
    }

    #[test]
    fn test_replacement_is_literal() {
        let patterns = AnalysisConfig::default()
            .with_normalization_pattern(r"(\d+)")
            .with_replacement("$1<n>")
            .compile()
            .unwrap();
        assert_eq!(patterns.normalizer().normalize("  worker 17 died  ").as_str(), "worker $1<n> died");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_default("ERROR 2024-01-01 00:00:00.123 [main] boom\n");
        let twice = normalize_default(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(normalize_default("").as_str(), "");
    }
}
