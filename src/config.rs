use log::debug;
use regex::Regex;
use regex_syntax::hir::{Hir, Look};
use std::{fmt, str::FromStr};

use crate::{classifier::LineClassifier, normalizer::Normalizer, Error, PatternRole, Result};

/// Entry pattern used when the caller doesn't supply one.
pub const DEFAULT_ENTRY_PATTERN: &str = r"^(ERROR) .*";

/// Timestamp, optional milliseconds, optional bracketed worker id, and the space after them.
pub const DEFAULT_NORMALIZATION_PATTERN: &str =
    r"\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}(?:[,.]\d{3})?(?: \[[^\]]*\])? ?";

/// Decides what happens to a line that is not a block start while a block is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinuationPolicy {
    /// Every non-start line continues the open block.
    Greedy,
    /// A line that starts with another log level (`DEBUG`, `WARN`, `INFO`, `TRACE`) closes the block,
    /// anything else continues it.
    LevelAware,
    /// Only stack frame lines (`at ...`, `Caused by: ...`, `... N more`) continue the block.
    Strict,
}

impl Default for ContinuationPolicy {
    fn default() -> Self {
        ContinuationPolicy::LevelAware
    }
}

impl FromStr for ContinuationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(ContinuationPolicy::Greedy),
            "level-aware" | "level_aware" | "levelaware" => Ok(ContinuationPolicy::LevelAware),
            "strict" => Ok(ContinuationPolicy::Strict),
            other => Err(format!("unknown continuation policy '{}' (expected greedy, level-aware or strict)", other)),
        }
    }
}

impl fmt::Display for ContinuationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContinuationPolicy::Greedy => "greedy",
            ContinuationPolicy::LevelAware => "level-aware",
            ContinuationPolicy::Strict => "strict",
        })
    }
}

/// Raw, uncompiled settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub entry_pattern: String,
    pub normalization_pattern: String,
    /// Literal inserted in place of every normalization match. Not subject to `$group` expansion.
    pub replacement: String,
    pub continuation: ContinuationPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            entry_pattern: DEFAULT_ENTRY_PATTERN.to_owned(),
            normalization_pattern: DEFAULT_NORMALIZATION_PATTERN.to_owned(),
            replacement: String::new(),
            continuation: ContinuationPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_entry_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.entry_pattern = pattern.into();
        self
    }

    pub fn with_normalization_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.normalization_pattern = pattern.into();
        self
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    pub fn with_continuation(mut self, continuation: ContinuationPolicy) -> Self {
        self.continuation = continuation;
        self
    }

    /// Compile both patterns. This is the only place regexes are built for a run.
    pub fn compile(&self) -> Result<Patterns> {
        compile_pattern(PatternRole::Entry, &self.entry_pattern, &self.entry_pattern)?;
        let entry = compile_pattern(PatternRole::Entry, &self.entry_pattern, &anchored(&self.entry_pattern)?)?;
        let normalization =
            compile_pattern(PatternRole::Normalization, &self.normalization_pattern, &self.normalization_pattern)?;
        Ok(Patterns {
            entry,
            normalization,
            replacement: self.replacement.clone(),
            continuation: self.continuation,
        })
    }
}

/// Wrap `pattern` in start and end of text anchors. Works on the parsed form, so flags and
/// comments in the user's text can't leak into the anchors.
fn anchored(pattern: &str) -> Result<String> {
    let hir = regex_syntax::Parser::new().parse(pattern).map_err(|error| Error::Configuration {
        role: PatternRole::Entry,
        pattern: pattern.to_owned(),
        source: regex::Error::Syntax(error.to_string()),
    })?;
    Ok(Hir::concat(vec![Hir::look(Look::Start), hir, Hir::look(Look::End)]).to_string())
}

fn compile_pattern(role: PatternRole, original: &str, source: &str) -> Result<Regex> {
    let regex = Regex::new(source).map_err(|error| Error::Configuration {
        role,
        pattern: original.to_owned(),
        source: error,
    })?;
    debug!("compiled {} pattern: {}", role, source);
    Ok(regex)
}

/// Compiled, immutable patterns for one run.
#[derive(Debug, Clone)]
pub struct Patterns {
    /// Entry pattern anchored at both ends so it only ever matches a whole line.
    pub(crate) entry: Regex,
    pub(crate) normalization: Regex,
    pub(crate) replacement: String,
    pub(crate) continuation: ContinuationPolicy,
}

impl Patterns {
    pub fn continuation(&self) -> ContinuationPolicy {
        self.continuation
    }

    pub fn classifier(&self) -> LineClassifier<'_> {
        LineClassifier::new(&self.entry)
    }

    pub fn normalizer(&self) -> Normalizer<'_> {
        Normalizer::new(&self.normalization, &self.replacement)
    }
}
