use log::{debug, info, warn};
use std::{io, path::Path};

use crate::{
    accumulator::{BlockAccumulator, Disposition, ErrorBlock},
    source, AggregationTable, Aggregator, AnalysisConfig, Normalizer, Patterns, ProgressObserver, Result,
};

/// Line and block tallies for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub lines: u64,
    /// Finalized blocks, one per block-start line.
    pub blocks: u64,
    /// Lines that belonged to no block.
    pub ignored: u64,
}

/// Drives classification, accumulation, normalization and aggregation over a line source.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    patterns: Patterns,
}

impl AnalysisEngine {
    pub fn new(patterns: Patterns) -> Self {
        Self { patterns }
    }

    /// Compile the configured patterns and build an engine. Fails before any line is read.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self> {
        Ok(Self::new(config.compile()?))
    }

    pub fn analyze<I>(&self, lines: I) -> Result<AggregationTable>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        self.analyze_with(lines, (), None)
    }

    /// Like [`analyze`](Self::analyze), reporting progress after every line.
    pub fn analyze_with<I, O>(&self, lines: I, observer: O, total: Option<u64>) -> Result<AggregationTable>
    where
        I: IntoIterator<Item = io::Result<String>>,
        O: ProgressObserver,
    {
        self.analyze_with_stats(lines, observer, total).map(|(table, _)| table)
    }

    pub fn analyze_with_stats<I, O>(
        &self,
        lines: I,
        observer: O,
        total: Option<u64>,
    ) -> Result<(AggregationTable, RunStats)>
    where
        I: IntoIterator<Item = io::Result<String>>,
        O: ProgressObserver,
    {
        let classifier = self.patterns.classifier();
        let normalizer = self.patterns.normalizer();
        let mut accumulator = BlockAccumulator::new(self.patterns.continuation());
        let mut aggregator = Aggregator::new();
        let mut stats = RunStats::default();
        info!("Starting analysis ({} continuation)", self.patterns.continuation());

        for line in lines {
            // A failed read drops everything gathered so far, a partial table would under-count
            let line = line?;
            let is_start = classifier.is_block_start(&line);
            let (disposition, finished) = accumulator.push(line, is_start);
            if let Some(block) = finished {
                finalize(&normalizer, &mut aggregator, &mut stats, block);
            }
            if disposition == Disposition::Ignored || disposition == Disposition::Closed {
                stats.ignored += 1;
            }
            stats.lines += 1;
            observer.on_progress(stats.lines, total);
        }
        if let Some(block) = accumulator.finish() {
            finalize(&normalizer, &mut aggregator, &mut stats, block);
        }

        let table = aggregator.into_table();
        info!(
            "Processed {} lines: {} error blocks, {} distinct signatures, {} lines outside any block",
            stats.lines,
            stats.blocks,
            table.len(),
            stats.ignored
        );
        if stats.blocks == 0 && stats.lines > 0 {
            warn!("No line matched the entry pattern");
        }
        Ok((table, stats))
    }

    pub fn analyze_str(&self, text: &str) -> Result<AggregationTable> {
        self.analyze(source::str_lines(text))
    }

    /// Analyze a file in a single pass.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<AggregationTable> {
        let path = path.as_ref();
        debug!("Reading {}", path.display());
        self.analyze(source::read_lines(path)?)
    }
}

fn finalize(normalizer: &Normalizer<'_>, aggregator: &mut Aggregator, stats: &mut RunStats, block: ErrorBlock) {
    let signature = normalizer.normalize(&block.text());
    if signature.as_str().is_empty() {
        warn!("Error block normalized to an empty signature: {:?}", block.lines().first());
    }
    debug!("Block of {} lines -> {}", block.lines().len(), signature.headline());
    aggregator.record(signature);
    stats.blocks += 1;
}

/// Compile `config` and analyze `lines` with it. An invalid pattern fails before the first line is
/// pulled from `lines`.
pub fn analyze<I>(lines: I, config: &AnalysisConfig) -> Result<AggregationTable>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    AnalysisEngine::from_config(config)?.analyze(lines)
}
