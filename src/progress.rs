//! Read-only observers of how far an analysis run has got.

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::sync::{
    atomic::{AtomicU64, AtomicU8, Ordering},
    Arc,
};

/// Told after every line how many lines have been processed so far. Observers can't influence
/// the run.
pub trait ProgressObserver {
    fn on_progress(&self, processed: u64, total: Option<u64>);
}

impl ProgressObserver for () {
    fn on_progress(&self, _processed: u64, _total: Option<u64>) {}
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for &T {
    fn on_progress(&self, processed: u64, total: Option<u64>) {
        (**self).on_progress(processed, total)
    }
}

/// Processed-line counter that can be read from any thread while the run goes on.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter {
    processed: Arc<AtomicU64>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }
}

impl ProgressObserver for ProgressCounter {
    fn on_progress(&self, processed: u64, _total: Option<u64>) {
        // fetch_max keeps the counter monotonic even if an older value arrives late
        self.processed.fetch_max(processed, Ordering::Relaxed);
    }
}

/// Logs a line at every 10% step. Needs a total to do anything.
#[derive(Debug, Default)]
pub struct LogProgress {
    last_step: AtomicU8,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&self, processed: u64, total: Option<u64>) {
        let total = match total {
            Some(total) if total > 0 => total,
            _ => return,
        };
        let percent = (processed.min(total) * 100 / total) as u8;
        let step = percent / 10;
        if step > self.last_step.load(Ordering::Relaxed) {
            self.last_step.store(step, Ordering::Relaxed);
            info!("{}% of lines processed ({}/{})", percent, processed, total);
        }
    }
}

/// Terminal progress bar on stderr, for interactive runs.
#[derive(Clone)]
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {percent:>3}% ({pos}/{len} lines)") {
            bar.set_style(style);
        }
        Self { bar }
    }

    /// A bar that tracks position but never draws.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarProgress {
    fn on_progress(&self, processed: u64, total: Option<u64>) {
        if let Some(total) = total {
            if self.bar.length() != Some(total) {
                self.bar.set_length(total);
            }
        }
        if processed > self.bar.position() {
            self.bar.set_position(processed);
        }
    }
}
