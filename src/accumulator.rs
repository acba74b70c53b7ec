use lazy_static::lazy_static;
use regex::Regex;

use crate::ContinuationPolicy;

lazy_static! {
    /// Lines from other log levels, which end an error block under [`ContinuationPolicy::LevelAware`].
    static ref OTHER_LEVEL: Regex = Regex::new(r"^(?:DEBUG|WARN|INFO|TRACE)").unwrap();
    /// Stack trace lines, the only continuations under [`ContinuationPolicy::Strict`].
    static ref STACK_FRAME: Regex = Regex::new(r"^\s*(?:at |Caused by:|\.\.\. \d+ more)").unwrap();
}

/// The lines of one error occurrence, in file order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBlock {
    lines: Vec<String>,
}

impl ErrorBlock {
    fn new(first_line: String) -> Self {
        Self { lines: vec![first_line] }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The block's lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// What the accumulator did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Opened a new block, finalizing any block that was open.
    Started,
    /// Appended to the open block.
    Continued,
    /// Finalized the open block. The line itself belongs to no block.
    Closed,
    /// No block was open and the line didn't start one.
    Ignored,
}

#[derive(Debug)]
enum State {
    Idle,
    Accumulating(ErrorBlock),
}

/// Assembles consecutive lines into error blocks.
///
/// Block starts always force-close the open block. What a non-start line does to an open block
/// depends on the [`ContinuationPolicy`].
#[derive(Debug)]
pub struct BlockAccumulator {
    policy: ContinuationPolicy,
    state: State,
}

impl BlockAccumulator {
    pub fn new(policy: ContinuationPolicy) -> Self {
        Self {
            policy,
            state: State::Idle,
        }
    }

    pub fn is_accumulating(&self) -> bool {
        matches!(self.state, State::Accumulating(_))
    }

    /// Feed one line, already classified by the caller. Returns what happened to the line, and the
    /// block it finalized, if any.
    pub fn push(&mut self, line: String, is_block_start: bool) -> (Disposition, Option<ErrorBlock>) {
        if is_block_start {
            let finished = self.take();
            self.state = State::Accumulating(ErrorBlock::new(line));
            return (Disposition::Started, finished);
        }
        match &mut self.state {
            State::Idle => (Disposition::Ignored, None),
            State::Accumulating(block) => {
                if continues_block(self.policy, &line) {
                    block.lines.push(line);
                    (Disposition::Continued, None)
                } else {
                    (Disposition::Closed, self.take())
                }
            }
        }
    }

    /// End of input. Returns the open block, if there is one.
    pub fn finish(mut self) -> Option<ErrorBlock> {
        self.take()
    }

    fn take(&mut self) -> Option<ErrorBlock> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => None,
            State::Accumulating(block) => Some(block),
        }
    }
}

fn continues_block(policy: ContinuationPolicy, line: &str) -> bool {
    match policy {
        ContinuationPolicy::Greedy => true,
        ContinuationPolicy::LevelAware => !OTHER_LEVEL.is_match(line),
        ContinuationPolicy::Strict => STACK_FRAME.is_match(line),
    }
}
