use serde::{Deserialize, Serialize};

/// Counters accumulated over every case an engine has run.
///
/// `cases` counts only cases that were compared; cases rejected as invalid are
/// counted in `errors` instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
  pub cases: usize,
  pub passed_cases: usize,
  pub failed_cases: usize,
  pub errors: usize,
  pub lines: usize,
  pub passed_lines: usize,
  pub failed_lines: usize,
  pub tokens: usize,
  pub passed_tokens: usize,
  pub failed_tokens: usize,
}

impl Stats {
  pub fn has_failures(&self) -> bool {
    self.failed_cases > 0 || self.errors > 0
  }
}

/// Owner of the live [`Stats`]. Only the comparator increments.
#[derive(Debug, Default)]
pub struct StatsAggregator {
  stats: Stats,
}

impl StatsAggregator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn snapshot(&self) -> Stats {
    self.stats
  }

  pub(crate) fn record_error(&mut self) {
    self.stats.errors += 1;
  }

  pub(crate) fn record_token(&mut self, passed: bool) {
    self.stats.tokens += 1;
    if passed {
      self.stats.passed_tokens += 1;
    } else {
      self.stats.failed_tokens += 1;
    }
  }

  pub(crate) fn record_line(&mut self, passed: bool) {
    self.stats.lines += 1;
    if passed {
      self.stats.passed_lines += 1;
    } else {
      self.stats.failed_lines += 1;
    }
  }

  pub(crate) fn record_case(&mut self, passed: bool) {
    self.stats.cases += 1;
    if passed {
      self.stats.passed_cases += 1;
    } else {
      self.stats.failed_cases += 1;
    }
  }
}
