use crate::options::Options;
use crate::stats::Stats;
use serde::{Deserialize, Serialize};
use std::process::ExitCode;

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Final word on a run: its statistics and whether the host should report failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
  pub schema_version: u32,
  pub stats: Stats,
  pub success: bool,
}

impl RunReport {
  pub fn new(stats: Stats, options: &Options) -> Self {
    Self {
      schema_version: REPORT_SCHEMA_VERSION,
      stats,
      success: !(options.terminate_host_on_failure && stats.has_failures()),
    }
  }

  pub fn exit_code(&self) -> ExitCode {
    if self.success {
      ExitCode::SUCCESS
    } else {
      ExitCode::FAILURE
    }
  }
}
