use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Run-wide behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
  /// Report every passed token, not only failures.
  pub log_all_passed_tokens: bool,
  /// Signal failure to the host when any case failed or was invalid.
  pub terminate_host_on_failure: bool,
  /// Treat the grammar source as a JSON document instead of a path.
  pub grammar_is_inline_document: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      log_all_passed_tokens: false,
      terminate_host_on_failure: true,
      grammar_is_inline_document: false,
    }
  }
}

/// Per-case override; unset fields keep whatever value is currently active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsOverride {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub log_all_passed_tokens: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub terminate_host_on_failure: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub grammar_is_inline_document: Option<bool>,
}

impl Options {
  pub fn merged(&self, over: &OptionsOverride) -> Options {
    Options {
      log_all_passed_tokens: over
        .log_all_passed_tokens
        .unwrap_or(self.log_all_passed_tokens),
      terminate_host_on_failure: over
        .terminate_host_on_failure
        .unwrap_or(self.terminate_host_on_failure),
      grammar_is_inline_document: over
        .grammar_is_inline_document
        .unwrap_or(self.grammar_is_inline_document),
    }
  }

  /// Applies `over` and returns the full option set that was active before.
  pub fn apply_override(&mut self, over: &OptionsOverride) -> Options {
    let prior = *self;
    *self = self.merged(over);
    prior
  }

  pub fn restore(&mut self, prior: Options) {
    *self = prior;
  }

  /// Applies `over` until the returned guard is dropped.
  pub fn scoped(&mut self, over: Option<&OptionsOverride>) -> OptionScope<'_> {
    let prior = match over {
      Some(over) => self.apply_override(over),
      None => *self,
    };
    OptionScope { slot: self, prior }
  }
}

/// Restores the captured options when dropped, including during unwinding.
pub struct OptionScope<'a> {
  slot: &'a mut Options,
  prior: Options,
}

impl Deref for OptionScope<'_> {
  type Target = Options;

  fn deref(&self) -> &Options {
    self.slot
  }
}

impl Drop for OptionScope<'_> {
  fn drop(&mut self) {
    self.slot.restore(self.prior);
  }
}
