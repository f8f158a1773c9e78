//! The boundary to the grammar engine that actually assigns scopes.
//!
//! Pattern matching, rule nesting and multi-line continuation all live behind
//! [`Tokenizer`]; the harness only drives it one line at a time and compares
//! what comes back.

use crate::grammar::Grammar;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// One span of a line together with the scope chain assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
  /// Byte offset of the first character, relative to the line.
  pub start: usize,
  /// Byte offset one past the last character, relative to the line.
  pub end: usize,
  /// Root scope first, most specific last.
  pub scopes: Vec<String>,
}

impl Token {
  pub fn new(start: usize, end: usize, scopes: Vec<String>) -> Self {
    Self { start, end, scopes }
  }
}

/// Output of tokenizing a single line.
#[derive(Debug, Clone)]
pub struct LineTokens<S> {
  pub tokens: Vec<Token>,
  /// Rule stack to pass in with the following line.
  pub next_state: S,
}

/// A grammar ready to tokenize.
///
/// Implementations must be deterministic: the same line and state always
/// yield the same tokens and next state.
pub trait Tokenizer {
  /// Opaque rule stack carried from one line to the next.
  type State: Clone;

  /// The rule stack at the start of input, with no open multi-line constructs.
  fn initial_state(&self) -> Self::State;

  fn tokenize_line(&self, line: &str, state: &Self::State) -> LineTokens<Self::State>;
}

/// Builds a [`Tokenizer`] from a loaded grammar.
///
/// Setup may need to fetch further resources (included grammars, regex
/// engines), so it is asynchronous and fallible.
pub trait TokenizerBackend {
  type Tokenizer: Tokenizer;

  fn load(&self, grammar: &Grammar)
    -> impl Future<Output = anyhow::Result<Self::Tokenizer>>;
}
