#![allow(dead_code)]

use anyhow::bail;
use grammar_test::Grammar;
use grammar_test::LineTokens;
use grammar_test::Token;
use grammar_test::Tokenizer;
use grammar_test::TokenizerBackend;
use std::cell::Cell;
use std::collections::HashMap;

/// Returns canned scope chains per line; the root scope is prepended.
pub struct ScriptedTokenizer {
  root: String,
  script: HashMap<String, Vec<Vec<String>>>,
}

impl ScriptedTokenizer {
  pub fn new(root: &str) -> Self {
    Self {
      root: root.to_string(),
      script: HashMap::new(),
    }
  }

  pub fn line(mut self, line: &str, chains: &[&[&str]]) -> Self {
    let chains = chains
      .iter()
      .map(|chain| {
        std::iter::once(self.root.clone())
          .chain(chain.iter().map(|s| s.to_string()))
          .collect()
      })
      .collect();
    self.script.insert(line.to_string(), chains);
    self
  }
}

impl Tokenizer for ScriptedTokenizer {
  type State = ();

  fn initial_state(&self) -> Self::State {}

  fn tokenize_line(&self, line: &str, _state: &()) -> LineTokens<()> {
    let tokens = self
      .script
      .get(line)
      .map(|chains| {
        chains
          .iter()
          .map(|scopes| Token::new(0, line.len(), scopes.clone()))
          .collect()
      })
      .unwrap_or_default();
    LineTokens {
      tokens,
      next_state: (),
    }
  }
}

/// Words separated by spaces, plus `/* ... */` block comments that may span lines.
///
/// Every word is scoped `word`; comment text is scoped `comment.block`.
pub struct CommentTokenizer {
  pub root: String,
  pub resets: Cell<usize>,
}

impl CommentTokenizer {
  pub fn new(root: &str) -> Self {
    Self {
      root: root.to_string(),
      resets: Cell::new(0),
    }
  }

  fn scopes(&self, scope: &str) -> Vec<String> {
    vec![self.root.clone(), scope.to_string()]
  }
}

impl Tokenizer for CommentTokenizer {
  /// Inside a block comment.
  type State = bool;

  fn initial_state(&self) -> bool {
    self.resets.set(self.resets.get() + 1);
    false
  }

  fn tokenize_line(&self, line: &str, state: &bool) -> LineTokens<bool> {
    let mut tokens = Vec::new();
    let mut in_comment = *state;
    let mut pos = 0;
    while pos < line.len() {
      let rest = &line[pos..];
      if in_comment {
        let end = rest.find("*/").map(|i| pos + i + 2).unwrap_or(line.len());
        tokens.push(Token::new(pos, end, self.scopes("comment.block")));
        in_comment = !rest.contains("*/");
        pos = end;
        continue;
      }
      if rest.starts_with(' ') {
        pos += 1;
        continue;
      }
      if let Some(inner) = rest.strip_prefix("/*") {
        let end = inner.find("*/").map(|i| pos + 2 + i + 2).unwrap_or(line.len());
        tokens.push(Token::new(pos, end, self.scopes("comment.block")));
        in_comment = !inner.contains("*/");
        pos = end;
        continue;
      }
      let len = rest.find(' ').unwrap_or(rest.len());
      tokens.push(Token::new(pos, pos + len, self.scopes("word")));
      pos += len;
    }
    LineTokens {
      tokens,
      next_state: in_comment,
    }
  }
}

/// Builds a [`CommentTokenizer`] rooted at the grammar's scope.
pub struct CommentBackend {
  pub fail: bool,
}

impl TokenizerBackend for CommentBackend {
  type Tokenizer = CommentTokenizer;

  async fn load(&self, grammar: &Grammar) -> anyhow::Result<CommentTokenizer> {
    if self.fail {
      bail!("regex engine unavailable");
    }
    Ok(CommentTokenizer::new(grammar.scope_name()))
  }
}

pub fn grammar(scope: &str) -> Grammar {
  Grammar::from_json(&format!(r#"{{"scopeName":"{scope}","patterns":[]}}"#)).unwrap()
}
