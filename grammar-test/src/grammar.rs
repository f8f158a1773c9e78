use crate::error::LoadError;
use serde_json::Value;
use std::path::PathBuf;

/// Where a grammar comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarSource {
  /// A grammar document on disk, resolved by path.
  Named(PathBuf),
  /// A serialized JSON grammar document.
  Inline(String),
}

impl GrammarSource {
  /// Interprets `raw` according to the inline-document flag.
  pub fn from_raw(raw: impl Into<String>, inline: bool) -> Self {
    let raw = raw.into();
    if inline {
      GrammarSource::Inline(raw)
    } else {
      GrammarSource::Named(PathBuf::from(raw))
    }
  }

  /// Identifier used when reporting a load failure.
  pub fn describe(&self) -> String {
    match self {
      GrammarSource::Named(path) => path.display().to_string(),
      GrammarSource::Inline(_) => "<inline grammar>".to_string(),
    }
  }
}

/// A loaded scope-rule grammar. Read-only once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
  scope_name: String,
  document: Value,
}

impl Grammar {
  pub fn from_document(document: Value) -> Result<Self, LoadError> {
    let scope_name = document
      .get("scopeName")
      .and_then(Value::as_str)
      .ok_or(LoadError::MissingScopeName)?
      .to_string();
    Ok(Self {
      scope_name,
      document,
    })
  }

  pub fn from_json(raw: &str) -> Result<Self, LoadError> {
    Self::from_document(serde_json::from_str(raw)?)
  }

  /// The root scope identifier every expected chain is prefixed with.
  pub fn scope_name(&self) -> &str {
    &self.scope_name
  }

  /// The full grammar document, as handed to the tokenizer backend.
  pub fn document(&self) -> &Value {
    &self.document
  }

  pub async fn load(source: &GrammarSource) -> Result<Self, LoadError> {
    match source {
      GrammarSource::Inline(raw) => Self::from_json(raw),
      GrammarSource::Named(path) => {
        let raw = tokio::fs::read_to_string(path)
          .await
          .map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
          })?;
        Self::from_json(&raw)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_scope_name_from_document() {
    let grammar = Grammar::from_json(r#"{"scopeName":"source.css","patterns":[]}"#).unwrap();
    assert_eq!(grammar.scope_name(), "source.css");
    assert!(grammar.document()["patterns"].is_array());
  }

  #[test]
  fn rejects_document_without_scope_name() {
    let err = Grammar::from_json(r#"{"patterns":[]}"#).unwrap_err();
    assert!(matches!(err, LoadError::MissingScopeName));

    let err = Grammar::from_json(r#"{"scopeName":3}"#).unwrap_err();
    assert!(matches!(err, LoadError::MissingScopeName));
  }

  #[test]
  fn rejects_malformed_document() {
    let err = Grammar::from_json("{scopeName:").unwrap_err();
    assert!(matches!(err, LoadError::Document(_)));
  }

  #[test]
  fn source_follows_inline_flag() {
    assert_eq!(
      GrammarSource::from_raw("syntaxes/css.json", false),
      GrammarSource::Named(PathBuf::from("syntaxes/css.json"))
    );
    assert_eq!(
      GrammarSource::from_raw("{}", true),
      GrammarSource::Inline("{}".to_string())
    );
  }

  #[tokio::test]
  async fn loads_named_grammar_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sass.json");
    std::fs::write(&path, r#"{"scopeName":"source.sass"}"#).unwrap();

    let grammar = Grammar::load(&GrammarSource::Named(path)).await.unwrap();
    assert_eq!(grammar.scope_name(), "source.sass");
  }

  #[tokio::test]
  async fn missing_named_grammar_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = Grammar::load(&GrammarSource::Named(path.clone()))
      .await
      .unwrap_err();
    match err {
      LoadError::Io { path: reported, .. } => assert_eq!(reported, path),
      other => panic!("unexpected error {other:?}"),
    }
  }
}
