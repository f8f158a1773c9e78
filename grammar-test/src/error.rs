use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to resolve, parse, or hand a grammar to the tokenizer backend.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("cannot read grammar {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("malformed grammar document: {0}")]
  Document(#[from] serde_json::Error),
  #[error("grammar document has no string `scopeName`")]
  MissingScopeName,
  #[error("tokenizer backend rejected grammar `{scope}`: {message}")]
  Backend { scope: String, message: String },
}

/// A diagnostic event that could not be delivered.
#[derive(Debug, Error)]
pub enum SinkError {
  #[error(transparent)]
  Io(#[from] io::Error),
  #[error("cannot render diagnostic: {0}")]
  Render(String),
}

#[derive(Debug, Error)]
#[error("failed to parse suite as TOML ({toml}) or JSON ({json})")]
pub struct SuiteError {
  pub toml: String,
  pub json: String,
}
