use crate::error::SuiteError;
use crate::options::OptionsOverride;
use serde::{Deserialize, Serialize};

/// Expected scope suffixes for one token, appended after the root scope.
pub type ScopeChain = Vec<String>;

/// Source lines of a case, either already split or as one newline-joined string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaseText {
  Lines(Vec<String>),
  Compact(String),
}

/// Expected scopes of a case.
///
/// The compact form separates rows with `\n`, token groups within a row with
/// `|` and scope suffixes within a group with a space:
/// `"meta.selector|punctuation.end\n"` describes two lines, the first with two
/// tokens and the second with none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CaseExpect {
  Structured(Vec<Vec<ScopeChain>>),
  Compact(String),
}

impl CaseText {
  pub fn into_lines(self) -> Vec<String> {
    match self {
      CaseText::Lines(lines) => lines,
      CaseText::Compact(raw) => raw.split('\n').map(str::to_string).collect(),
    }
  }
}

impl CaseExpect {
  pub fn into_rows(self) -> Vec<Vec<ScopeChain>> {
    match self {
      CaseExpect::Structured(rows) => rows,
      CaseExpect::Compact(raw) => raw.split('\n').map(parse_row).collect(),
    }
  }
}

// An empty row has no token groups; an empty group is a chain with no suffixes.
// Stray spaces inside a group are kept as empty suffixes so they fail comparison.
fn parse_row(row: &str) -> Vec<ScopeChain> {
  if row.is_empty() {
    return Vec::new();
  }
  row
    .split('|')
    .map(|group| {
      if group.is_empty() {
        return Vec::new();
      }
      group.split(' ').map(str::to_string).collect()
    })
    .collect()
}

impl From<&str> for CaseText {
  fn from(raw: &str) -> Self {
    CaseText::Compact(raw.to_string())
  }
}

impl From<String> for CaseText {
  fn from(raw: String) -> Self {
    CaseText::Compact(raw)
  }
}

impl From<Vec<String>> for CaseText {
  fn from(lines: Vec<String>) -> Self {
    CaseText::Lines(lines)
  }
}

impl From<Vec<&str>> for CaseText {
  fn from(lines: Vec<&str>) -> Self {
    CaseText::Lines(lines.into_iter().map(str::to_string).collect())
  }
}

impl<const N: usize> From<[&str; N]> for CaseText {
  fn from(lines: [&str; N]) -> Self {
    CaseText::Lines(lines.into_iter().map(str::to_string).collect())
  }
}

impl From<&str> for CaseExpect {
  fn from(raw: &str) -> Self {
    CaseExpect::Compact(raw.to_string())
  }
}

impl From<String> for CaseExpect {
  fn from(raw: String) -> Self {
    CaseExpect::Compact(raw)
  }
}

impl From<Vec<Vec<ScopeChain>>> for CaseExpect {
  fn from(rows: Vec<Vec<ScopeChain>>) -> Self {
    CaseExpect::Structured(rows)
  }
}

impl From<Vec<Vec<Vec<&str>>>> for CaseExpect {
  fn from(rows: Vec<Vec<Vec<&str>>>) -> Self {
    CaseExpect::Structured(
      rows
        .into_iter()
        .map(|row| {
          row
            .into_iter()
            .map(|chain| chain.into_iter().map(str::to_string).collect())
            .collect()
        })
        .collect(),
    )
  }
}

/// A case as registered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDescriptor {
  pub name: String,
  pub text: CaseText,
  pub expect: CaseExpect,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<OptionsOverride>,
}

impl CaseDescriptor {
  pub fn new(
    name: impl Into<String>,
    text: impl Into<CaseText>,
    expect: impl Into<CaseExpect>,
  ) -> Self {
    Self {
      name: name.into(),
      text: text.into(),
      expect: expect.into(),
      options: None,
    }
  }

  pub fn with_options(mut self, options: OptionsOverride) -> Self {
    self.options = Some(options);
    self
  }

  /// Splits the case into its normalized form and its option override.
  pub fn normalize(self) -> (NormalizedCase, Option<OptionsOverride>) {
    let case = NormalizedCase {
      name: self.name,
      text: self.text.into_lines(),
      expect: self.expect.into_rows(),
    };
    (case, self.options)
  }
}

/// A case with both `text` and `expect` in structured form.
///
/// Nothing here guarantees the two have the same number of lines; that is
/// checked when the case is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCase {
  pub name: String,
  pub text: Vec<String>,
  pub expect: Vec<Vec<ScopeChain>>,
}

#[derive(Debug, Deserialize)]
struct RawSuite {
  #[serde(default)]
  cases: Vec<CaseDescriptor>,
}

/// Parses a list of cases from a TOML document (`[[cases]]` tables), falling
/// back to JSON of the same shape.
pub fn parse_suite(raw: &str) -> Result<Vec<CaseDescriptor>, SuiteError> {
  let suite = match toml::from_str::<RawSuite>(raw) {
    Ok(suite) => suite,
    Err(toml_err) => serde_json::from_str::<RawSuite>(raw).map_err(|json_err| SuiteError {
      toml: toml_err.to_string(),
      json: json_err.to_string(),
    })?,
  };
  Ok(suite.cases)
}
