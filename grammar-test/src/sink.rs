use crate::error::SinkError;
use crate::stats::Stats;
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// Byte range of a token within its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
  pub start: usize,
  pub end: usize,
}

/// Outcome of comparing one token position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenReport {
  pub case: String,
  pub line_index: usize,
  pub token_index: usize,
  /// Source text of the line the token belongs to.
  pub line: String,
  /// Absent when the tokenizer produced no token at this position.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub span: Option<Span>,
  /// Full expected chain including the root scope; absent when nothing was expected here.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub expected: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub actual: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
  Invalid { subject: String, reason: String },
  TokenFailed(TokenReport),
  TokenPassed(TokenReport),
  CaseFailed { case: String, failed_tokens: usize },
  CasePassed { case: String },
  Stats(Stats),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
  Invalid,
  Failed,
  Passed,
  Stats,
}

impl Event {
  pub fn kind(&self) -> EventKind {
    match self {
      Event::Invalid { .. } => EventKind::Invalid,
      Event::TokenFailed(_) | Event::CaseFailed { .. } => EventKind::Failed,
      Event::TokenPassed(_) | Event::CasePassed { .. } => EventKind::Passed,
      Event::Stats(_) => EventKind::Stats,
    }
  }
}

impl fmt::Display for EventKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let value = match self {
      EventKind::Invalid => "invalid",
      EventKind::Failed => "failed",
      EventKind::Passed => "passed",
      EventKind::Stats => "stats",
    };
    f.write_str(value)
  }
}

/// Receives everything the engine has to say about a run.
pub trait DiagnosticSink {
  fn report(&mut self, event: &Event) -> Result<(), SinkError>;
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
  fn report(&mut self, event: &Event) -> Result<(), SinkError> {
    (**self).report(event)
  }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Box<S> {
  fn report(&mut self, event: &Event) -> Result<(), SinkError> {
    (**self).report(event)
  }
}

/// Keeps every event in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
  events: Vec<Event>,
}

impl RecordingSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn events(&self) -> &[Event] {
    &self.events
  }

  pub fn kinds(&self) -> Vec<EventKind> {
    self.events.iter().map(Event::kind).collect()
  }

  pub fn into_events(self) -> Vec<Event> {
    self.events
  }
}

impl DiagnosticSink for RecordingSink {
  fn report(&mut self, event: &Event) -> Result<(), SinkError> {
    self.events.push(event.clone());
    Ok(())
  }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
  fn report(&mut self, event: &Event) -> Result<(), SinkError> {
    match event {
      Event::Invalid { subject, reason } => tracing::error!(%subject, %reason, "invalid"),
      Event::TokenFailed(report) => tracing::warn!(
        case = %report.case,
        line = report.line_index,
        token = report.token_index,
        expected = ?report.expected,
        actual = ?report.actual,
        "token failed"
      ),
      Event::TokenPassed(report) => tracing::debug!(
        case = %report.case,
        line = report.line_index,
        token = report.token_index,
        "token passed"
      ),
      Event::CaseFailed {
        case,
        failed_tokens,
      } => tracing::warn!(%case, failed_tokens, "case failed"),
      Event::CasePassed { case } => tracing::debug!(%case, "case passed"),
      Event::Stats(stats) => tracing::info!(?stats, "grammar test statistics"),
    }
    Ok(())
  }
}

/// Renders events as plain text blocks.
pub struct TextSink<W> {
  out: W,
}

impl<W: Write> TextSink<W> {
  pub fn new(out: W) -> Self {
    Self { out }
  }

  pub fn into_inner(self) -> W {
    self.out
  }
}

impl<W: Write> DiagnosticSink for TextSink<W> {
  fn report(&mut self, event: &Event) -> Result<(), SinkError> {
    let rendered = render_event(event)?;
    self.out.write_all(rendered.as_bytes())?;
    Ok(())
  }
}

fn render_event(event: &Event) -> Result<String, SinkError> {
  let text = match event {
    Event::Invalid { subject, reason } => format!("[INVALID]: {subject} {reason}\n"),
    Event::TokenFailed(report) => {
      format!(
        "\n[Failed]: {} Line: {} Token: {}\n\n      {}\n\n      Expected: {}\n      Received: {}\n\n",
        report.case,
        report.line_index,
        report.token_index,
        mark_token(&report.line, report.span)?,
        join_chain(report.expected.as_deref()),
        join_chain(report.actual.as_deref()),
      )
    }
    Event::TokenPassed(report) => format!(
      "[Passed]: {} Line: {} Token: {}  {}\n",
      report.case,
      report.line_index,
      report.token_index,
      mark_token(&report.line, report.span)?,
    ),
    Event::CaseFailed {
      case,
      failed_tokens,
    } => format!("[Failed]: {case} ({failed_tokens} mismatched)\n"),
    Event::CasePassed { case } => format!("[Passed]: {case}\n"),
    Event::Stats(stats) => format!(
      "cases: {} passed, {} failed, {} invalid\nlines: {} passed, {} failed\ntokens: {} passed, {} failed\n",
      stats.passed_cases,
      stats.failed_cases,
      stats.errors,
      stats.passed_lines,
      stats.failed_lines,
      stats.passed_tokens,
      stats.failed_tokens,
    ),
  };
  Ok(text)
}

fn join_chain(chain: Option<&[String]>) -> String {
  match chain {
    Some(chain) => chain.join(" "),
    None => "undefined".to_string(),
  }
}

fn visible(text: &str) -> String {
  text.replace(' ', "·")
}

fn mark_token(line: &str, span: Option<Span>) -> Result<String, SinkError> {
  let Some(span) = span else {
    return Ok(visible(line));
  };
  let out_of_range = || {
    SinkError::Render(format!(
      "token {}..{} does not fit line of {} bytes",
      span.start,
      span.end,
      line.len()
    ))
  };
  if span.start > span.end {
    return Err(out_of_range());
  }
  let before = line.get(..span.start).ok_or_else(out_of_range)?;
  let middle = line.get(span.start..span.end).ok_or_else(out_of_range)?;
  let after = line.get(span.end..).ok_or_else(out_of_range)?;
  Ok(format!(
    "{}[{}]{}",
    visible(before),
    visible(middle),
    visible(after)
  ))
}
