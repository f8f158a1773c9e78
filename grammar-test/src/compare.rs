use crate::case::NormalizedCase;
use crate::case::ScopeChain;
use crate::options::Options;
use crate::sink::Event;
use crate::sink::Span;
use crate::sink::TokenReport;
use crate::stats::StatsAggregator;
use crate::tokenizer::Token;
use crate::tokenizer::Tokenizer;
use tracing::debug;
use tracing::debug_span;

/// How a single case ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOutcome {
  Passed,
  Failed,
  /// Rejected before any line was tokenized.
  Invalid,
}

/// Something that can take events from the comparator.
///
/// The engine implements this on top of a [`DiagnosticSink`](crate::DiagnosticSink)
/// so that an undeliverable event never interrupts a comparison.
pub(crate) trait Emit {
  fn emit(&mut self, event: Event);
}

/// Compares one case against a tokenizer, position by position.
pub(crate) struct Comparator<'a, T: Tokenizer, E: Emit> {
  pub root_scope: &'a str,
  pub tokenizer: &'a T,
  pub options: &'a Options,
  pub stats: &'a mut StatsAggregator,
  pub out: &'a mut E,
}

impl<T: Tokenizer, E: Emit> Comparator<'_, T, E> {
  pub fn compare(&mut self, case: &NormalizedCase) -> CaseOutcome {
    let _span = debug_span!("compare_case", case = %case.name).entered();

    if case.text.len() != case.expect.len() {
      self.stats.record_error();
      self.out.emit(Event::Invalid {
        subject: case.name.clone(),
        reason: format!(
          "`text` has {} lines but `expect` has {}; both must have the same number of lines",
          case.text.len(),
          case.expect.len()
        ),
      });
      return CaseOutcome::Invalid;
    }

    let mut state = self.tokenizer.initial_state();
    let mut failed_tokens = 0;
    for (line_index, (line, expected)) in case.text.iter().zip(&case.expect).enumerate() {
      let produced = self.tokenizer.tokenize_line(line, &state);
      state = produced.next_state;

      let line_failures = self.compare_line(case, line_index, line, &produced.tokens, expected);
      self.stats.record_line(line_failures == 0);
      failed_tokens += line_failures;
    }

    let passed = failed_tokens == 0;
    self.stats.record_case(passed);
    debug!(case = %case.name, failed_tokens, "case compared");
    if passed {
      self.out.emit(Event::CasePassed {
        case: case.name.clone(),
      });
      CaseOutcome::Passed
    } else {
      self.out.emit(Event::CaseFailed {
        case: case.name.clone(),
        failed_tokens,
      });
      CaseOutcome::Failed
    }
  }

  /// Returns the number of failed positions on the line.
  fn compare_line(
    &mut self,
    case: &NormalizedCase,
    line_index: usize,
    line: &str,
    actual: &[Token],
    expected: &[ScopeChain],
  ) -> usize {
    let mut failures = 0;
    for token_index in 0..actual.len().max(expected.len()) {
      let token = actual.get(token_index);
      let expected_chain = expected.get(token_index).map(|suffixes| {
        let mut chain = Vec::with_capacity(suffixes.len() + 1);
        chain.push(self.root_scope.to_string());
        chain.extend(suffixes.iter().cloned());
        chain
      });
      let passed = match (token, &expected_chain) {
        (Some(token), Some(chain)) => token.scopes == *chain,
        _ => false,
      };

      self.stats.record_token(passed);
      if !passed {
        failures += 1;
      } else if !self.options.log_all_passed_tokens {
        continue;
      }

      let report = TokenReport {
        case: case.name.clone(),
        line_index,
        token_index,
        line: line.to_string(),
        span: token.map(|token| Span {
          start: token.start,
          end: token.end,
        }),
        expected: expected_chain,
        actual: token.map(|token| token.scopes.clone()),
      };
      self.out.emit(if passed {
        Event::TokenPassed(report)
      } else {
        Event::TokenFailed(report)
      });
    }
    failures
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sink::EventKind;
  use crate::tokenizer::LineTokens;

  /// Splits each line on spaces; every word gets `[root, word]`.
  struct WordTokenizer;

  impl Tokenizer for WordTokenizer {
    type State = ();

    fn initial_state(&self) -> Self::State {}

    fn tokenize_line(&self, line: &str, _state: &()) -> LineTokens<()> {
      let mut tokens = Vec::new();
      let mut offset = 0;
      for word in line.split(' ') {
        if !word.is_empty() {
          tokens.push(Token::new(
            offset,
            offset + word.len(),
            vec!["source.words".to_string(), word.to_string()],
          ));
        }
        offset += word.len() + 1;
      }
      LineTokens {
        tokens,
        next_state: (),
      }
    }
  }

  #[derive(Default)]
  struct Collected(Vec<Event>);

  impl Emit for Collected {
    fn emit(&mut self, event: Event) {
      self.0.push(event);
    }
  }

  fn case(text: &[&str], expect: &[&[&[&str]]]) -> NormalizedCase {
    NormalizedCase {
      name: "words".to_string(),
      text: text.iter().map(|s| s.to_string()).collect(),
      expect: expect
        .iter()
        .map(|row| {
          row
            .iter()
            .map(|chain| chain.iter().map(|s| s.to_string()).collect())
            .collect()
        })
        .collect(),
    }
  }

  fn run(case: &NormalizedCase, options: Options) -> (CaseOutcome, StatsAggregator, Vec<Event>) {
    let mut stats = StatsAggregator::new();
    let mut out = Collected::default();
    let outcome = Comparator {
      root_scope: "source.words",
      tokenizer: &WordTokenizer,
      options: &options,
      stats: &mut stats,
      out: &mut out,
    }
    .compare(case);
    (outcome, stats, out.0)
  }

  #[test]
  fn matching_tokens_pass_quietly() {
    let (outcome, stats, events) = run(
      &case(&["let x"], &[&[&["let"], &["x"]]]),
      Options::default(),
    );
    assert_eq!(outcome, CaseOutcome::Passed);
    let stats = stats.snapshot();
    assert_eq!(stats.passed_tokens, 2);
    assert_eq!(stats.passed_lines, 1);
    assert_eq!(stats.passed_cases, 1);
    assert_eq!(
      events.iter().map(Event::kind).collect::<Vec<_>>(),
      vec![EventKind::Passed]
    );
  }

  #[test]
  fn verbose_mode_reports_passed_tokens() {
    let options = Options {
      log_all_passed_tokens: true,
      ..Options::default()
    };
    let (_, _, events) = run(&case(&["let x"], &[&[&["let"], &["x"]]]), options);
    let passed_tokens = events
      .iter()
      .filter(|e| matches!(e, Event::TokenPassed(_)))
      .count();
    assert_eq!(passed_tokens, 2);
  }

  #[test]
  fn extra_token_fails() {
    let (outcome, stats, events) = run(&case(&["let x"], &[&[&["let"]]]), Options::default());
    assert_eq!(outcome, CaseOutcome::Failed);
    let stats = stats.snapshot();
    assert_eq!(stats.tokens, 2);
    assert_eq!(stats.failed_tokens, 1);
    assert_eq!(stats.failed_lines, 1);
    match &events[0] {
      Event::TokenFailed(report) => {
        assert_eq!(report.token_index, 1);
        assert_eq!(report.expected, None);
        assert_eq!(
          report.actual,
          Some(vec!["source.words".to_string(), "x".to_string()])
        );
        assert_eq!(report.span, Some(Span { start: 4, end: 5 }));
      }
      other => panic!("unexpected event {other:?}"),
    }
  }

  #[test]
  fn missing_token_fails() {
    let (outcome, stats, events) = run(
      &case(&["let"], &[&[&["let"], &["x"]]]),
      Options::default(),
    );
    assert_eq!(outcome, CaseOutcome::Failed);
    assert_eq!(stats.snapshot().failed_tokens, 1);
    match &events[0] {
      Event::TokenFailed(report) => {
        assert_eq!(report.span, None);
        assert_eq!(report.actual, None);
        assert_eq!(
          report.expected,
          Some(vec!["source.words".to_string(), "x".to_string()])
        );
      }
      other => panic!("unexpected event {other:?}"),
    }
  }

  #[test]
  fn mismatches_are_all_collected() {
    let (_, stats, events) = run(
      &case(&["a b c"], &[&[&["x"], &["b"], &["z"]]]),
      Options::default(),
    );
    let stats = stats.snapshot();
    assert_eq!(stats.failed_tokens, 2);
    assert_eq!(stats.passed_tokens, 1);
    let failed: Vec<_> = events
      .iter()
      .filter_map(|e| match e {
        Event::TokenFailed(report) => Some(report.token_index),
        _ => None,
      })
      .collect();
    assert_eq!(failed, vec![0, 2]);
    let case_failed = events
      .iter()
      .filter(|e| matches!(e, Event::CaseFailed { .. }))
      .count();
    assert_eq!(case_failed, 1);
  }

  #[test]
  fn line_count_mismatch_is_invalid() {
    let (outcome, stats, events) = run(&case(&["a", "b"], &[&[&["a"]]]), Options::default());
    assert_eq!(outcome, CaseOutcome::Invalid);
    let stats = stats.snapshot();
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.cases, 0);
    assert_eq!(stats.lines, 0);
    assert_eq!(stats.tokens, 0);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::Invalid);
  }

  #[test]
  fn empty_chain_expects_only_root_scope() {
    let (outcome, _, _) = run(&case(&["a"], &[&[&[]]]), Options::default());
    assert_eq!(outcome, CaseOutcome::Failed);
  }
}
