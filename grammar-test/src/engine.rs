use crate::case::CaseDescriptor;
use crate::compare::CaseOutcome;
use crate::compare::Comparator;
use crate::compare::Emit;
use crate::error::LoadError;
use crate::grammar::Grammar;
use crate::grammar::GrammarSource;
use crate::options::Options;
use crate::report::RunReport;
use crate::sink::DiagnosticSink;
use crate::sink::Event;
use crate::stats::Stats;
use crate::stats::StatsAggregator;
use crate::tokenizer::Tokenizer;
use crate::tokenizer::TokenizerBackend;
use tracing::debug;
use tracing::info;
use tracing::warn;

enum Backend<T> {
  Ready { grammar: Grammar, tokenizer: T },
  Failed { source: String, error: LoadError },
}

/// Runs grammar test cases against one tokenizer and reports to one sink.
///
/// Statistics and options belong to the engine instance; separate engines
/// never share counters.
pub struct Engine<T, S> {
  backend: Backend<T>,
  options: Options,
  stats: StatsAggregator,
  sink: S,
}

impl<T: Tokenizer, S: DiagnosticSink> Engine<T, S> {
  /// Loads the grammar named by `grammar` and hands it to `backend`.
  ///
  /// `grammar` is a path unless `options.grammar_is_inline_document` is set.
  /// A load failure is reported as `invalid` and leaves an engine on which
  /// every case is invalid.
  pub async fn load<B>(
    grammar: impl Into<String>,
    backend: &B,
    options: Options,
    mut sink: S,
  ) -> Self
  where
    B: TokenizerBackend<Tokenizer = T>,
  {
    let source = GrammarSource::from_raw(grammar, options.grammar_is_inline_document);
    let loaded = match Grammar::load(&source).await {
      Ok(grammar) => match backend.load(&grammar).await {
        Ok(tokenizer) => Ok((grammar, tokenizer)),
        Err(err) => Err(LoadError::Backend {
          scope: grammar.scope_name().to_string(),
          message: format!("{err:#}"),
        }),
      },
      Err(err) => Err(err),
    };

    let mut stats = StatsAggregator::new();
    let backend = match loaded {
      Ok((grammar, tokenizer)) => {
        debug!(scope = grammar.scope_name(), "grammar loaded");
        Backend::Ready { grammar, tokenizer }
      }
      Err(error) => {
        let source = source.describe();
        stats.record_error();
        Reporter { sink: &mut sink }.emit(Event::Invalid {
          subject: source.clone(),
          reason: format!("cannot run tests with invalid grammar: {error}"),
        });
        Backend::Failed { source, error }
      }
    };

    Engine {
      backend,
      options,
      stats,
      sink,
    }
  }

  /// Builds an engine around a grammar and tokenizer that are already loaded.
  pub fn with_tokenizer(grammar: Grammar, tokenizer: T, options: Options, sink: S) -> Self {
    Engine {
      backend: Backend::Ready { grammar, tokenizer },
      options,
      stats: StatsAggregator::new(),
      sink,
    }
  }

  pub fn grammar(&self) -> Option<&Grammar> {
    match &self.backend {
      Backend::Ready { grammar, .. } => Some(grammar),
      Backend::Failed { .. } => None,
    }
  }

  pub fn tokenizer(&self) -> Option<&T> {
    match &self.backend {
      Backend::Ready { tokenizer, .. } => Some(tokenizer),
      Backend::Failed { .. } => None,
    }
  }

  pub fn load_error(&self) -> Option<&LoadError> {
    match &self.backend {
      Backend::Ready { .. } => None,
      Backend::Failed { error, .. } => Some(error),
    }
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  pub fn stats(&self) -> Stats {
    self.stats.snapshot()
  }

  pub fn sink(&self) -> &S {
    &self.sink
  }

  /// Normalizes, compares and reports one case.
  ///
  /// A per-case option override is active only while this case runs.
  pub fn run(&mut self, case: CaseDescriptor) -> CaseOutcome {
    let (case, over) = case.normalize();
    let Engine {
      backend,
      options,
      stats,
      sink,
    } = self;
    let scope = options.scoped(over.as_ref());
    let active: &Options = &scope;
    let mut out = Reporter { sink };

    debug!(case = %case.name, lines = case.text.len(), "running case");
    match backend {
      Backend::Failed { source, .. } => {
        stats.record_error();
        out.emit(Event::Invalid {
          subject: case.name.clone(),
          reason: format!("grammar {source} did not load"),
        });
        CaseOutcome::Invalid
      }
      Backend::Ready { grammar, tokenizer } => Comparator {
        root_scope: grammar.scope_name(),
        tokenizer: &*tokenizer,
        options: active,
        stats,
        out: &mut out,
      }
      .compare(&case),
    }
  }

  /// Emits the final statistics and decides how the host should exit.
  pub fn finish(mut self) -> (RunReport, S) {
    let stats = self.stats.snapshot();
    info!(
      cases = stats.cases,
      failed_cases = stats.failed_cases,
      errors = stats.errors,
      "grammar tests finished"
    );
    Reporter {
      sink: &mut self.sink,
    }
    .emit(Event::Stats(stats));
    (RunReport::new(stats, &self.options), self.sink)
  }

  /// Runs every case in order, then [`finish`](Self::finish)es.
  pub fn execute_all(mut self, cases: impl IntoIterator<Item = CaseDescriptor>) -> (RunReport, S) {
    for case in cases {
      self.run(case);
    }
    self.finish()
  }
}

/// Delivers events to a sink without ever failing the caller.
///
/// An event the sink cannot take is replaced by an `invalid` event describing
/// why; if that is refused too, it is only logged.
struct Reporter<'a, S> {
  sink: &'a mut S,
}

impl<S: DiagnosticSink> Emit for Reporter<'_, S> {
  fn emit(&mut self, event: Event) {
    let Err(err) = self.sink.report(&event) else {
      return;
    };
    let fallback = Event::Invalid {
      subject: format!("{} diagnostic", event.kind()),
      reason: err.to_string(),
    };
    if let Err(err) = self.sink.report(&fallback) {
      warn!(kind = %event.kind(), error = %err, "diagnostic dropped");
    }
  }
}
