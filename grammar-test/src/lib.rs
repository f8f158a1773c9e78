//! Conformance testing for TextMate scope grammars.
//!
//! A host describes cases as source lines plus the scope chain it expects for
//! every token, hands them to an [`Engine`] together with a tokenizer for the
//! grammar, and gets back per-token diagnostics through a [`DiagnosticSink`]
//! and run-wide [`Stats`].
//!
//! The grammar engine itself is not part of this crate; it plugs in through
//! [`Tokenizer`] and [`TokenizerBackend`].

pub mod case;
pub mod compare;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod options;
pub mod report;
pub mod sink;
pub mod stats;
pub mod tokenizer;

pub use case::parse_suite;
pub use case::CaseDescriptor;
pub use case::CaseExpect;
pub use case::CaseText;
pub use case::NormalizedCase;
pub use compare::CaseOutcome;
pub use engine::Engine;
pub use error::LoadError;
pub use error::SinkError;
pub use error::SuiteError;
pub use grammar::Grammar;
pub use grammar::GrammarSource;
pub use options::Options;
pub use options::OptionsOverride;
pub use report::RunReport;
pub use report::REPORT_SCHEMA_VERSION;
pub use sink::DiagnosticSink;
pub use sink::Event;
pub use sink::EventKind;
pub use sink::RecordingSink;
pub use sink::TextSink;
pub use sink::TracingSink;
pub use stats::Stats;
pub use tokenizer::LineTokens;
pub use tokenizer::Token;
pub use tokenizer::Tokenizer;
pub use tokenizer::TokenizerBackend;
