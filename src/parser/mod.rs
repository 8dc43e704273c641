//! # The combinator engine
//!
//! This module provides the core infrastructure for the parser:
//!
//! - **[`Context`]**: the per-parse cursor: byte position, checkpointing,
//!   and the single diagnostic slot
//! - **[`Outcome`]**: the three-valued parse result
//! - **[`Semantic`]**: how primitive matches become a grammar's value type
//! - **[`parse`]**: the top-level entry point
//!
//! ## Backtracking
//!
//! Parsers that may fail save a checkpoint before attempting and restore it
//! on [`Outcome::Failure`]:
//!
//! ```text
//! let start = context.save();
//! match parser.parse(&mut context, &mut sink) {
//!     Outcome::Failure => context.restore(start),  // try an alternative
//!     outcome => ...,
//! }
//! ```
//!
//! ## The commit rule
//!
//! Failure is the only backtrackable non-success. Once a diagnostic has
//! been set (by an `error` or `expect` node), the parse is committed:
//! restoring a checkpoint does not clear the diagnostic, and any Failure
//! surfacing afterwards is promoted to [`Outcome::Error`]. Choices stop
//! trying alternatives, sequences stop rewinding, and lookahead does not
//! turn an Error back into a match.

pub mod callbacks;
pub mod combinators;
pub mod pratt;

pub use callbacks::{Collector, GetValue, IgnoreSink, Sink};
pub use combinators::{
    any_char, char_class, choice, collect, end, error, expect, ignore, literal, map, not,
    one_or_more, peek, range, reference, repetition, sequence, tag, to_string, zero_or_more,
    Grammar, IntoGrammar, NamedRule,
};
pub use pratt::{infix_ltr, infix_rtl, postfix, prefix, pratt, pratt_level, terminal};

use crate::diagnostics::Diagnostic;
use crate::source::Source;

/// Result of a parse: success, backtrackable failure, or committed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Error,
}

/// A saved cursor position, restorable in O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl Checkpoint {
    pub fn offset(&self) -> usize {
        self.0
    }
}

/// Per-parse mutable state: the byte cursor and the diagnostic slot.
///
/// The context is the only state threaded through a parse. It never
/// advances past end-of-source, and the diagnostic is first-write-wins:
/// once committed it outlives any amount of backtracking.
pub struct Context<'s> {
    source: &'s Source,
    position: usize,
    diagnostic: Option<Diagnostic>,
}

impl<'s> Context<'s> {
    pub fn new(source: &'s Source) -> Self {
        Self {
            source,
            position: 0,
            diagnostic: None,
        }
    }

    /// The byte at the cursor, or `None` at end-of-source.
    pub fn peek(&self) -> Option<u8> {
        self.source.get(self.position)
    }

    /// Advance by one byte. Saturates at end-of-source.
    pub fn advance(&mut self) {
        if self.position < self.source.len() {
            self.position += 1;
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn save(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.0;
    }

    /// The bytes between `checkpoint` and the cursor.
    pub fn slice(&self, checkpoint: Checkpoint) -> &'s [u8] {
        let source: &'s Source = self.source;
        &source.bytes()[checkpoint.0..self.position]
    }

    /// Commit a diagnostic at the cursor. The first write wins.
    pub fn set_diagnostic(&mut self, message: impl Into<String>) {
        if self.diagnostic.is_none() {
            self.diagnostic = Some(Diagnostic::new(self.position, message));
        }
    }

    pub fn has_diagnostic(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn clear_diagnostic(&mut self) {
        self.diagnostic = None;
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    pub fn take_diagnostic(&mut self) -> Option<Diagnostic> {
        self.diagnostic.take()
    }
}

/// A grammar's semantic value type.
///
/// Primitive parsers construct values through these two injections: a char
/// class pushes the matched byte, a literal or `to_string` node pushes the
/// matched slice. Everything richer flows through mappers and collectors.
/// `()` implements this trivially so value-free sub-grammars (whitespace,
/// lookahead subjects, ignored operators) need no dedicated value type.
pub trait Semantic: Sized + 'static {
    fn from_byte(byte: u8) -> Self;
    fn from_match(bytes: &[u8]) -> Self;
}

impl Semantic for () {
    fn from_byte(_: u8) -> Self {}
    fn from_match(_: &[u8]) -> Self {}
}

/// Everything a finished parse reports.
#[derive(Debug)]
pub struct ParseReport<V> {
    pub outcome: Outcome,
    /// Final cursor position.
    pub position: usize,
    /// The committed diagnostic, if the outcome is [`Outcome::Error`].
    pub diagnostic: Option<Diagnostic>,
    /// The last value the grammar pushed, if any.
    pub value: Option<V>,
}

/// Run `grammar` over `source` from position zero, capturing the final
/// pushed value.
pub fn parse<V: Semantic>(grammar: &Grammar<V>, source: &Source) -> ParseReport<V> {
    let mut context = Context::new(source);
    let mut slot: GetValue<V> = GetValue::default();
    let outcome = grammar.parse(&mut context, &mut slot);
    ParseReport {
        outcome,
        position: context.position(),
        diagnostic: context.take_diagnostic(),
        value: slot.into_value(),
    }
}

/// Run `grammar` over `source`, routing pushes into a caller-supplied sink.
pub fn parse_into<V: Semantic>(
    grammar: &Grammar<V>,
    source: &Source,
    out: &mut dyn Sink<V>,
) -> ParseReport<()> {
    let mut context = Context::new(source);
    let outcome = grammar.parse(&mut context, out);
    ParseReport {
        outcome,
        position: context.position(),
        diagnostic: context.take_diagnostic(),
        value: None,
    }
}
