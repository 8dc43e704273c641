//! The closed set of grammar combinators.
//!
//! A grammar is an immutable value built from these variants; one reduction
//! rule per variant drives the parse. Composite grammars are shareable
//! across threads; each concurrent parse brings its own [`Context`].

use std::sync::Arc;

use super::callbacks::{
    make_collector, BoxedCollector, CollectSink, Collector, IgnoreSink, MapFn, MapSink, Sink,
    TagSink,
};
use super::pratt::PrattExpr;
use super::{Context, Outcome, Semantic};
use crate::source::Span;

/// A grammar over the semantic value type `V`.
pub enum Grammar<V: 'static> {
    /// Consumes one byte if the predicate holds; pushes the byte.
    CharClass(Arc<dyn Fn(u8) -> bool + Send + Sync>),
    /// Consumes a byte sequence exactly, all-or-nothing; pushes the slice.
    Literal(&'static [u8]),
    /// Conjunction, left to right.
    Sequence(Vec<Grammar<V>>),
    /// Ordered disjunction; the first match wins.
    Choice(Vec<Grammar<V>>),
    /// Zero or more; never fails.
    Repetition(Box<Grammar<V>>),
    /// Negative lookahead; never consumes, never pushes.
    Not(Box<Grammar<()>>),
    /// Positive lookahead; never consumes, never pushes.
    Peek(Box<Grammar<()>>),
    /// Discards any pushes from the inner parser.
    Ignore(Box<Grammar<()>>),
    /// Pushes the matched substring as one value.
    ToString(Box<Grammar<()>>),
    /// Routes each push through a mapper.
    Map(MapFn<V>, Box<Grammar<V>>),
    /// Rewrites each push, typically wrapping it in a marker variant.
    Tag(fn(V) -> V, Box<Grammar<V>>),
    /// Gathers pushes into a fresh collector, then retrieves its value.
    Collect(fn() -> Box<dyn BoxedCollector<V>>, Box<Grammar<V>>),
    /// Unconditionally commits a diagnostic.
    Error(&'static str),
    /// Literal whose miss is promoted to a committed "expected" error.
    Expect(&'static [u8]),
    /// Late-bound indirection to a named rule, enabling recursion.
    Reference(fn() -> &'static Grammar<V>),
    /// Operator-precedence sub-grammar.
    Pratt(PrattExpr<V>),
}

impl<V> Clone for Grammar<V> {
    fn clone(&self) -> Self {
        match self {
            Self::CharClass(predicate) => Self::CharClass(Arc::clone(predicate)),
            Self::Literal(bytes) => Self::Literal(bytes),
            Self::Sequence(children) => Self::Sequence(children.clone()),
            Self::Choice(children) => Self::Choice(children.clone()),
            Self::Repetition(child) => Self::Repetition(child.clone()),
            Self::Not(child) => Self::Not(child.clone()),
            Self::Peek(child) => Self::Peek(child.clone()),
            Self::Ignore(child) => Self::Ignore(child.clone()),
            Self::ToString(child) => Self::ToString(child.clone()),
            Self::Map(mapper, child) => Self::Map(*mapper, child.clone()),
            Self::Tag(tagger, child) => Self::Tag(*tagger, child.clone()),
            Self::Collect(factory, child) => Self::Collect(*factory, child.clone()),
            Self::Error(message) => Self::Error(message),
            Self::Expect(bytes) => Self::Expect(bytes),
            Self::Reference(rule) => Self::Reference(*rule),
            Self::Pratt(expr) => Self::Pratt(expr.clone()),
        }
    }
}

impl<V: Semantic> Grammar<V> {
    /// Parse at the cursor, pushing values into `out`.
    ///
    /// Applies the commit rule: a Failure while a diagnostic is set is
    /// promoted to Error.
    pub fn parse(&self, context: &mut Context<'_>, out: &mut dyn Sink<V>) -> Outcome {
        let outcome = self.dispatch(context, out);
        if outcome == Outcome::Failure && context.has_diagnostic() {
            return Outcome::Error;
        }
        outcome
    }

    fn dispatch(&self, context: &mut Context<'_>, out: &mut dyn Sink<V>) -> Outcome {
        match self {
            Grammar::CharClass(predicate) => match context.peek() {
                Some(byte) if predicate(byte) => {
                    context.advance();
                    out.push(V::from_byte(byte));
                    Outcome::Success
                }
                _ => Outcome::Failure,
            },

            Grammar::Literal(bytes) => {
                let start = context.save();
                for &expected in *bytes {
                    match context.peek() {
                        Some(byte) if byte == expected => context.advance(),
                        _ => {
                            context.restore(start);
                            return Outcome::Failure;
                        }
                    }
                }
                out.push(V::from_match(context.slice(start)));
                Outcome::Success
            }

            Grammar::Sequence(children) => {
                let start = context.save();
                for child in children {
                    match child.parse(context, out) {
                        Outcome::Success => {}
                        Outcome::Failure => {
                            context.restore(start);
                            return Outcome::Failure;
                        }
                        Outcome::Error => return Outcome::Error,
                    }
                }
                Outcome::Success
            }

            Grammar::Choice(children) => {
                for child in children {
                    match child.parse(context, out) {
                        Outcome::Failure => continue,
                        outcome => return outcome,
                    }
                }
                Outcome::Failure
            }

            Grammar::Repetition(child) => loop {
                let before = context.save();
                match child.parse(context, out) {
                    Outcome::Success => {
                        // A zero-length match would repeat forever.
                        if context.position() == before.offset() {
                            return Outcome::Success;
                        }
                    }
                    Outcome::Failure => return Outcome::Success,
                    Outcome::Error => return Outcome::Error,
                }
            },

            Grammar::Not(child) => {
                let start = context.save();
                match child.parse(context, &mut IgnoreSink) {
                    Outcome::Success => {
                        context.restore(start);
                        Outcome::Failure
                    }
                    Outcome::Failure => Outcome::Success,
                    Outcome::Error => Outcome::Error,
                }
            }

            Grammar::Peek(child) => {
                let start = context.save();
                match child.parse(context, &mut IgnoreSink) {
                    Outcome::Success => {
                        context.restore(start);
                        Outcome::Success
                    }
                    outcome => outcome,
                }
            }

            Grammar::Ignore(child) => child.parse(context, &mut IgnoreSink),

            Grammar::ToString(child) => {
                let start = context.save();
                match child.parse(context, &mut IgnoreSink) {
                    Outcome::Success => {
                        out.push(V::from_match(context.slice(start)));
                        Outcome::Success
                    }
                    outcome => outcome,
                }
            }

            Grammar::Map(mapper, child) => {
                let mut sink = MapSink::new(*mapper, out);
                child.parse(context, &mut sink)
            }

            Grammar::Tag(tagger, child) => {
                let mut sink = TagSink::new(*tagger, out);
                child.parse(context, &mut sink)
            }

            Grammar::Collect(factory, child) => {
                let mut collector = factory();
                let start = context.save();
                let outcome = {
                    let mut sink = CollectSink::new(collector.as_mut());
                    child.parse(context, &mut sink)
                };
                if outcome == Outcome::Success {
                    collector.set_location(Span::new(start.offset(), context.position()));
                    collector.retrieve(out);
                }
                outcome
            }

            Grammar::Error(message) => {
                context.set_diagnostic(*message);
                Outcome::Error
            }

            Grammar::Expect(bytes) => {
                let start = context.save();
                for &expected in *bytes {
                    match context.peek() {
                        Some(byte) if byte == expected => context.advance(),
                        _ => {
                            context.restore(start);
                            context.set_diagnostic(format!(
                                "expected `{}`",
                                String::from_utf8_lossy(bytes)
                            ));
                            return Outcome::Error;
                        }
                    }
                }
                Outcome::Success
            }

            Grammar::Reference(rule) => rule().parse(context, out),

            Grammar::Pratt(expr) => expr.parse(context, out),
        }
    }
}

/// A named grammar rule: a type exposing its parser as a shared static.
///
/// `reference::<R>()` late-binds to `R::parser()`, which breaks
/// definitional cycles and allows mutual recursion without cycles in
/// ownership. Rules typically back the static with `once_cell::sync::Lazy`.
pub trait NamedRule {
    type Value: Semantic;

    fn parser() -> &'static Grammar<Self::Value>;
}

/// Lifts bytes, byte strings, predicates and built grammars into grammar
/// values, so combinators accept any of them where a parser is expected.
pub trait IntoGrammar<V> {
    fn into_grammar(self) -> Grammar<V>;
}

impl<V> IntoGrammar<V> for Grammar<V> {
    fn into_grammar(self) -> Grammar<V> {
        self
    }
}

/// A single ASCII character, matched by byte equality.
impl<V> IntoGrammar<V> for char {
    fn into_grammar(self) -> Grammar<V> {
        let expected = self as u8;
        Grammar::CharClass(Arc::new(move |byte| byte == expected))
    }
}

impl<V> IntoGrammar<V> for u8 {
    fn into_grammar(self) -> Grammar<V> {
        let expected = self;
        Grammar::CharClass(Arc::new(move |byte| byte == expected))
    }
}

impl<V> IntoGrammar<V> for &'static str {
    fn into_grammar(self) -> Grammar<V> {
        Grammar::Literal(self.as_bytes())
    }
}

impl<V> IntoGrammar<V> for fn(u8) -> bool {
    fn into_grammar(self) -> Grammar<V> {
        Grammar::CharClass(Arc::new(self))
    }
}

/// Tuple of parsers, each liftable via [`IntoGrammar`].
pub trait GrammarList<V> {
    fn into_vec(self) -> Vec<Grammar<V>>;
}

macro_rules! impl_grammar_list {
    ($($p:ident),+) => {
        #[allow(non_snake_case)]
        impl<V, $($p: IntoGrammar<V>),+> GrammarList<V> for ($($p,)+) {
            fn into_vec(self) -> Vec<Grammar<V>> {
                let ($($p,)+) = self;
                vec![$($p.into_grammar()),+]
            }
        }
    };
}

impl_grammar_list!(P0);
impl_grammar_list!(P0, P1);
impl_grammar_list!(P0, P1, P2);
impl_grammar_list!(P0, P1, P2, P3);
impl_grammar_list!(P0, P1, P2, P3, P4);
impl_grammar_list!(P0, P1, P2, P3, P4, P5);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7, P8);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7, P8, P9);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7, P8, P9, P10);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12, P13);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12, P13, P14);
impl_grammar_list!(P0, P1, P2, P3, P4, P5, P6, P7, P8, P9, P10, P11, P12, P13, P14, P15);

impl<V> GrammarList<V> for Vec<Grammar<V>> {
    fn into_vec(self) -> Vec<Grammar<V>> {
        self
    }
}

/// Consume one byte satisfying `predicate`.
pub fn char_class<V, F>(predicate: F) -> Grammar<V>
where
    F: Fn(u8) -> bool + Send + Sync + 'static,
{
    Grammar::CharClass(Arc::new(predicate))
}

/// Consume one byte in the inclusive range `low..=high`.
pub fn range<V>(low: u8, high: u8) -> Grammar<V> {
    char_class(move |byte| byte >= low && byte <= high)
}

/// Consume any single byte.
pub fn any_char<V>() -> Grammar<V> {
    char_class(|_| true)
}

/// Consume exactly `text`, all-or-nothing.
pub fn literal<V>(text: &'static str) -> Grammar<V> {
    Grammar::Literal(text.as_bytes())
}

/// All parsers in order.
pub fn sequence<V, L: GrammarList<V>>(parsers: L) -> Grammar<V> {
    Grammar::Sequence(parsers.into_vec())
}

/// The first parser that matches.
pub fn choice<V, L: GrammarList<V>>(parsers: L) -> Grammar<V> {
    Grammar::Choice(parsers.into_vec())
}

/// Zero or more repetitions; never fails.
pub fn repetition<V, P: IntoGrammar<V>>(parser: P) -> Grammar<V> {
    Grammar::Repetition(Box::new(parser.into_grammar()))
}

/// Alias for [`repetition`].
pub fn zero_or_more<V, P: IntoGrammar<V>>(parser: P) -> Grammar<V> {
    repetition(parser)
}

/// One or more repetitions.
pub fn one_or_more<V, P: IntoGrammar<V>>(parser: P) -> Grammar<V> {
    let parser = parser.into_grammar();
    Grammar::Sequence(vec![parser.clone(), repetition(parser)])
}

/// Negative lookahead: succeeds iff the inner parser fails.
pub fn not<V, P: IntoGrammar<()>>(parser: P) -> Grammar<V> {
    Grammar::Not(Box::new(parser.into_grammar()))
}

/// Positive lookahead: matches without consuming.
pub fn peek<V, P: IntoGrammar<()>>(parser: P) -> Grammar<V> {
    Grammar::Peek(Box::new(parser.into_grammar()))
}

/// Matches end-of-source.
pub fn end<V>() -> Grammar<V> {
    not(any_char())
}

/// Parse the inner grammar but discard everything it pushes.
pub fn ignore<V, P: IntoGrammar<()>>(parser: P) -> Grammar<V> {
    Grammar::Ignore(Box::new(parser.into_grammar()))
}

/// Push the substring matched by the inner grammar as one value.
pub fn to_string<V, P: IntoGrammar<()>>(parser: P) -> Grammar<V> {
    Grammar::ToString(Box::new(parser.into_grammar()))
}

/// Route each push from the inner grammar through `mapper`.
pub fn map<V, P: IntoGrammar<V>>(mapper: MapFn<V>, parser: P) -> Grammar<V> {
    Grammar::Map(mapper, Box::new(parser.into_grammar()))
}

/// Rewrite each push from the inner grammar through `tagger`.
pub fn tag<V, P: IntoGrammar<V>>(tagger: fn(V) -> V, parser: P) -> Grammar<V> {
    Grammar::Tag(tagger, Box::new(parser.into_grammar()))
}

/// Gather the inner grammar's pushes into a fresh `T`, then retrieve its
/// value on success.
pub fn collect<T, V, P>(parser: P) -> Grammar<V>
where
    T: Collector<V> + 'static,
    V: Semantic,
    P: IntoGrammar<V>,
{
    let factory: fn() -> Box<dyn BoxedCollector<V>> = make_collector::<T, V>;
    Grammar::Collect(factory, Box::new(parser.into_grammar()))
}

/// Commit `message` as a diagnostic at the current position.
pub fn error<V>(message: &'static str) -> Grammar<V> {
    Grammar::Error(message)
}

/// Match `text` or commit an "expected" diagnostic.
pub fn expect<V>(text: &'static str) -> Grammar<V> {
    Grammar::Expect(text.as_bytes())
}

/// Late-bound reference to the named rule `R`.
pub fn reference<R: NamedRule>() -> Grammar<R::Value> {
    Grammar::Reference(R::parser)
}
