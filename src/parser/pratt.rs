//! Operator-precedence parsing on top of the combinator algebra.
//!
//! A [`pratt`] grammar is a list of precedence levels, outermost (loosest)
//! first, ending in the level that carries the terminal. Parsing runs the
//! classic two phases:
//!
//! - **nud** (leading position): walk the levels outside-in, trying each
//!   prefix operator and the terminal. A prefix operator parses its right
//!   operand starting from its own level.
//! - **led** (operator applied to a parsed left operand): scan the levels
//!   of the current slice. A left-associative infix operator parses its
//!   right operand one level tighter; a right-associative one re-enters at
//!   its own level; a postfix operator takes no right operand. After every
//!   success the scan restarts from the top of the slice, which is what
//!   makes `a + b + c` group to the left.
//!
//! Each engine invocation allocates exactly one collector. Operand pushes
//! and operator-marker pushes flow into it in source order; right operands
//! are parsed by a recursive invocation of their own, so a tighter
//! sub-expression folds to a single value before the operator's mapper
//! wraps it. On full success the collector's `retrieve` hands the finished
//! expression to the caller's sink.
//!
//! Operator parsers must consume at least one byte on success; an led pass
//! that consumes nothing ends the loop instead of spinning.

use super::callbacks::{
    make_collector, BoxedCollector, CollectSink, Collector, MapFn, MapSink, MarkFn, Sink,
};
use super::combinators::{Grammar, IntoGrammar};
use super::{Context, Outcome, Semantic};
use crate::source::Span;

/// One operator-precedence sub-grammar.
pub struct PrattExpr<V: 'static> {
    collector: fn() -> Box<dyn BoxedCollector<V>>,
    levels: Vec<PrattLevel<V>>,
}

/// Operators sharing one precedence, tried in listed order.
pub struct PrattLevel<V: 'static> {
    operators: Vec<Operator<V>>,
}

/// One operator descriptor within a level.
pub enum Operator<V: 'static> {
    /// The primary expression; only meaningful in the innermost level.
    Terminal(Grammar<V>),
    /// Leading operator; binds at its own level.
    Prefix(MapFn<V>, Grammar<V>),
    /// Left-associative infix operator.
    InfixLtr(MapFn<V>, Grammar<V>),
    /// Right-associative infix operator.
    InfixRtl(MapFn<V>, Grammar<V>),
    /// Trailing operator; takes no right operand.
    Postfix(MarkFn<V>, Grammar<V>),
}

impl<V: 'static> Clone for PrattExpr<V> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector,
            levels: self.levels.clone(),
        }
    }
}

impl<V: 'static> Clone for PrattLevel<V> {
    fn clone(&self) -> Self {
        Self {
            operators: self.operators.clone(),
        }
    }
}

impl<V: 'static> Clone for Operator<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Terminal(parser) => Self::Terminal(parser.clone()),
            Self::Prefix(mapper, parser) => Self::Prefix(*mapper, parser.clone()),
            Self::InfixLtr(mapper, parser) => Self::InfixLtr(*mapper, parser.clone()),
            Self::InfixRtl(mapper, parser) => Self::InfixRtl(*mapper, parser.clone()),
            Self::Postfix(marker, parser) => Self::Postfix(*marker, parser.clone()),
        }
    }
}

impl<V: Semantic> PrattExpr<V> {
    pub(crate) fn parse(&self, context: &mut Context<'_>, out: &mut dyn Sink<V>) -> Outcome {
        self.parse_levels(&self.levels, context, out)
    }

    /// One engine invocation: fresh collector, nud, then the led loop over
    /// `levels` (a suffix of the full level list).
    fn parse_levels(
        &self,
        levels: &[PrattLevel<V>],
        context: &mut Context<'_>,
        out: &mut dyn Sink<V>,
    ) -> Outcome {
        let mut collector = (self.collector)();
        let start = context.save();

        let outcome = {
            let mut sink = CollectSink::new(collector.as_mut());
            self.parse_nud(context, &mut sink)
        };
        match outcome {
            Outcome::Success => {}
            other => return other,
        }
        collector.set_location(Span::new(start.offset(), context.position()));

        loop {
            let before = context.position();
            let outcome = {
                let mut sink = CollectSink::new(collector.as_mut());
                self.parse_led(levels, context, &mut sink)
            };
            match outcome {
                Outcome::Error => return Outcome::Error,
                Outcome::Failure => break,
                Outcome::Success => {
                    if context.position() == before {
                        break;
                    }
                    collector.set_location(Span::new(start.offset(), context.position()));
                }
            }
        }

        collector.retrieve(out);
        Outcome::Success
    }

    /// Leading position: prefix operators and the terminal, outside-in
    /// over the full level list.
    fn parse_nud(&self, context: &mut Context<'_>, out: &mut dyn Sink<V>) -> Outcome {
        let mut rest: &[PrattLevel<V>] = &self.levels;
        while let Some((level, tail)) = rest.split_first() {
            for operator in &level.operators {
                match operator {
                    Operator::Terminal(parser) => match parser.parse(context, out) {
                        Outcome::Failure => continue,
                        outcome => return outcome,
                    },
                    Operator::Prefix(mapper, parser) => {
                        let start = context.save();
                        match parser.parse(context, out) {
                            Outcome::Failure => continue,
                            Outcome::Error => return Outcome::Error,
                            Outcome::Success => {}
                        }
                        let outcome = {
                            let mut mapped = MapSink::new(*mapper, out);
                            self.parse_levels(rest, context, &mut mapped)
                        };
                        match outcome {
                            Outcome::Failure => {
                                context.restore(start);
                                return Outcome::Failure;
                            }
                            outcome => return outcome,
                        }
                    }
                    _ => continue,
                }
            }
            rest = tail;
        }
        Outcome::Failure
    }

    /// Operator position: infix and postfix operators over the level
    /// slice, loosest first.
    fn parse_led(
        &self,
        levels: &[PrattLevel<V>],
        context: &mut Context<'_>,
        out: &mut dyn Sink<V>,
    ) -> Outcome {
        let mut rest = levels;
        while let Some((level, tail)) = rest.split_first() {
            for operator in &level.operators {
                match operator {
                    Operator::InfixLtr(mapper, parser) => {
                        let start = context.save();
                        match parser.parse(context, out) {
                            Outcome::Failure => continue,
                            Outcome::Error => return Outcome::Error,
                            Outcome::Success => {}
                        }
                        let outcome = {
                            let mut mapped = MapSink::new(*mapper, out);
                            self.parse_levels(tail, context, &mut mapped)
                        };
                        match outcome {
                            Outcome::Failure => {
                                context.restore(start);
                                return Outcome::Failure;
                            }
                            outcome => return outcome,
                        }
                    }
                    Operator::InfixRtl(mapper, parser) => {
                        let start = context.save();
                        match parser.parse(context, out) {
                            Outcome::Failure => continue,
                            Outcome::Error => return Outcome::Error,
                            Outcome::Success => {}
                        }
                        let outcome = {
                            let mut mapped = MapSink::new(*mapper, out);
                            self.parse_levels(rest, context, &mut mapped)
                        };
                        match outcome {
                            Outcome::Failure => {
                                context.restore(start);
                                return Outcome::Failure;
                            }
                            outcome => return outcome,
                        }
                    }
                    Operator::Postfix(marker, parser) => match parser.parse(context, out) {
                        Outcome::Failure => continue,
                        Outcome::Error => return Outcome::Error,
                        Outcome::Success => {
                            marker(out);
                            return Outcome::Success;
                        }
                    },
                    _ => continue,
                }
            }
            rest = tail;
        }
        Outcome::Failure
    }
}

/// Operator-precedence expression parser over the given levels, loosest
/// level first, collecting into a fresh `T` per invocation.
pub fn pratt<T, V>(levels: Vec<PrattLevel<V>>) -> Grammar<V>
where
    T: Collector<V> + 'static,
    V: Semantic,
{
    let factory: fn() -> Box<dyn BoxedCollector<V>> = make_collector::<T, V>;
    Grammar::Pratt(PrattExpr {
        collector: factory,
        levels,
    })
}

/// Group operators into one precedence level.
pub fn pratt_level<V: 'static>(operators: Vec<Operator<V>>) -> PrattLevel<V> {
    PrattLevel { operators }
}

/// The primary expression of the innermost level.
pub fn terminal<V: 'static, P: IntoGrammar<V>>(parser: P) -> Operator<V> {
    Operator::Terminal(parser.into_grammar())
}

/// Prefix operator; right-operand pushes are wrapped by `mapper`.
pub fn prefix<V: 'static, P: IntoGrammar<V>>(mapper: MapFn<V>, parser: P) -> Operator<V> {
    Operator::Prefix(mapper, parser.into_grammar())
}

/// Left-associative infix operator.
pub fn infix_ltr<V: 'static, P: IntoGrammar<V>>(mapper: MapFn<V>, parser: P) -> Operator<V> {
    Operator::InfixLtr(mapper, parser.into_grammar())
}

/// Right-associative infix operator.
pub fn infix_rtl<V: 'static, P: IntoGrammar<V>>(mapper: MapFn<V>, parser: P) -> Operator<V> {
    Operator::InfixRtl(mapper, parser.into_grammar())
}

/// Postfix operator; `marker` is pushed after the operator matches.
pub fn postfix<V: 'static, P: IntoGrammar<V>>(marker: MarkFn<V>, parser: P) -> Operator<V> {
    Operator::Postfix(marker, parser.into_grammar())
}
