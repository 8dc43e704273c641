//! The callback protocol: how matched input becomes values.
//!
//! Every parse call carries a [`Sink`]. Primitive parsers push raw matches
//! into it; decorator sinks rewrite, suppress, or gather those pushes on
//! the way out. A [`Collector`] is the user-defined endpoint: it
//! accumulates the pushes of one sub-parse in source order and finalizes
//! exactly one value if, and only if, that sub-parse succeeds.
//!
//! Sinks are short-lived stack values borrowed down the parse stack, so
//! decoration costs a reference, not an allocation. The one exception is
//! the collector behind a `collect` or `pratt` node, which is minted fresh
//! for every attempt and simply dropped on Failure or Error.

use crate::source::Span;

/// Mapper applied to each value a wrapped parser pushes.
pub type MapFn<V> = fn(&mut dyn Sink<V>, V);

/// Marker push for operators that take no right operand.
pub type MarkFn<V> = fn(&mut dyn Sink<V>);

/// Receives the values produced during a parse.
pub trait Sink<V> {
    fn push(&mut self, value: V);

    /// Reports the span matched so far. Most sinks do not care.
    fn set_location(&mut self, span: Span) {
        let _ = span;
    }
}

/// Swallows every push. Used inside `not`, `peek`, `ignore` and `expect`.
pub struct IgnoreSink;

impl<V> Sink<V> for IgnoreSink {
    fn push(&mut self, _: V) {}
}

/// Keeps the final pushed value; the top-level entry point reads it back.
pub struct GetValue<V> {
    value: Option<V>,
}

impl<V> Default for GetValue<V> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<V> GetValue<V> {
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<V> {
        self.value
    }
}

impl<V> Sink<V> for GetValue<V> {
    fn push(&mut self, value: V) {
        self.value = Some(value);
    }
}

/// Routes each push through a mapper before forwarding.
pub struct MapSink<'a, V> {
    map: MapFn<V>,
    inner: &'a mut dyn Sink<V>,
}

impl<'a, V> MapSink<'a, V> {
    pub fn new(map: MapFn<V>, inner: &'a mut dyn Sink<V>) -> Self {
        Self { map, inner }
    }
}

impl<V> Sink<V> for MapSink<'_, V> {
    fn push(&mut self, value: V) {
        (self.map)(&mut *self.inner, value);
    }

    fn set_location(&mut self, span: Span) {
        self.inner.set_location(span);
    }
}

/// Rewrites each push in place, typically wrapping it in a marker variant
/// that selects a behavior in the surrounding collector.
pub struct TagSink<'a, V> {
    tag: fn(V) -> V,
    inner: &'a mut dyn Sink<V>,
}

impl<'a, V> TagSink<'a, V> {
    pub fn new(tag: fn(V) -> V, inner: &'a mut dyn Sink<V>) -> Self {
        Self { tag, inner }
    }
}

impl<V> Sink<V> for TagSink<'_, V> {
    fn push(&mut self, value: V) {
        self.inner.push((self.tag)(value));
    }

    fn set_location(&mut self, span: Span) {
        self.inner.set_location(span);
    }
}

/// Accumulates the pushes of one sub-parse and finalizes a single value.
///
/// Collectors must be default-constructible and must tolerate being
/// dropped partway: on Failure or Error the engine discards them without
/// calling [`Collector::retrieve`].
pub trait Collector<V>: Default {
    fn push(&mut self, value: V);

    /// Reports the span the sub-parse has matched. Called after the inner
    /// parse succeeds and, for operator expressions, after each completed
    /// operator application.
    fn set_location(&mut self, span: Span) {
        let _ = span;
    }

    /// Finalize and forward the built value. Called exactly once, after
    /// the last push, and only on success.
    fn retrieve(self, out: &mut dyn Sink<V>);
}

/// Object-safe form of [`Collector`] so grammar nodes can mint a fresh
/// collector per parse attempt.
pub trait BoxedCollector<V> {
    fn push(&mut self, value: V);
    fn set_location(&mut self, span: Span);
    fn retrieve(self: Box<Self>, out: &mut dyn Sink<V>);
}

struct CollectorAdapter<T>(T);

impl<V, T: Collector<V>> BoxedCollector<V> for CollectorAdapter<T> {
    fn push(&mut self, value: V) {
        self.0.push(value);
    }

    fn set_location(&mut self, span: Span) {
        self.0.set_location(span);
    }

    fn retrieve(self: Box<Self>, out: &mut dyn Sink<V>) {
        self.0.retrieve(out);
    }
}

pub(crate) fn make_collector<T, V>() -> Box<dyn BoxedCollector<V>>
where
    T: Collector<V> + 'static,
    V: 'static,
{
    Box::new(CollectorAdapter(T::default()))
}

/// Routes pushes into a live collector.
pub(crate) struct CollectSink<'a, V> {
    inner: &'a mut dyn BoxedCollector<V>,
}

impl<'a, V> CollectSink<'a, V> {
    pub(crate) fn new(inner: &'a mut dyn BoxedCollector<V>) -> Self {
        Self { inner }
    }
}

impl<V> Sink<V> for CollectSink<'_, V> {
    fn push(&mut self, value: V) {
        self.inner.push(value);
    }

    fn set_location(&mut self, span: Span) {
        self.inner.set_location(span);
    }
}
