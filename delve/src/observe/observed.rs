//! Tool decorator that records a span per call.

use std::fmt;

use async_trait::async_trait;

use crate::tool::Tool;

use super::{SpanKind, Tracer, to_json};

/// A [`Tool`] wrapped so that each call is reported as a span.
///
/// `Observed<T>` is itself a `Tool` with the same name, arguments, output and
/// error as `T`, so it can stand in for `T` anywhere.
pub struct Observed<T> {
    inner: T,
    tracer: Tracer,
    kind: SpanKind,
}

impl<T> Observed<T> {
    pub(super) const fn new(inner: T, tracer: Tracer) -> Self {
        Self {
            inner,
            tracer,
            kind: SpanKind::Tool,
        }
    }

    /// Report spans under a different kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// The wrapped tool.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.inner
    }

    /// Unwrap the tool.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for Observed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observed")
            .field("inner", &self.inner)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: Tool> Tool for Observed<T> {
    const NAME: &'static str = T::NAME;
    type Args = T::Args;
    type Output = T::Output;
    type Error = T::Error;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let inputs = to_json(&args);
        self.tracer
            .observe_call(T::NAME, self.kind.clone(), inputs, self.inner.call(args))
            .await
    }
}
