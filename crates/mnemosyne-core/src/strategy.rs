//! Strategy and scheme traits.
//!
//! A **strategy** is a named unit of logic that computes a request's context
//! value. It either produces the context directly (via [`ProduceContext`])
//! or delegates to a named **scheme**: a shared resolution algorithm
//! parameterized by per-strategy [`SchemeOptions`]. Several strategies can
//! share one scheme (e.g. "resolve via bearer token") with different options.

use crate::error::ContextError;
use crate::request::Request;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future, as returned by context producers and schemes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An arbitrary context value computed for a request.
///
/// The `Arc` is what gives resolution its identity guarantee: every
/// resolution of the same `(request, strategy)` pair hands back a clone of
/// the same allocation, so interior mutation made through one handle is
/// visible through all of them.
pub type ContextValue = Arc<dyn Any + Send + Sync>;

/// Result of producing a context value.
pub type ProduceResult = Result<ContextValue, ContextError>;

/// Wraps a value into a [`ContextValue`].
#[must_use]
pub fn context_value<T: Send + Sync + 'static>(value: T) -> ContextValue {
    Arc::new(value)
}

/// Downcasts a [`ContextValue`] to a concrete type.
///
/// Returns `None` if the stored value is of a different type.
#[must_use]
pub fn downcast_context<T: Send + Sync + 'static>(value: &ContextValue) -> Option<Arc<T>> {
    Arc::clone(value).downcast::<T>().ok()
}

/// A unit that computes a context value for a request.
///
/// This is the direct form of a strategy: the producer receives the current
/// request and completes exactly once with an error or a value.
///
/// # Example
///
/// ```
/// use mnemosyne_core::{context_value, produce_fn, ProduceContext};
///
/// let producer = produce_fn(|_request| async { Ok(context_value("hello")) });
/// ```
pub trait ProduceContext: Send + Sync + 'static {
    /// Produces the context value for this request.
    fn produce<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, ProduceResult>;
}

/// A context producer built from a plain function.
///
/// The closure receives the request and returns a future resolving to the
/// context value. Data needed inside the future must be extracted from the
/// request before the async block.
pub struct ProduceFn<F> {
    func: F,
}

impl<F, Fut> ProduceContext for ProduceFn<F>
where
    F: Fn(&Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProduceResult> + Send + 'static,
{
    fn produce<'a>(&'a self, request: &'a Request) -> BoxFuture<'a, ProduceResult> {
        Box::pin((self.func)(request))
    }
}

/// Creates a [`ProduceContext`] from a function.
///
/// # Example
///
/// ```
/// use mnemosyne_core::{context_value, produce_fn};
///
/// let producer = produce_fn(|request| {
///     let path = request.uri().path().to_string();
///     async move { Ok(context_value(path)) }
/// });
/// ```
pub fn produce_fn<F, Fut>(func: F) -> ProduceFn<F>
where
    F: Fn(&Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProduceResult> + Send + 'static,
{
    ProduceFn { func }
}

/// A shared resolution algorithm that strategies can delegate to.
///
/// The scheme receives the request and the delegating strategy's options,
/// and is responsible for producing the error-or-context outcome, typically
/// by calling back into the producer carried in the options.
pub trait Scheme: Send + Sync + 'static {
    /// Resolves a context value on behalf of a strategy.
    fn resolve<'a>(
        &'a self,
        request: &'a Request,
        options: &'a SchemeOptions,
    ) -> BoxFuture<'a, ProduceResult>;
}

/// A scheme built from a plain function.
///
/// Like [`ProduceFn`], the returned future cannot borrow the request or the
/// options; schemes that delegate into `options.producer()` should implement
/// [`Scheme`] directly instead.
pub struct SchemeFn<F> {
    func: F,
}

impl<F, Fut> Scheme for SchemeFn<F>
where
    F: Fn(&Request, &SchemeOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProduceResult> + Send + 'static,
{
    fn resolve<'a>(
        &'a self,
        request: &'a Request,
        options: &'a SchemeOptions,
    ) -> BoxFuture<'a, ProduceResult> {
        Box::pin((self.func)(request, options))
    }
}

/// Creates a [`Scheme`] from a function.
pub fn scheme_fn<F, Fut>(func: F) -> SchemeFn<F>
where
    F: Fn(&Request, &SchemeOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ProduceResult> + Send + 'static,
{
    SchemeFn { func }
}

/// Per-strategy options consumed by a scheme.
///
/// Options carry an optional inner producer (the sub-contract a scheme
/// typically delegates back into) plus free-form parameters.
#[derive(Clone, Default)]
pub struct SchemeOptions {
    producer: Option<Arc<dyn ProduceContext>>,
    params: serde_json::Value,
}

impl SchemeOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an inner context producer for the scheme to delegate to.
    #[must_use]
    pub fn with_producer(mut self, producer: impl ProduceContext) -> Self {
        self.producer = Some(Arc::new(producer));
        self
    }

    /// Attaches free-form parameters for the scheme.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }

    /// Returns the inner producer, if any.
    #[must_use]
    pub fn producer(&self) -> Option<&Arc<dyn ProduceContext>> {
        self.producer.as_ref()
    }

    /// Returns the free-form parameters.
    #[must_use]
    pub fn params(&self) -> &serde_json::Value {
        &self.params
    }
}

impl std::fmt::Debug for SchemeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeOptions")
            .field("has_producer", &self.producer.is_some())
            .field("params", &self.params)
            .finish()
    }
}

/// How a strategy produces its context: directly, or through a scheme.
///
/// This is the value passed to [`Registry::register_strategy`]. The scheme
/// reference is validated at registration time; an unknown scheme name is
/// a configuration error, never a request-time surprise.
///
/// [`Registry::register_strategy`]: crate::registry::Registry::register_strategy
#[derive(Clone)]
pub enum StrategyDefinition {
    /// The strategy carries its own context producer.
    Direct(Arc<dyn ProduceContext>),
    /// The strategy delegates to a registered scheme.
    Scheme {
        /// Name of the scheme to dispatch through.
        scheme: String,
        /// Options handed to the scheme on every resolution.
        options: SchemeOptions,
    },
}

impl StrategyDefinition {
    /// Creates a direct definition from a producer.
    #[must_use]
    pub fn direct(producer: impl ProduceContext) -> Self {
        Self::Direct(Arc::new(producer))
    }

    /// Creates a definition that dispatches through a named scheme.
    #[must_use]
    pub fn via_scheme(scheme: impl Into<String>, options: SchemeOptions) -> Self {
        Self::Scheme {
            scheme: scheme.into(),
            options,
        }
    }
}

impl std::fmt::Debug for StrategyDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => f.debug_tuple("Direct").finish(),
            Self::Scheme { scheme, options } => f
                .debug_struct("Scheme")
                .field("scheme", scheme)
                .field("options", options)
                .finish(),
        }
    }
}
