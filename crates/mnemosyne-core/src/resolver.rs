//! The memoizing context resolver.
//!
//! [`ContextResolver`] is the operation behind every context lookup: consult
//! the request's cache, invoke the strategy (directly or through its scheme)
//! on a miss, store the outcome, and hand it back. It owns the frozen
//! [`Registry`], so constructing a resolver is what ends the registration
//! phase.

use crate::cache::{ContextCache, ResolveOutcome};
use crate::error::ContextError;
use crate::registry::{Dispatch, Registry};
use crate::request::Request;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Resolves named context strategies against a per-request cache.
///
/// One resolver instance is constructed at startup and shared (it is cheap
/// to clone) with every hook or handler that needs context lookups.
///
/// # Example
///
/// ```
/// use mnemosyne_core::{
///     context_value, produce_fn, ContextCache, ContextResolver, Registry, StrategyDefinition,
/// };
///
/// # tokio_test::block_on(async {
/// let mut registry = Registry::new();
/// registry
///     .register_strategy(
///         "greeting",
///         StrategyDefinition::direct(produce_fn(|_| async { Ok(context_value("hello")) })),
///     )
///     .unwrap();
///
/// let resolver = ContextResolver::new(registry);
/// let cache = ContextCache::new();
/// let request = http::Request::builder()
///     .uri("/")
///     .body(http_body_util::Full::new(bytes::Bytes::new()))
///     .unwrap();
///
/// let value = resolver.resolve(&request, &cache, "greeting").await.unwrap();
/// assert_eq!(*mnemosyne_core::downcast_context::<&str>(&value).unwrap(), "hello");
/// assert!(cache.contains("greeting"));
/// # });
/// ```
#[derive(Clone)]
pub struct ContextResolver {
    registry: Arc<Registry>,
}

impl ContextResolver {
    /// Freezes a registry into a resolver.
    ///
    /// After this point no further registration is possible; the registry
    /// is shared immutably with every request.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Returns the frozen registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolves `strategy` for the request, memoized in `cache`.
    ///
    /// The strategy's producer runs at most once per request: the first
    /// outcome (error or value) is cached and every later call for the
    /// same name returns it unchanged, the value as the identical
    /// allocation. An unknown strategy name is a server-side configuration
    /// defect reported as an internal error; nothing was invoked, so
    /// nothing is cached for it.
    ///
    /// A panic inside the producer is caught here and converted into a
    /// [`ContextError::Panicked`] outcome for this request only.
    pub async fn resolve(
        &self,
        request: &Request,
        cache: &ContextCache,
        strategy: &str,
    ) -> ResolveOutcome {
        debug_assert!(!strategy.is_empty(), "context strategy name must be non-empty");
        if strategy.is_empty() {
            return Err(Arc::new(ContextError::configuration(
                "context strategy name must be non-empty",
            )));
        }

        if let Some(outcome) = cache.get(strategy) {
            tracing::debug!(strategy, "context cache hit");
            return outcome;
        }

        let Some(dispatch) = self.registry.dispatch(strategy) else {
            tracing::error!(strategy, "context strategy not found");
            return Err(Arc::new(ContextError::unknown_strategy(strategy)));
        };

        let invocation = match dispatch {
            Dispatch::Direct(producer) => producer.produce(request),
            Dispatch::Scheme { scheme, options } => scheme.resolve(request, options),
        };

        let outcome = match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                tracing::error!(strategy, error = %err, "context strategy failed");
                Err(Arc::new(err))
            }
            Err(_) => {
                tracing::error!(strategy, "context strategy panicked");
                Err(Arc::new(ContextError::panicked(strategy)))
            }
        };

        cache.insert(strategy, outcome)
    }
}

impl std::fmt::Debug for ContextResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextResolver")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{
        context_value, downcast_context, produce_fn, BoxFuture, ProduceContext, ProduceResult,
        Scheme, SchemeOptions, StrategyDefinition,
    };
    use bytes::Bytes;
    use http_body_util::Full;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn test_request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    /// Producer that counts how many times it was invoked.
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl ProduceContext for Counting {
        fn produce<'a>(&'a self, _request: &'a Request) -> BoxFuture<'a, ProduceResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(context_value(Mutex::new(vec![1_u32]))) })
        }
    }

    /// Producer that fails, counting invocations.
    struct Failing {
        calls: Arc<AtomicUsize>,
    }

    impl ProduceContext for Failing {
        fn produce<'a>(&'a self, _request: &'a Request) -> BoxFuture<'a, ProduceResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(ContextError::resolution("failing", anyhow::anyhow!("boom"))) })
        }
    }

    fn resolver_with(name: &str, producer: impl ProduceContext) -> ContextResolver {
        let mut registry = Registry::new();
        registry
            .register_strategy(name, StrategyDefinition::direct(producer))
            .unwrap();
        ContextResolver::new(registry)
    }

    #[tokio::test]
    async fn test_strategy_runs_at_most_once_per_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = resolver_with("user", Counting { calls: Arc::clone(&calls) });
        let cache = ContextCache::new();
        let request = test_request();

        for _ in 0..5 {
            resolver.resolve(&request, &cache, "user").await.unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeat_resolution_returns_identical_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = resolver_with("user", Counting { calls });
        let cache = ContextCache::new();
        let request = test_request();

        let first = resolver.resolve(&request, &cache, "user").await.unwrap();
        let second = resolver.resolve(&request, &cache, "user").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // Mutation through the first handle is visible through the second.
        downcast_context::<Mutex<Vec<u32>>>(&first)
            .unwrap()
            .lock()
            .push(2);
        let seen = downcast_context::<Mutex<Vec<u32>>>(&second).unwrap();
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failed_strategy_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = resolver_with("failing", Failing { calls: Arc::clone(&calls) });
        let cache = ContextCache::new();
        let request = test_request();

        let first = resolver.resolve(&request, &cache, "failing").await.unwrap_err();
        let second = resolver.resolve(&request, &cache, "failing").await.unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(matches!(*first, ContextError::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_internal_error_and_not_cached() {
        let resolver = ContextResolver::new(Registry::new());
        let cache = ContextCache::new();
        let request = test_request();

        let err = resolver.resolve(&request, &cache, "missing").await.unwrap_err();
        assert!(matches!(*err, ContextError::UnknownStrategy { .. }));
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_strategy_is_caught_and_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&calls);
        let resolver = resolver_with(
            "wild",
            produce_fn(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
                async { panic!("strategy went sideways") }
            }),
        );
        let cache = ContextCache::new();
        let request = test_request();

        let first = resolver.resolve(&request, &cache, "wild").await.unwrap_err();
        let second = resolver.resolve(&request, &cache, "wild").await.unwrap_err();

        assert!(matches!(*first, ContextError::Panicked { .. }));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_requests_are_isolated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = resolver_with("user", Counting { calls: Arc::clone(&calls) });
        let request = test_request();

        let cache_a = ContextCache::new();
        let cache_b = ContextCache::new();

        let a = resolver.resolve(&request, &cache_a, "user").await.unwrap();
        let b = resolver.resolve(&request, &cache_b, "user").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    /// Shared lookup algorithm: reads the header named in the strategy's
    /// params, falling back to "anonymous".
    struct HeaderLookup;

    impl Scheme for HeaderLookup {
        fn resolve<'a>(
            &'a self,
            request: &'a Request,
            options: &'a SchemeOptions,
        ) -> BoxFuture<'a, ProduceResult> {
            Box::pin(async move {
                let header = options.params()["header"].as_str().ok_or_else(|| {
                    ContextError::configuration("header scheme requires a `header` param")
                })?;
                let value = request
                    .headers()
                    .get(header)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("anonymous")
                    .to_string();
                Ok(context_value(value))
            })
        }
    }

    #[tokio::test]
    async fn test_two_strategies_share_one_scheme() {
        let mut registry = Registry::new();
        registry.register_scheme("header", HeaderLookup).unwrap();
        registry
            .register_strategy(
                "user",
                StrategyDefinition::via_scheme(
                    "header",
                    SchemeOptions::new().with_params(serde_json::json!({"header": "x-user"})),
                ),
            )
            .unwrap();
        registry
            .register_strategy(
                "tenant",
                StrategyDefinition::via_scheme(
                    "header",
                    SchemeOptions::new().with_params(serde_json::json!({"header": "x-tenant"})),
                ),
            )
            .unwrap();

        let resolver = ContextResolver::new(registry);
        let cache = ContextCache::new();
        let request = http::Request::builder()
            .uri("/test")
            .header("x-user", "alice")
            .header("x-tenant", "acme")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let user = resolver.resolve(&request, &cache, "user").await.unwrap();
        let tenant = resolver.resolve(&request, &cache, "tenant").await.unwrap();

        assert_eq!(*downcast_context::<String>(&user).unwrap(), "alice");
        assert_eq!(*downcast_context::<String>(&tenant).unwrap(), "acme");
    }

    #[test]
    fn test_empty_strategy_name_is_rejected() {
        // Precondition violations are programming errors; in release builds
        // they surface as a configuration error instead of a panic.
        let result = std::panic::catch_unwind(|| {
            let resolver = ContextResolver::new(Registry::new());
            let cache = ContextCache::new();
            let request = test_request();
            tokio_test::block_on(resolver.resolve(&request, &cache, ""))
        });

        match result {
            // Debug build: the debug_assert fires.
            Err(_) => {}
            // Release build: a configuration error comes back.
            Ok(outcome) => {
                let err = outcome.unwrap_err();
                assert!(matches!(*err, ContextError::Configuration { .. }));
            }
        }
    }
}
