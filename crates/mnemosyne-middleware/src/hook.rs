//! Request hooks and the context-binding hook.
//!
//! Hooks are the host server's pre-handler extension point: each incoming
//! request flows through the registered hooks in order, and any hook may
//! short-circuit the request with a response before the handler runs.
//! [`ContextBindingHook`] is the hook this crate exists for: it reads the
//! matched route's binding and resolves the bound strategy, so that a
//! failing or missing context never reaches the handler.

use crate::binding::Assign;
use crate::state::RequestState;
use crate::types::{Response, ResponseExt};
use mnemosyne_core::{BoxFuture, ContextError, ContextResolver, Request};
use std::sync::Arc;

/// Outcome of running a hook.
pub enum HookFlow {
    /// Proceed to the next hook, then the handler.
    Continue,
    /// Short-circuit the request with this response; the handler never runs.
    Abort(Response),
}

impl std::fmt::Debug for HookFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Abort(response) => f.debug_tuple("Abort").field(&response.status()).finish(),
        }
    }
}

/// A pre-handler request hook.
pub trait RequestHook: Send + Sync + 'static {
    /// Returns the unique name of this hook, used in logs.
    fn name(&self) -> &'static str;

    /// Runs once per incoming request, before the handler.
    fn on_request<'a>(
        &'a self,
        state: &'a RequestState,
        request: &'a Request,
    ) -> BoxFuture<'a, HookFlow>;
}

/// An ordered chain of request hooks terminated by a handler.
///
/// This is the thin stand-in for the host server's request lifecycle: hooks
/// run in registration order, and the first abort wins.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Arc<dyn RequestHook>>,
}

impl HookChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook to the chain.
    #[must_use]
    pub fn with_hook(mut self, hook: impl RequestHook) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Returns the names of all hooks in order.
    #[must_use]
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    /// Runs the request through every hook, then the handler.
    ///
    /// The handler future owns the request and shares the state; a hook
    /// abort returns its response without invoking the handler.
    pub async fn run<H>(&self, state: &Arc<RequestState>, request: Request, handler: H) -> Response
    where
        H: FnOnce(Arc<RequestState>, Request) -> BoxFuture<'static, Response> + Send,
    {
        for hook in &self.hooks {
            match hook.on_request(state, &request).await {
                HookFlow::Continue => {}
                HookFlow::Abort(response) => {
                    tracing::debug!(
                        hook = hook.name(),
                        request_id = %state.request_id(),
                        status = %response.status(),
                        "request short-circuited by hook"
                    );
                    return response;
                }
            }
        }

        handler(Arc::clone(state), request).await
    }
}

/// Hook that resolves the route's bound context strategy before the handler.
///
/// Per request:
///
/// 1. No binding on the route: pass through untouched.
/// 2. A binding without a strategy name is a configuration defect; the
///    request is short-circuited with an internal error before any
///    resolution is attempted.
/// 3. Otherwise the bound strategy is resolved through the shared
///    [`ContextResolver`]; on success the value is attached per the
///    binding's assign (or not at all for `Assign::Suppress`, which still
///    populates the cache for later explicit lookups), and on failure the
///    request is short-circuited with a 500-class envelope. Internal detail
///    goes to the logs, never to the client.
pub struct ContextBindingHook {
    resolver: ContextResolver,
}

impl ContextBindingHook {
    /// Creates the hook around a shared resolver.
    #[must_use]
    pub fn new(resolver: ContextResolver) -> Self {
        Self { resolver }
    }

    /// Returns the resolver this hook dispatches through.
    #[must_use]
    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }
}

impl RequestHook for ContextBindingHook {
    fn name(&self) -> &'static str {
        "context_binding"
    }

    fn on_request<'a>(
        &'a self,
        state: &'a RequestState,
        request: &'a Request,
    ) -> BoxFuture<'a, HookFlow> {
        Box::pin(async move {
            let Some(binding) = state.binding() else {
                return HookFlow::Continue;
            };

            let request_id = state.request_id().to_string();

            if binding.strategy().is_empty() {
                tracing::error!(
                    request_id = %request_id,
                    "route context binding is missing a strategy name"
                );
                let err = ContextError::configuration("route context binding must name a strategy");
                return HookFlow::Abort(Response::from_envelope(
                    err.status_code(),
                    &err.to_envelope(Some(&request_id)),
                ));
            }

            match self
                .resolver
                .resolve(request, state.cache(), binding.strategy())
                .await
            {
                Ok(value) => {
                    if let Assign::Named(attribute) = binding.assign() {
                        state.assign(attribute.clone(), value);
                    }
                    HookFlow::Continue
                }
                Err(err) => {
                    tracing::error!(
                        request_id = %request_id,
                        strategy = binding.strategy(),
                        error = %err,
                        "failed to resolve request context"
                    );
                    HookFlow::Abort(Response::from_envelope(
                        err.status_code(),
                        &err.to_envelope(Some(&request_id)),
                    ))
                }
            }
        })
    }
}
