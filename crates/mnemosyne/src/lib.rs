//! # Mnemosyne
//!
//! **Request-scoped, memoized context resolution for web servers**
//!
//! Route handlers declare which named *strategy* computes their auxiliary
//! context (loaded user, tenant, feature flags); Mnemosyne guarantees that
//! within a single request each strategy runs at most once, caching the
//! outcome, error or value, for everything downstream.
//!
//! - 🧠 **At-most-once** – a strategy's producer never runs twice in one request
//! - 🪢 **Schemes** – shared resolution algorithms parameterized per strategy
//! - 🔗 **Route bindings** – declare a strategy per route; failures 500 before
//!   the handler
//! - 🧩 **Injectable registries** – no module globals, fresh registries per test
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mnemosyne::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry.register_strategy(
//!     "user",
//!     StrategyDefinition::direct(produce_fn(|request| {
//!         let token = bearer_token(request);
//!         async move { Ok(context_value(load_user(token).await?)) }
//!     })),
//! )?;
//!
//! let resolver = ContextResolver::new(registry);
//! let chain = HookChain::new().with_hook(ContextBindingHook::new(resolver));
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → ContextBindingHook → resolve(strategy) → cache → Handler
//!                                       │
//!                                       └─ error → 500, handler skipped
//! ```

#![doc(html_root_url = "https://docs.rs/mnemosyne/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use mnemosyne_core as core;

// Re-export middleware types
pub use mnemosyne_middleware as middleware;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use mnemosyne::prelude::*;
/// ```
pub mod prelude {
    pub use mnemosyne_core::{
        context_value, downcast_context, produce_fn, scheme_fn, ContextCache, ContextError,
        ContextResolver, ContextResult, ContextValue, ErrorCategory, ErrorEnvelope, ProduceContext,
        Registry, Request, RequestId, ResolveOutcome, Scheme, SchemeOptions, StrategyDefinition,
    };

    pub use mnemosyne_middleware::{
        Assign, ContextBindingHook, HookChain, HookFlow, RequestHook, RequestState, Response,
        ResponseExt, RouteBinding, DEFAULT_ATTRIBUTE,
    };
}
