//! # Mnemosyne Middleware
//!
//! Route-binding hook and per-request state for the Mnemosyne context layer.
//!
//! This crate is the host-server-facing half of the system. It provides:
//!
//! - [`RouteBinding`] - Normalized per-route configuration (bare strategy
//!   name, or `{strategy, assign}`)
//! - [`RequestState`] - The request-scoped storage bag (context cache plus
//!   assigned attributes)
//! - [`HookChain`] / [`RequestHook`] - The pre-handler extension point
//! - [`ContextBindingHook`] - The hook that resolves a route's bound
//!   strategy and short-circuits the request on failure
//!
//! ## Request flow
//!
//! ```text
//! Request → HookChain → ContextBindingHook → Handler
//!                             │
//!                             └─ resolve failure → 500, handler skipped
//! ```
//!
//! ## Example
//!
//! ```
//! use mnemosyne_core::{context_value, produce_fn, ContextResolver, Registry, StrategyDefinition};
//! use mnemosyne_middleware::{ContextBindingHook, HookChain, RequestState, RouteBinding};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let mut registry = Registry::new();
//! registry
//!     .register_strategy(
//!         "user",
//!         StrategyDefinition::direct(produce_fn(|_| async { Ok(context_value("alice")) })),
//!     )
//!     .unwrap();
//!
//! let chain = HookChain::new().with_hook(ContextBindingHook::new(ContextResolver::new(registry)));
//! let state = Arc::new(RequestState::with_binding(RouteBinding::named("user")));
//! # let request = http::Request::builder()
//! #     .uri("/")
//! #     .body(http_body_util::Full::new(bytes::Bytes::new()))
//! #     .unwrap();
//!
//! let response = chain
//!     .run(&state, request, |state, _request| {
//!         Box::pin(async move {
//!             let user = state.attribute_as::<&str>("context").unwrap();
//!             http::Response::builder()
//!                 .body(http_body_util::Full::new(bytes::Bytes::from(format!("hi {user}"))))
//!                 .unwrap()
//!         })
//!     })
//!     .await;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/mnemosyne-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binding;
mod hook;
mod state;
mod types;

pub use binding::{Assign, RouteBinding, DEFAULT_ATTRIBUTE};
pub use hook::{ContextBindingHook, HookChain, HookFlow, RequestHook};
pub use state::RequestState;
pub use types::{Response, ResponseExt};
