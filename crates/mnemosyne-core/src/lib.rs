//! # Mnemosyne Core
//!
//! Core types for the Mnemosyne request-context resolution layer.
//!
//! This crate provides the pieces behind per-request, strategy-keyed context
//! memoization:
//!
//! - [`Registry`] - Process-wide strategy and scheme registration
//! - [`ContextResolver`] - Memoized `resolve(request, strategy)` operation
//! - [`ContextCache`] - Request-scoped outcome cache
//! - [`ProduceContext`] / [`Scheme`] - The two extensibility points
//! - [`ContextError`] - Standard error types and the response envelope

#![doc(html_root_url = "https://docs.rs/mnemosyne-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod error;
mod registry;
mod request;
mod resolver;
mod strategy;

pub use cache::{ContextCache, ResolveOutcome};
pub use error::{ContextError, ContextResult, ErrorCategory, ErrorDetail, ErrorEnvelope};
pub use registry::Registry;
pub use request::{Request, RequestId};
pub use resolver::ContextResolver;
pub use strategy::{
    context_value, downcast_context, produce_fn, scheme_fn, BoxFuture, ContextValue, ProduceContext,
    ProduceFn, ProduceResult, Scheme, SchemeFn, SchemeOptions, StrategyDefinition,
};
