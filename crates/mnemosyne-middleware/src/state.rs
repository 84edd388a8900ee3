//! Per-request state.
//!
//! [`RequestState`] is the request's storage bag: it owns the context cache,
//! the attributes assigned by the binding hook, the matched route's binding,
//! and the request ID used for log correlation. One is created when a
//! request enters and dropped when the request ends; nothing in it outlives
//! the request.

use crate::binding::RouteBinding;
use mnemosyne_core::{downcast_context, ContextCache, ContextValue, RequestId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// State scoped to exactly one request.
///
/// The state is shared as `Arc<RequestState>` between the hook chain and the
/// handler; the attribute map uses interior mutability so the binding hook
/// can attach context without exclusive access.
///
/// # Example
///
/// ```
/// use mnemosyne_core::context_value;
/// use mnemosyne_middleware::RequestState;
///
/// let state = RequestState::new();
/// state.assign("context", context_value(String::from("alice")));
///
/// let user = state.attribute_as::<String>("context").unwrap();
/// assert_eq!(*user, "alice");
/// ```
pub struct RequestState {
    request_id: RequestId,
    binding: Option<RouteBinding>,
    cache: ContextCache,
    attributes: Mutex<HashMap<String, ContextValue>>,
}

impl RequestState {
    /// Creates state for a request whose route carries no binding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            binding: None,
            cache: ContextCache::new(),
            attributes: Mutex::new(HashMap::new()),
        }
    }

    /// Creates state carrying the matched route's binding.
    #[must_use]
    pub fn with_binding(binding: RouteBinding) -> Self {
        Self {
            request_id: RequestId::new(),
            binding: Some(binding),
            cache: ContextCache::new(),
            attributes: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the matched route's binding, if any.
    #[must_use]
    pub fn binding(&self) -> Option<&RouteBinding> {
        self.binding.as_ref()
    }

    /// Returns the request's context cache.
    #[must_use]
    pub fn cache(&self) -> &ContextCache {
        &self.cache
    }

    /// Attaches a context value under an attribute name.
    pub fn assign(&self, attribute: impl Into<String>, value: ContextValue) {
        self.attributes.lock().insert(attribute.into(), value);
    }

    /// Returns the context value attached under an attribute name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<ContextValue> {
        self.attributes.lock().get(name).cloned()
    }

    /// Returns an attached context value downcast to a concrete type.
    #[must_use]
    pub fn attribute_as<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.attribute(name)
            .and_then(|value| downcast_context::<T>(&value))
    }

    /// Checks whether an attribute is attached.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.lock().contains_key(name)
    }
}

impl Default for RequestState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestState")
            .field("request_id", &self.request_id)
            .field("binding", &self.binding)
            .field("cache", &self.cache)
            .field(
                "attributes",
                &self.attributes.lock().keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
