//! Strategy and scheme registries.
//!
//! The [`Registry`] owns the process-wide mapping from strategy name to its
//! dispatch target, and from scheme name to its resolution algorithm. It is
//! populated during the single-threaded startup phase and then frozen by
//! moving it into a [`ContextResolver`]; nothing mutates it while traffic is
//! being served, so registry reads take no lock.
//!
//! Registries are plain injectable values rather than module globals, so
//! every test can build a fresh one.
//!
//! [`ContextResolver`]: crate::resolver::ContextResolver

use crate::error::{ContextError, ContextResult};
use crate::strategy::{ProduceContext, Scheme, SchemeOptions, StrategyDefinition};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How a registered strategy's resolution is dispatched.
///
/// The scheme reference is resolved to its `Arc` at registration time, so a
/// missing scheme can only ever surface as a registration failure.
#[derive(Clone)]
pub(crate) enum Dispatch {
    /// Invoke the strategy's own producer.
    Direct(Arc<dyn ProduceContext>),
    /// Invoke a shared scheme with the strategy's options.
    Scheme {
        scheme: Arc<dyn Scheme>,
        options: SchemeOptions,
    },
}

/// Process-wide strategy and scheme registry.
///
/// # Example
///
/// ```
/// use mnemosyne_core::{context_value, produce_fn, Registry, StrategyDefinition};
///
/// let mut registry = Registry::new();
/// registry
///     .register_strategy(
///         "user",
///         StrategyDefinition::direct(produce_fn(|_| async { Ok(context_value("alice")) })),
///     )
///     .unwrap();
///
/// assert!(registry.has_strategy("user"));
/// ```
#[derive(Default)]
pub struct Registry {
    strategies: HashMap<String, Dispatch>,
    schemes: HashMap<String, Arc<dyn Scheme>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolution scheme under `name`.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if `name` is empty or already
    /// registered. Registration failures are fatal at startup; the server
    /// must not begin serving with an invalid registry.
    pub fn register_scheme(&mut self, name: impl Into<String>, scheme: impl Scheme) -> ContextResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ContextError::configuration("context scheme must have a name"));
        }
        if self.schemes.contains_key(&name) {
            return Err(ContextError::configuration(format!(
                "context scheme `{name}` is already registered"
            )));
        }

        self.schemes.insert(name, Arc::new(scheme));
        Ok(())
    }

    /// Registers a strategy under `name`.
    ///
    /// A definition that references a scheme is checked here, not at first
    /// use: the resolver never discovers a missing scheme at request time.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if `name` is empty, already
    /// registered, or the definition references an unregistered scheme.
    pub fn register_strategy(
        &mut self,
        name: impl Into<String>,
        definition: StrategyDefinition,
    ) -> ContextResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ContextError::configuration("context strategy must have a name"));
        }
        if self.strategies.contains_key(&name) {
            return Err(ContextError::configuration(format!(
                "context strategy `{name}` is already registered"
            )));
        }

        let dispatch = match definition {
            StrategyDefinition::Direct(producer) => Dispatch::Direct(producer),
            StrategyDefinition::Scheme { scheme, options } => {
                let Some(resolved) = self.schemes.get(&scheme) else {
                    return Err(ContextError::configuration(format!(
                        "context strategy `{name}` references unknown scheme `{scheme}`"
                    )));
                };
                Dispatch::Scheme {
                    scheme: Arc::clone(resolved),
                    options,
                }
            }
        };

        self.strategies.insert(name, dispatch);
        Ok(())
    }

    /// Returns the dispatch target for a strategy, if registered.
    pub(crate) fn dispatch(&self, strategy: &str) -> Option<&Dispatch> {
        self.strategies.get(strategy)
    }

    /// Checks if a strategy is registered.
    #[must_use]
    pub fn has_strategy(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Checks if a scheme is registered.
    #[must_use]
    pub fn has_scheme(&self, name: &str) -> bool {
        self.schemes.contains_key(name)
    }

    /// Returns the number of registered strategies.
    #[must_use]
    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Returns the number of registered schemes.
    #[must_use]
    pub fn scheme_count(&self) -> usize {
        self.schemes.len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("strategies", &self.strategies.keys().collect::<Vec<_>>())
            .field("schemes", &self.schemes.keys().collect::<Vec<_>>())
            .finish()
    }
}
