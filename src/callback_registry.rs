//! Keyed callback table.
//!
//! A `CallbackRegistry` maps a key (model path, parameter name, session handle) to a
//! handler. Registration stores the handler; dispatch looks it up and invokes it.
//! Looking up a key nobody registered is the common case and yields the default result.
//!
//! Each key holds at most one handler. Under `ConflictPolicy::Overwrite` the last
//! registration wins; under `ConflictPolicy::Reject` the first one stays.

use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{CallbackError, CallbackEvent, HandlerError};

/// Type alias for the user-supplied tracing callback.
pub type TraceCallback = dyn Fn(&CallbackEvent) + Send + Sync + 'static;

/// Handler taking a single borrowed argument.
///
/// Registries of this handler type get the `register`/`trigger` shorthands.
pub type Handler<A, R> = dyn Fn(&A) -> Result<R, HandlerError> + Send + Sync + 'static;

/// What happens when a key is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Replace the earlier handler silently.
    #[default]
    Overwrite,
    /// Keep the earlier handler and fail with `CallbackError::KeyConflict`.
    Reject,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registration {
    /// An earlier handler for the same key was overwritten.
    pub replaced: bool,
    /// The external collaborator acknowledged the declaration.
    pub announced: bool,
}

/// Keyed handler table with optional tracing.
///
/// `H` is usually a `dyn Fn(..)` type. The table is guarded by a mutex so one registry
/// can be filled on an initialization thread and dispatched from the host's event
/// thread; the lock is never held while a handler runs.
pub struct CallbackRegistry<K, H: ?Sized> {
    name: &'static str,
    policy: ConflictPolicy,
    handlers: Mutex<HashMap<K, Arc<H>>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl<K, H: ?Sized> fmt::Debug for CallbackRegistry<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .handlers
            .lock()
            .map(|map| map.len())
            .unwrap_or_else(|p| p.into_inner().len());
        f.debug_struct("CallbackRegistry")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("len", &len)
            .finish()
    }
}

impl<K, H> CallbackRegistry<K, H>
where
    K: Eq + Hash + fmt::Debug,
    H: ?Sized,
{
    /// Create an empty registry that overwrites on re-registration.
    pub fn new(name: &'static str) -> Self {
        Self::with_policy(name, ConflictPolicy::default())
    }

    /// Create an empty registry with an explicit conflict policy.
    pub fn with_policy(name: &'static str, policy: ConflictPolicy) -> Self {
        Self {
            name,
            policy,
            handlers: Mutex::new(HashMap::new()),
            trace: Mutex::new(None),
        }
    }

    /// Label used in events, logs and errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Policy applied when a key is registered twice.
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    // ---------------------------------------------------------------------------------------------
    // Tracing
    // ---------------------------------------------------------------------------------------------

    /// Set a tracing callback invoked for every register and dispatch.
    ///
    /// The callback runs without any registry lock held, so it may query the registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&CallbackEvent) + Send + Sync + 'static) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    ///
    /// Registered handlers are not affected.
    pub fn clear_trace_callback(&self) {
        let mut guard = self.trace.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    fn emit_event(&self, event: &CallbackEvent) {
        let callback = self
            .trace
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------------------------

    /// Store a shared handler under `key`.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// If the table lock is poisoned, the inner map is recovered and the insert proceeds.
    /// An insert either happened completely or not at all, so the map stays consistent.
    ///
    /// # Errors
    ///
    /// `CallbackError::KeyConflict` if the key is taken and the policy is `Reject`.
    pub fn register_arc(&self, key: K, handler: Arc<H>) -> Result<Registration, CallbackError> {
        let key_repr = format!("{key:?}");

        let mut map = self.handlers.lock().unwrap_or_else(|p| p.into_inner());
        let replaced = map.contains_key(&key);
        if replaced && self.policy == ConflictPolicy::Reject {
            drop(map);
            warn!(registry = self.name, key = %key_repr, "duplicate callback registration rejected");
            self.emit_event(&CallbackEvent::Rejected {
                registry: self.name,
                key: key_repr.clone(),
            });
            return Err(CallbackError::KeyConflict {
                registry: self.name,
                key: key_repr,
            });
        }
        map.insert(key, handler);
        drop(map);

        debug!(registry = self.name, key = %key_repr, replaced, "registered callback");
        self.emit_event(&CallbackEvent::Register {
            registry: self.name,
            key: key_repr,
            replaced,
        });

        Ok(Registration {
            replaced,
            announced: false,
        })
    }

    // ---------------------------------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------------------------------

    /// Shared handle to the handler registered for `key`, if any.
    pub fn handler<Q>(&self, key: &Q) -> Option<Arc<H>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.handlers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }

    /// Whether a handler is registered for `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.handlers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(key)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the registered keys, in no particular order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.handlers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    // ---------------------------------------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------------------------------------

    /// Invoke the handler registered for `key` through `invoke`.
    ///
    /// Returns `R::default()` without calling `invoke` when nothing is registered.
    /// The table lock is released before the handler runs, so handlers may register
    /// further handlers.
    ///
    /// # Errors
    ///
    /// - `CallbackError::HandlerFailed` if the handler returned an error
    /// - `CallbackError::HandlerPanicked` if the handler panicked
    pub fn dispatch<Q, R, F>(&self, key: &Q, invoke: F) -> Result<R, CallbackError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        R: Default,
        F: FnOnce(&H) -> Result<R, HandlerError>,
    {
        let handler = self.handler(key);
        let key_repr = format!("{key:?}");

        self.emit_event(&CallbackEvent::Trigger {
            registry: self.name,
            key: key_repr.clone(),
            found: handler.is_some(),
        });

        let Some(handler) = handler else {
            return Ok(R::default());
        };

        debug!(registry = self.name, key = %key_repr, "triggering callback");
        match panic::catch_unwind(AssertUnwindSafe(|| invoke(&*handler))) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(source)) => Err(CallbackError::HandlerFailed {
                registry: self.name,
                key: key_repr,
                source,
            }),
            Err(payload) => Err(CallbackError::HandlerPanicked {
                registry: self.name,
                key: key_repr,
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Remove every handler. Intended for tests.
    #[doc(hidden)]
    pub fn clear(&self) {
        self.emit_event(&CallbackEvent::Clear {
            registry: self.name,
        });
        self.handlers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }
}

impl<K, A, R> CallbackRegistry<K, Handler<A, R>>
where
    K: Eq + Hash + fmt::Debug,
    A: 'static,
    R: 'static,
{
    /// Register an infallible handler.
    ///
    /// # Errors
    ///
    /// `CallbackError::KeyConflict` if the key is taken and the policy is `Reject`.
    pub fn register<F>(&self, key: K, handler: F) -> Result<Registration, CallbackError>
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        let handler: Arc<Handler<A, R>> =
            Arc::new(move |args: &A| -> Result<R, HandlerError> { Ok(handler(args)) });
        self.register_arc(key, handler)
    }

    /// Register a handler that can fail.
    ///
    /// Errors returned by the handler surface from `trigger` as
    /// `CallbackError::HandlerFailed`.
    ///
    /// # Errors
    ///
    /// `CallbackError::KeyConflict` if the key is taken and the policy is `Reject`.
    pub fn try_register<F>(&self, key: K, handler: F) -> Result<Registration, CallbackError>
    where
        F: Fn(&A) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        let handler: Arc<Handler<A, R>> = Arc::new(handler);
        self.register_arc(key, handler)
    }

    /// Invoke the handler for `key` with `args`, or return `R::default()` if none.
    pub fn trigger<Q>(&self, key: &Q, args: &A) -> Result<R, CallbackError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
        R: Default,
    {
        self.dispatch(key, |handler| handler(args))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
