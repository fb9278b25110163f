//! The three callback families wired to one host.
//!
//! A [`Bridge`] owns an independent [`CallbackRegistry`] per event family:
//!
//! - model initializers, keyed by dotted [`ModelPath`]
//! - simulation parameter callbacks, keyed by parameter name
//! - GUI listeners, keyed by simulation session
//!
//! Registration stores the handler locally and, when the host is reachable, announces
//! it through the [`CollaboratorLink`]. Triggers are called by the host.
//!
//! # Examples
//!
//! ```rust
//! use callback_bridge::{Bridge, BridgeConfig, GuiEvent, ParameterKind, ParameterValue};
//! use std::sync::{Arc, Mutex};
//!
//! let bridge: Bridge<u32, String> = Bridge::detached(BridgeConfig::default());
//!
//! let angle = Arc::new(Mutex::new(0.0));
//! let angle_clone = angle.clone();
//! bridge
//!     .register_parameter("angle1", ParameterKind::Scalar, move |_session, value| {
//!         *angle_clone.lock().unwrap() = value.as_scalar().unwrap_or_default();
//!     })
//!     .unwrap();
//! bridge.trigger_parameter(&1, "angle1", &ParameterValue::Scalar(45.0)).unwrap();
//! assert_eq!(*angle.lock().unwrap(), 45.0);
//!
//! bridge.register_gui_listener(1, |_session, event| event.is_key('q')).unwrap();
//! assert!(bridge.trigger_gui_event(&1, &GuiEvent::key_up('q')).unwrap());
//! assert!(!bridge.trigger_gui_event(&2, &GuiEvent::key_up('q')).unwrap());
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::{
    BridgeConfig, CallbackError, CallbackRegistry, CollaboratorLink, Declaration, GuiEvent,
    Handler, HandlerError, ModelPath, ParameterKind, ParameterValue, Registration,
};

/// Callback for a simulation parameter change: `(session, value)`.
pub type ParameterHandler<S> =
    dyn Fn(&S, &ParameterValue) -> Result<(), HandlerError> + Send + Sync + 'static;

/// Callback for a GUI event; returns whether the event was consumed.
pub type GuiHandler<S> = dyn Fn(&S, &GuiEvent) -> Result<bool, HandlerError> + Send + Sync + 'static;

/// A parameter callback together with the kind it was declared with.
pub struct ParameterSlot<S> {
    kind: ParameterKind,
    handler: Box<ParameterHandler<S>>,
}

impl<S> ParameterSlot<S> {
    /// Kind the parameter was registered with.
    pub fn kind(&self) -> ParameterKind {
        self.kind
    }
}

/// Callback registries for one host, plus the link used to announce them.
pub struct Bridge<S, M> {
    config: BridgeConfig,
    link: CollaboratorLink,
    model_init: CallbackRegistry<ModelPath, Handler<M, ()>>,
    parameters: CallbackRegistry<String, ParameterSlot<S>>,
    gui: CallbackRegistry<S, GuiHandler<S>>,
}

impl<S, M> fmt::Debug for Bridge<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("link", &self.link)
            .field("model_init", &self.model_init)
            .field("parameters", &self.parameters)
            .field("gui", &self.gui)
            .finish()
    }
}

impl<S, M> Bridge<S, M>
where
    S: Eq + Hash + fmt::Debug,
    M: 'static,
{
    /// Create a bridge with empty registries, announcing through `link`.
    ///
    /// `config.conflict_policy` applies to all three registries.
    pub fn new(config: BridgeConfig, link: CollaboratorLink) -> Self {
        let policy = config.conflict_policy;
        Self {
            config,
            link,
            model_init: CallbackRegistry::with_policy("model_init", policy),
            parameters: CallbackRegistry::with_policy("parameters", policy),
            gui: CallbackRegistry::with_policy("gui", policy),
        }
    }

    /// A bridge with no host attached. Local dispatch works; nothing is announced.
    pub fn detached(config: BridgeConfig) -> Self {
        Self::new(config, CollaboratorLink::unavailable("detached"))
    }

    /// Settings the bridge was created with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Outcome of the capability probe.
    pub fn link(&self) -> &CollaboratorLink {
        &self.link
    }

    /// Whether registrations are announced to a host.
    pub fn is_connected(&self) -> bool {
        self.config.announce && self.link.is_available()
    }

    /// Registry of model initializers, e.g. for tracing.
    pub fn model_initializers(&self) -> &CallbackRegistry<ModelPath, Handler<M, ()>> {
        &self.model_init
    }

    /// Registry of parameter callbacks.
    pub fn parameters(&self) -> &CallbackRegistry<String, ParameterSlot<S>> {
        &self.parameters
    }

    /// Registry of GUI listeners.
    pub fn gui_listeners(&self) -> &CallbackRegistry<S, GuiHandler<S>> {
        &self.gui
    }

    fn announce(&self, mut registration: Registration, declaration: Declaration) -> Registration {
        if self.config.announce {
            registration.announced = self.link.announce(&declaration);
        }
        registration
    }

    // ---------------------------------------------------------------------------------------------
    // Model initialization
    // ---------------------------------------------------------------------------------------------

    /// Register an initializer run when a model at `path` is constructed.
    ///
    /// # Errors
    ///
    /// - `CallbackError::InvalidPath` if `path` is not a valid [`ModelPath`]
    /// - `CallbackError::KeyConflict` under `ConflictPolicy::Reject`
    pub fn on_model_init<F>(&self, path: &str, handler: F) -> Result<Registration, CallbackError>
    where
        F: Fn(&M) + Send + Sync + 'static,
    {
        self.try_on_model_init(path, move |model| {
            handler(model);
            Ok(())
        })
    }

    /// Register an initializer that can fail.
    ///
    /// # Errors
    ///
    /// - `CallbackError::InvalidPath` if `path` is not a valid [`ModelPath`]
    /// - `CallbackError::KeyConflict` under `ConflictPolicy::Reject`
    ///
    /// A refused announcement is not an error; see `Registration::announced`.
    pub fn try_on_model_init<F>(&self, path: &str, handler: F) -> Result<Registration, CallbackError>
    where
        F: Fn(&M) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let path = ModelPath::parse(path)?;
        let declaration = Declaration::ModelInitializer {
            path: path.to_string(),
        };
        let registration = self.model_init.try_register(path, handler)?;
        Ok(self.announce(registration, declaration))
    }

    /// Run the initializer registered for exactly `path`, if any.
    pub fn trigger_model_init(&self, path: &str, model: &M) -> Result<(), CallbackError> {
        self.model_init.trigger(path, model)
    }

    /// Run every initializer registered along a type chain.
    ///
    /// `chain` lists the model's type paths, most derived first. Returns how many
    /// initializers ran. Stops at the first failing initializer.
    pub fn trigger_model_init_chain<I, P>(&self, chain: I, model: &M) -> Result<usize, CallbackError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut invoked = 0;
        for path in chain {
            let found = self
                .model_init
                .dispatch(path.as_ref(), |handler| handler(model).map(|()| true))?;
            if found {
                invoked += 1;
            }
        }
        debug!(invoked, "model init chain dispatched");
        Ok(invoked)
    }

    // ---------------------------------------------------------------------------------------------
    // Simulation parameters
    // ---------------------------------------------------------------------------------------------

    /// Register a callback for parameter `name` carrying values of `kind`.
    ///
    /// # Errors
    ///
    /// `CallbackError::KeyConflict` under `ConflictPolicy::Reject`.
    pub fn register_parameter<F>(
        &self,
        name: impl Into<String>,
        kind: ParameterKind,
        handler: F,
    ) -> Result<Registration, CallbackError>
    where
        F: Fn(&S, &ParameterValue) + Send + Sync + 'static,
    {
        self.try_register_parameter(name, kind, move |session, value| {
            handler(session, value);
            Ok(())
        })
    }

    /// Register a parameter callback that can fail.
    ///
    /// # Errors
    ///
    /// `CallbackError::KeyConflict` under `ConflictPolicy::Reject`. A refused
    /// announcement is reported through `Registration::announced` instead.
    pub fn try_register_parameter<F>(
        &self,
        name: impl Into<String>,
        kind: ParameterKind,
        handler: F,
    ) -> Result<Registration, CallbackError>
    where
        F: Fn(&S, &ParameterValue) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name = name.into();
        let declaration = Declaration::SimulationParameter {
            name: name.clone(),
            kind,
        };
        let slot = ParameterSlot {
            kind,
            handler: Box::new(handler),
        };
        let registration = self.parameters.register_arc(name, slot.into())?;
        Ok(self.announce(registration, declaration))
    }

    /// Kind declared for `name`, if a callback is registered.
    pub fn parameter_kind(&self, name: &str) -> Option<ParameterKind> {
        self.parameters.handler(name).map(|slot| slot.kind())
    }

    /// Deliver a parameter change from `session`.
    ///
    /// # Errors
    ///
    /// `CallbackError::ParameterKindMismatch` if `value` is not of the declared kind;
    /// the handler is not invoked in that case.
    pub fn trigger_parameter(
        &self,
        session: &S,
        name: &str,
        value: &ParameterValue,
    ) -> Result<(), CallbackError> {
        let mismatch = self.parameters.dispatch(name, |slot| {
            if slot.kind != value.kind() {
                return Ok(Some(slot.kind));
            }
            (slot.handler)(session, value).map(|()| None)
        })?;

        match mismatch {
            Some(expected) => Err(CallbackError::ParameterKindMismatch {
                name: name.to_string(),
                expected,
                actual: value.kind(),
            }),
            None => Ok(()),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // GUI events
    // ---------------------------------------------------------------------------------------------

    /// Register the GUI listener for `session`.
    ///
    /// # Errors
    ///
    /// `CallbackError::KeyConflict` under `ConflictPolicy::Reject`.
    pub fn register_gui_listener<F>(&self, session: S, handler: F) -> Result<Registration, CallbackError>
    where
        F: Fn(&S, &GuiEvent) -> bool + Send + Sync + 'static,
    {
        self.try_register_gui_listener(session, move |session, event| Ok(handler(session, event)))
    }

    /// Register a GUI listener that can fail.
    ///
    /// # Errors
    ///
    /// `CallbackError::KeyConflict` under `ConflictPolicy::Reject`. A refused
    /// announcement is reported through `Registration::announced` instead.
    pub fn try_register_gui_listener<F>(
        &self,
        session: S,
        handler: F,
    ) -> Result<Registration, CallbackError>
    where
        F: Fn(&S, &GuiEvent) -> Result<bool, HandlerError> + Send + Sync + 'static,
    {
        let declaration = Declaration::GuiListener {
            session: format!("{session:?}"),
        };
        let handler: Arc<GuiHandler<S>> = Arc::new(handler);
        let registration = self.gui.register_arc(session, handler)?;
        Ok(self.announce(registration, declaration))
    }

    /// Deliver a GUI event for `session`. Returns whether the listener consumed it;
    /// `false` when the session has no listener.
    pub fn trigger_gui_event(&self, session: &S, event: &GuiEvent) -> Result<bool, CallbackError> {
        self.gui
            .dispatch(session, |handler| handler(session, event))
    }
}
