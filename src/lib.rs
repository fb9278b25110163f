//! # Callback Bridge
//!
//! Keyed callback registration and dispatch between an external event source and
//! user handlers.
//!
//! A host (model loader, simulation engine, GUI dispatcher) owns the events; user code
//! owns the reactions. The bridge sits between them: user code registers a handler
//! under a key, the host triggers the key, and the bridge invokes whatever is
//! registered. Triggering a key nobody registered is normal and returns the default.
//!
//! ## Quick Start
//!
//! ```rust
//! use callback_bridge::{CallbackRegistry, Handler};
//! use std::sync::{Arc, Mutex};
//!
//! let parameters: CallbackRegistry<String, Handler<f64, ()>> = CallbackRegistry::new("parameters");
//!
//! let angle = Arc::new(Mutex::new(0.0));
//! let angle_clone = angle.clone();
//! parameters
//!     .register("angle1".to_string(), move |value: &f64| *angle_clone.lock().unwrap() = *value)
//!     .unwrap();
//!
//! parameters.trigger("angle1", &45.0).unwrap();
//! assert_eq!(*angle.lock().unwrap(), 45.0);
//!
//! // Unknown keys are a no-op.
//! parameters.trigger("angle2", &10.0).unwrap();
//! ```
//!
//! ## Features
//!
//! - **Explicit ownership**: registries are values, one per event family or session
//! - **Typed failures**: handler errors and panics come back as [`CallbackError`]
//! - **Capability probe**: [`CollaboratorLink::probe`] decides once whether a host is present
//! - **Tracing support**: per-registry trace callbacks plus `tracing` log records
//!
//! ## Main Types
//!
//! - [`CallbackRegistry`] - keyed handler table with `register` / `trigger`
//! - [`Bridge`] - model init, simulation parameter and GUI event registries for one host
//! - [`CollaboratorLink`] - announces registrations to the host when it is available
//! - [`BridgeConfig`] - conflict policy and announcement switch

mod bridge;
mod callback_error;
mod callback_event;
mod callback_registry;
mod collaborator;
mod config;
mod payload;

pub use bridge::{Bridge, GuiHandler, ParameterHandler, ParameterSlot};
pub use callback_error::{CallbackError, CollaboratorError, HandlerError};
pub use callback_event::CallbackEvent;
pub use callback_registry::{CallbackRegistry, ConflictPolicy, Handler, Registration, TraceCallback};
pub use collaborator::{Collaborator, CollaboratorLink, Declaration};
pub use config::BridgeConfig;
pub use payload::{GuiEvent, ModelPath, Modifiers, ParameterKind, ParameterValue};
