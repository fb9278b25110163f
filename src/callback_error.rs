use thiserror::Error;

use crate::payload::ParameterKind;

/// Failure reported by a user-supplied handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by registration and dispatch.
///
/// A missing handler is never an error: dispatching to an unknown key yields the
/// default result instead.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// Registration refused because the key is taken and the policy is `Reject`.
    #[error("handler already registered for {key} in {registry}")]
    KeyConflict { registry: &'static str, key: String },

    /// The handler returned an error.
    #[error("handler for {key} in {registry} failed: {source}")]
    HandlerFailed {
        registry: &'static str,
        key: String,
        #[source]
        source: HandlerError,
    },

    /// The handler panicked; the panic was contained.
    #[error("handler for {key} in {registry} panicked: {message}")]
    HandlerPanicked {
        registry: &'static str,
        key: String,
        message: String,
    },

    /// A model path failed validation.
    #[error("invalid model path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A parameter value does not match the kind it was registered with.
    #[error("parameter {name} expects {expected} but received {actual}")]
    ParameterKindMismatch {
        name: String,
        expected: ParameterKind,
        actual: ParameterKind,
    },
}

/// Errors raised by the external host the bridge announces handlers to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The host framework is not loaded in this process.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The host rejected a declaration.
    #[error("collaborator rejected declaration: {0}")]
    Rejected(String),
}
