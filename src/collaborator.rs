//! Seam to the external host that owns the event sources.
//!
//! The host (model registry, simulation engine, GUI dispatcher) needs to know which
//! keys have a handler so it calls back at the right lifecycle moment. Whether a host
//! is present is decided once, by [`CollaboratorLink::probe`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::{CollaboratorError, ParameterKind};

/// What the bridge tells the host when a handler is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// An initializer exists for models at this path.
    ModelInitializer { path: String },
    /// A callback exists for this simulation parameter.
    SimulationParameter { name: String, kind: ParameterKind },
    /// A GUI listener exists for this session.
    GuiListener { session: String },
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::ModelInitializer { path } => write!(f, "model initializer {path}"),
            Declaration::SimulationParameter { name, kind } => {
                write!(f, "simulation parameter {name} ({kind})")
            }
            Declaration::GuiListener { session } => write!(f, "gui listener {session}"),
        }
    }
}

/// External framework that triggers the bridge.
pub trait Collaborator: Send + Sync {
    /// Record that a handler exists for the declared key.
    fn announce(&self, declaration: &Declaration) -> Result<(), CollaboratorError>;
}

/// Result of the startup capability probe.
#[derive(Clone)]
pub enum CollaboratorLink {
    Available(Arc<dyn Collaborator>),
    Unavailable { reason: String },
}

impl fmt::Debug for CollaboratorLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollaboratorLink::Available(_) => f.write_str("Available"),
            CollaboratorLink::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

impl CollaboratorLink {
    /// Run the capability probe once and branch on its outcome.
    ///
    /// A failing probe is logged and yields `Unavailable`; it never propagates.
    pub fn probe<F>(probe: F) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn Collaborator>, CollaboratorError>,
    {
        match probe() {
            Ok(collaborator) => {
                debug!("callback collaborator available");
                CollaboratorLink::Available(collaborator)
            }
            Err(err) => {
                warn!(error = %err, "callback collaborator unavailable, announcements disabled");
                CollaboratorLink::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// A link with no host behind it.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CollaboratorLink::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether the probe found a host.
    pub fn is_available(&self) -> bool {
        matches!(self, CollaboratorLink::Available(_))
    }

    /// Announce a declaration, reporting whether the host acknowledged it.
    ///
    /// Host errors are logged, not returned.
    pub fn announce(&self, declaration: &Declaration) -> bool {
        let CollaboratorLink::Available(collaborator) = self else {
            return false;
        };
        match collaborator.announce(declaration) {
            Ok(()) => {
                debug!(%declaration, "announced to collaborator");
                true
            }
            Err(err) => {
                warn!(%declaration, error = %err, "collaborator rejected announcement");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Declaration>>,
    }

    impl Collaborator for Recorder {
        fn announce(&self, declaration: &Declaration) -> Result<(), CollaboratorError> {
            self.seen.lock().unwrap().push(declaration.clone());
            Ok(())
        }
    }

    struct Refuser;

    impl Collaborator for Refuser {
        fn announce(&self, declaration: &Declaration) -> Result<(), CollaboratorError> {
            Err(CollaboratorError::Rejected(declaration.to_string()))
        }
    }

    #[test]
    fn test_probe_success() {
        let recorder = Arc::new(Recorder::default());
        let shared: Arc<dyn Collaborator> = recorder.clone();
        let link = CollaboratorLink::probe(|| Ok(shared));
        assert!(link.is_available());

        let declaration = Declaration::ModelInitializer {
            path: "Examples.Pendulum".into(),
        };
        assert!(link.announce(&declaration));
        assert_eq!(*recorder.seen.lock().unwrap(), vec![declaration]);
    }

    #[test]
    fn test_probe_failure_degrades() {
        let link = CollaboratorLink::probe(|| {
            Err(CollaboratorError::Unavailable("AgxBrick not loaded".into()))
        });
        assert!(!link.is_available());
        assert_eq!(
            format!("{link:?}"),
            "Unavailable { reason: \"collaborator unavailable: AgxBrick not loaded\" }"
        );
        assert!(!link.announce(&Declaration::GuiListener {
            session: "1".into()
        }));
    }

    #[test]
    fn test_rejected_announcement_is_not_fatal() {
        let link = CollaboratorLink::Available(Arc::new(Refuser));
        assert!(!link.announce(&Declaration::SimulationParameter {
            name: "angle1".into(),
            kind: ParameterKind::Scalar,
        }));
    }

    #[test]
    fn test_declaration_display() {
        let declaration = Declaration::SimulationParameter {
            name: "angle1".into(),
            kind: ParameterKind::Scalar,
        };
        assert_eq!(declaration.to_string(), "simulation parameter angle1 (scalar)");
    }
}
