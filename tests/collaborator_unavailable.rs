//! Integration tests for a bridge whose host framework is missing or misbehaving.

use callback_bridge::{
    Bridge, BridgeConfig, Collaborator, CollaboratorError, CollaboratorLink, Declaration,
    GuiEvent, ParameterKind, ParameterValue,
};
use std::sync::{Arc, Mutex};

fn missing_host() -> Result<Arc<dyn Collaborator>, CollaboratorError> {
    Err(CollaboratorError::Unavailable(
        "Brick.AgxBrick could not be loaded".into(),
    ))
}

#[test]
fn test_registration_succeeds_without_host() {
    let bridge: Bridge<u32, Mutex<f64>> =
        Bridge::new(BridgeConfig::default(), CollaboratorLink::probe(missing_host));
    assert!(!bridge.is_connected());

    let init = bridge
        .on_model_init("Examples.FrictionExperiment.PendulumInWorld", |model| {
            *model.lock().unwrap() = 1.0;
        })
        .unwrap();
    let param = bridge
        .register_parameter("angle1", ParameterKind::Scalar, |_, _| ())
        .unwrap();
    let gui = bridge.register_gui_listener(1, |_, _| true).unwrap();

    assert!(!init.announced);
    assert!(!param.announced);
    assert!(!gui.announced);
}

#[test]
fn test_local_dispatch_still_works_without_host() {
    let bridge: Bridge<u32, Mutex<f64>> =
        Bridge::new(BridgeConfig::default(), CollaboratorLink::probe(missing_host));

    bridge
        .on_model_init("Examples.Pendulum", |model| *model.lock().unwrap() = 2.0)
        .unwrap();
    let model = Mutex::new(0.0);
    bridge.trigger_model_init("Examples.Pendulum", &model).unwrap();
    assert_eq!(*model.lock().unwrap(), 2.0);

    let angle = Arc::new(Mutex::new(0.0));
    let angle_clone = angle.clone();
    bridge
        .register_parameter("angle1", ParameterKind::Scalar, move |_, value| {
            *angle_clone.lock().unwrap() = value.as_scalar().unwrap_or_default();
        })
        .unwrap();
    bridge
        .trigger_parameter(&1, "angle1", &ParameterValue::Scalar(45.0))
        .unwrap();
    assert_eq!(*angle.lock().unwrap(), 45.0);

    bridge
        .register_gui_listener(1, |_, event| event.is_key('q'))
        .unwrap();
    assert!(bridge.trigger_gui_event(&1, &GuiEvent::key_up('q')).unwrap());

    assert_eq!(bridge.model_initializers().len(), 1);
    assert_eq!(bridge.parameters().len(), 1);
    assert_eq!(bridge.gui_listeners().len(), 1);
}

/// Accepts model initializers but refuses everything else.
struct PartialHost {
    accepted: Mutex<Vec<Declaration>>,
}

impl Collaborator for PartialHost {
    fn announce(&self, declaration: &Declaration) -> Result<(), CollaboratorError> {
        match declaration {
            Declaration::ModelInitializer { .. } => {
                self.accepted.lock().unwrap().push(declaration.clone());
                Ok(())
            }
            other => Err(CollaboratorError::Rejected(other.to_string())),
        }
    }
}

#[test]
fn test_announcement_failure_keeps_handler() {
    let host = Arc::new(PartialHost {
        accepted: Mutex::new(Vec::new()),
    });
    let shared: Arc<dyn Collaborator> = host.clone();
    let bridge: Bridge<u32, ()> =
        Bridge::new(BridgeConfig::default(), CollaboratorLink::probe(move || Ok(shared)));
    assert!(bridge.is_connected());

    let init = bridge.on_model_init("Examples.Pendulum", |_| ()).unwrap();
    assert!(init.announced);

    let param = bridge
        .register_parameter("angle2", ParameterKind::Scalar, |_, _| ())
        .unwrap();
    assert!(!param.announced);
    assert_eq!(bridge.parameter_kind("angle2"), Some(ParameterKind::Scalar));

    assert_eq!(host.accepted.lock().unwrap().len(), 1);
}
