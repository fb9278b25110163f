//! Basic usage of callback-bridge.
//!
//! Wires a `Bridge` to a mock host, registers one handler per event family, then plays
//! the host's part by triggering model init, a parameter change and keyboard input.
//!
//! Run with `cargo run --example basic_usage`.

use callback_bridge::{
    Bridge, BridgeConfig, Collaborator, CollaboratorError, CollaboratorLink, Declaration,
    GuiEvent, ParameterKind, ParameterValue,
};
use std::sync::{Arc, Mutex};

/// Stand-in for the simulation framework; prints what it is told.
struct MockHost;

impl Collaborator for MockHost {
    fn announce(&self, declaration: &Declaration) -> Result<(), CollaboratorError> {
        println!("[host] will call back for {declaration}");
        Ok(())
    }
}

/// Session handle the host passes with every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Session(u32);

/// Model built by the host's loader.
#[derive(Debug, Default)]
struct Model {
    name: String,
    angles: Mutex<[f64; 3]>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Callback Bridge Basic Usage ===\n");

    let link = CollaboratorLink::probe(|| Ok(Arc::new(MockHost) as Arc<dyn Collaborator>));
    let bridge: Bridge<Session, Model> = Bridge::new(BridgeConfig::default(), link);
    println!("connected: {}\n", bridge.is_connected());

    // 1. Model initialization, keyed by path
    bridge.on_model_init("Examples.Forwarder.PositionedForwarder", |model| {
        println!("init positioned forwarder: {}", model.name);
        if let Ok(mut angles) = model.angles.lock() {
            *angles = [20.0, 30.0, 45.0];
        }
    })?;
    bridge.on_model_init("Examples.Forwarder.Forwarder", |model| {
        println!("init base forwarder: {}", model.name);
    })?;

    // 2. Simulation parameters, keyed by name
    let angle1 = Arc::new(Mutex::new(0.0));
    let angle1_clone = angle1.clone();
    bridge.register_parameter("angle1", ParameterKind::Scalar, move |session, value| {
        if let (Some(v), Ok(mut slot)) = (value.as_scalar(), angle1_clone.lock()) {
            println!("{session:?} set angle1 = {v}");
            *slot = v;
        }
    })?;

    // 3. GUI events, keyed by session
    let session = Session(1);
    bridge.register_gui_listener(session, |session, event| {
        if event.key_down {
            return true;
        }
        if event.is_key('q') {
            println!("{session:?} reinitialize requested");
            return true;
        }
        false
    })?;

    println!("\n--- host triggers ---");

    let model = Model {
        name: "forwarder-1".into(),
        ..Model::default()
    };
    let ran = bridge.trigger_model_init_chain(
        [
            "Examples.Forwarder.PositionedForwarder",
            "Examples.Forwarder.Forwarder",
            "Physics.Mechanics.System",
        ],
        &model,
    )?;
    println!("initializers run: {ran}");

    bridge.trigger_parameter(&session, "angle1", &ParameterValue::Scalar(45.0))?;
    bridge.trigger_parameter(&session, "angle9", &ParameterValue::Scalar(1.0))?;
    if let Err(err) = bridge.trigger_parameter(&session, "angle1", &ParameterValue::from("oops")) {
        println!("rejected: {err}");
    }

    let consumed = bridge.trigger_gui_event(&session, &GuiEvent::key_up('q'))?;
    let ignored = bridge.trigger_gui_event(&session, &GuiEvent::key_up('x'))?;
    let other = bridge.trigger_gui_event(&Session(2), &GuiEvent::key_up('q'))?;
    println!("q consumed: {consumed}, x consumed: {ignored}, other session: {other}");

    println!("\nangle1 = {:?}", angle1.lock().map(|v| *v).unwrap_or_default());
    println!("\n=== Done ===");
    Ok(())
}
