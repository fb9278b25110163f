//! Integration tests for trace callbacks and `tracing` log output.

use callback_bridge::{
    Bridge, BridgeConfig, CallbackEvent, CallbackRegistry, CollaboratorError, CollaboratorLink,
    ConflictPolicy, GuiEvent, Handler,
};
use std::io;
use std::sync::{Arc, Mutex};

#[test]
fn test_trace_register_and_trigger() {
    let table: CallbackRegistry<String, Handler<f64, ()>> = CallbackRegistry::new("parameters");

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    table.set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.clone());
    });

    table.register("angle1".to_string(), |_| ()).unwrap();
    table.trigger("angle1", &45.0).unwrap();
    table.trigger("angle2", &45.0).unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        vec![
            CallbackEvent::Register {
                registry: "parameters",
                key: "\"angle1\"".into(),
                replaced: false,
            },
            CallbackEvent::Trigger {
                registry: "parameters",
                key: "\"angle1\"".into(),
                found: true,
            },
            CallbackEvent::Trigger {
                registry: "parameters",
                key: "\"angle2\"".into(),
                found: false,
            },
        ]
    );
}

#[test]
fn test_trace_per_family() {
    let bridge: Bridge<u32, ()> = Bridge::detached(BridgeConfig::default());

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    bridge.gui_listeners().set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    bridge.on_model_init("Examples.Pendulum", |_| ()).unwrap();
    bridge.register_gui_listener(4, |_, _| false).unwrap();
    bridge.trigger_gui_event(&4, &GuiEvent::key_up('q')).unwrap();

    let captured = events.lock().unwrap();
    assert_eq!(
        *captured,
        vec![
            "register { registry: gui, key: 4, replaced: false }",
            "trigger { registry: gui, key: 4, found: true }",
        ]
    );
}

#[test]
fn test_trace_rejected_registration() {
    let table: CallbackRegistry<String, Handler<(), ()>> =
        CallbackRegistry::with_policy("strict", ConflictPolicy::Reject);

    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    table.set_trace_callback(move |event| {
        events_clone.lock().unwrap().push(event.to_string());
    });

    table.register("k".to_string(), |_| ()).unwrap();
    let _ = table.register("k".to_string(), |_| ());

    let captured = events.lock().unwrap();
    assert_eq!(captured.len(), 2);
    assert_eq!(captured[1], "rejected { registry: strict, key: \"k\" }");
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn test_log_records() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("callback_bridge=debug"))
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let link = CollaboratorLink::probe(|| {
            Err(CollaboratorError::Unavailable("no host".into()))
        });
        let config = BridgeConfig {
            conflict_policy: ConflictPolicy::Reject,
            ..BridgeConfig::default()
        };
        let bridge: Bridge<u32, ()> = Bridge::new(config, link);

        bridge.register_gui_listener(1, |_, _| true).unwrap();
        let _ = bridge.register_gui_listener(1, |_, _| true);
        bridge.trigger_gui_event(&1, &GuiEvent::key_up('q')).unwrap();
    });

    let logs = capture.contents();
    assert!(logs.contains("callback collaborator unavailable"), "{logs}");
    assert!(logs.contains("registered callback"), "{logs}");
    assert!(logs.contains("duplicate callback registration rejected"), "{logs}");
    assert!(logs.contains("triggering callback"), "{logs}");
}
