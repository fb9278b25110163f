/// Events emitted by a callback registry during operations.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// Keys are rendered with their `Debug` representation.
///
/// # Examples
///
/// ```rust
/// use callback_bridge::CallbackEvent;
///
/// let event = CallbackEvent::Trigger {
///     registry: "parameters",
///     key: "\"angle1\"".to_string(),
///     found: true,
/// };
/// assert_eq!(event.to_string(), "trigger { registry: parameters, key: \"angle1\", found: true }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    /// A handler was stored.
    Register {
        registry: &'static str,
        key: String,
        /// Whether an earlier handler for the same key was overwritten.
        replaced: bool,
    },

    /// A registration was refused under `ConflictPolicy::Reject`.
    Rejected { registry: &'static str, key: String },

    /// A key was dispatched.
    Trigger {
        registry: &'static str,
        key: String,
        /// Whether a handler was registered for the key.
        found: bool,
    },

    /// The registry was cleared.
    Clear { registry: &'static str },
}

impl std::fmt::Display for CallbackEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackEvent::Register {
                registry,
                key,
                replaced,
            } => write!(
                f,
                "register {{ registry: {registry}, key: {key}, replaced: {replaced} }}"
            ),
            CallbackEvent::Rejected { registry, key } => {
                write!(f, "rejected {{ registry: {registry}, key: {key} }}")
            }
            CallbackEvent::Trigger {
                registry,
                key,
                found,
            } => write!(
                f,
                "trigger {{ registry: {registry}, key: {key}, found: {found} }}"
            ),
            CallbackEvent::Clear { registry } => write!(f, "Clearing {registry}"),
        }
    }
}
