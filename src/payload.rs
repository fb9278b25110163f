//! Payload types carried by the three event families.

use std::borrow::Borrow;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::CallbackError;

// -------------------------------------------------------------------------------------------------
// Model paths
// -------------------------------------------------------------------------------------------------

/// Dotted model path such as `Examples.Forwarder.PositionedForwarder`.
///
/// Every segment is non-empty and made of ASCII alphanumerics or `_`, the identifier
/// alphabet of model type names. Hyphens, whitespace and non-ASCII letters are
/// rejected so a path always names a model type rather than a display label.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelPath(String);

impl ModelPath {
    /// Validate and wrap a dotted path.
    ///
    /// # Errors
    ///
    /// `CallbackError::InvalidPath` if the path is empty, has an empty segment, or a
    /// segment contains anything outside `[A-Za-z0-9_]`.
    pub fn parse(path: impl Into<String>) -> Result<Self, CallbackError> {
        let path = path.into();
        if path.is_empty() {
            return Err(CallbackError::InvalidPath {
                path,
                reason: "path is empty",
            });
        }
        for segment in path.split('.') {
            if segment.is_empty() {
                return Err(CallbackError::InvalidPath {
                    path,
                    reason: "empty segment",
                });
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(CallbackError::InvalidPath {
                    path,
                    reason: "segment contains characters other than [A-Za-z0-9_]",
                });
            }
        }
        Ok(Self(path))
    }

    /// The full dotted path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterator over the dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Last segment, i.e. the model's own name.
    pub fn name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl Borrow<str> for ModelPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Formats like the bare string so `&str` lookups trace the same key text.
impl fmt::Debug for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for ModelPath {
    type Error = CallbackError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

// -------------------------------------------------------------------------------------------------
// Simulation parameters
// -------------------------------------------------------------------------------------------------

/// Declared type of a simulation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Scalar,
    Integer,
    Bool,
    Text,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterKind::Scalar => "scalar",
            ParameterKind::Integer => "integer",
            ParameterKind::Bool => "bool",
            ParameterKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// Value delivered when the host changes a simulation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    Scalar(f64),
    Integer(i64),
    Bool(bool),
    Text(String),
}

impl ParameterValue {
    /// Kind of this value, compared against the registered kind on trigger.
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::Scalar(_) => ParameterKind::Scalar,
            ParameterValue::Integer(_) => ParameterKind::Integer,
            ParameterValue::Bool(_) => ParameterKind::Bool,
            ParameterValue::Text(_) => ParameterKind::Text,
        }
    }

    /// The scalar payload, if this is a `Scalar`.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParameterValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

// -------------------------------------------------------------------------------------------------
// GUI input
// -------------------------------------------------------------------------------------------------

bitflags! {
    /// Modifier keys held while a GUI event fired.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 0b0001;
        const CTRL = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

/// Raw keyboard event forwarded by the host's GUI dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuiEvent {
    /// Key code; printable keys use their Unicode scalar value.
    pub key: u32,
    pub modifiers: Modifiers,
    pub x: f32,
    pub y: f32,
    pub key_down: bool,
}

impl GuiEvent {
    /// Event with every field given explicitly.
    pub fn new(key: u32, modifiers: Modifiers, x: f32, y: f32, key_down: bool) -> Self {
        Self {
            key,
            modifiers,
            x,
            y,
            key_down,
        }
    }

    /// Release of a printable key at the origin with no modifiers.
    pub fn key_up(key: char) -> Self {
        Self::new(key as u32, Modifiers::empty(), 0.0, 0.0, false)
    }

    /// Press of a printable key at the origin with no modifiers.
    pub fn key_down(key: char) -> Self {
        Self::new(key as u32, Modifiers::empty(), 0.0, 0.0, true)
    }

    /// Replace the modifier mask.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether the event is for the printable key `key`.
    pub fn is_key(&self, key: char) -> bool {
        self.key == key as u32
    }

    /// Key code as a `char`, if it is a valid Unicode scalar value.
    pub fn key_char(&self) -> Option<char> {
        char::from_u32(self.key)
    }
}
