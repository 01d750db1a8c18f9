// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.
//!
//! A socket's attached value is a closed sum type. The socket's type tag is
//! fixed when the socket is built and every later assignment is checked
//! against it, so a `Float` socket can never end up holding anything but a
//! [`FloatValue`].

use crate::curve::CurveValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Socket direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketDirection {
    /// Input socket
    Input,
    /// Output socket
    Output,
}

/// Data type that can flow through sockets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketType {
    /// Scalar float
    Float,
    /// Integer
    Int,
    /// Boolean toggle
    Boolean,
    /// 3D vector
    Vector,
    /// RGB color
    Color,
    /// Choice from a fixed list of strings
    StringEnum,
    /// User-authored curve
    Curve,
    /// Shader closure (BSDF, emission, volume)
    Closure,
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Boolean => "Boolean",
            Self::Vector => "Vector",
            Self::Color => "Color",
            Self::StringEnum => "StringEnum",
            Self::Curve => "Curve",
            Self::Closure => "Closure",
        };
        f.write_str(name)
    }
}

/// Float value with an inclusive clamp range.
///
/// The stored value is always a number inside `[min, max]`; NaN is never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFloatValue")]
pub struct FloatValue {
    value: f32,
    /// Minimum allowed value
    pub min: f32,
    /// Maximum allowed value
    pub max: f32,
}

#[derive(Deserialize)]
struct RawFloatValue {
    value: f32,
    min: f32,
    max: f32,
}

impl From<RawFloatValue> for FloatValue {
    fn from(raw: RawFloatValue) -> Self {
        Self::new(raw.value, raw.min, raw.max)
    }
}

impl FloatValue {
    /// Create a new value, clamped into `[min, max]`.
    ///
    /// Swapped bounds are reordered and a NaN bound is treated as open.
    /// A NaN value starts at the in-range value closest to zero.
    pub fn new(value: f32, min: f32, max: f32) -> Self {
        let min = if min.is_nan() { f32::MIN } else { min };
        let max = if max.is_nan() { f32::MAX } else { max };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let mut float = Self { value: 0.0_f32.clamp(min, max), min, max };
        float.set(value);
        float
    }

    /// Create an effectively unbounded value
    pub fn unbounded(value: f32) -> Self {
        Self::new(value, f32::MIN, f32::MAX)
    }

    /// Current value
    pub fn get(&self) -> f32 {
        self.value
    }

    /// Set the value, clamping into range. NaN leaves the value unchanged.
    pub fn set(&mut self, value: f32) {
        if !value.is_nan() {
            self.value = value.clamp(self.min, self.max);
        }
    }
}

/// Integer value with an inclusive clamp range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawIntValue")]
pub struct IntValue {
    value: i32,
    /// Minimum allowed value
    pub min: i32,
    /// Maximum allowed value
    pub max: i32,
}

#[derive(Deserialize)]
struct RawIntValue {
    value: i32,
    min: i32,
    max: i32,
}

impl From<RawIntValue> for IntValue {
    fn from(raw: RawIntValue) -> Self {
        Self::new(raw.value, raw.min, raw.max)
    }
}

impl IntValue {
    /// Create a new value, clamped into `[min, max]`. Swapped bounds are reordered.
    pub fn new(value: i32, min: i32, max: i32) -> Self {
        let (min, max) = (min.min(max), min.max(max));
        Self { value: value.clamp(min, max), min, max }
    }

    /// Current value
    pub fn get(&self) -> i32 {
        self.value
    }

    /// Set the value, clamping into range
    pub fn set(&mut self, value: i32) {
        self.value = value.clamp(self.min, self.max);
    }
}

/// One choice of a string enum socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    /// Name shown in the editor
    pub display_name: String,
    /// Name handed to the renderer
    pub internal_value: String,
}

impl EnumOption {
    /// Create a new option
    pub fn new(display_name: impl Into<String>, internal_value: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            internal_value: internal_value.into(),
        }
    }
}

/// A selection from a fixed list of options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringEnumValue {
    options: Vec<EnumOption>,
    selected: String,
}

impl StringEnumValue {
    /// Create a new enum value.
    ///
    /// Falls back to the first option when `selected` is not one of the
    /// options' internal values.
    pub fn new(options: Vec<EnumOption>, selected: &str) -> Self {
        let selected = options
            .iter()
            .find(|o| o.internal_value == selected)
            .or_else(|| options.first())
            .map(|o| o.internal_value.clone())
            .unwrap_or_default();
        Self { options, selected }
    }

    /// Available options
    pub fn options(&self) -> &[EnumOption] {
        &self.options
    }

    /// Internal value of the current selection
    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Select an option by internal value. Returns false if no option matches.
    pub fn select(&mut self, internal_value: &str) -> bool {
        if self.options.iter().any(|o| o.internal_value == internal_value) {
            self.selected = internal_value.to_string();
            true
        } else {
            false
        }
    }
}

/// Value that can be attached to a socket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SocketValue {
    /// Float
    Float(FloatValue),
    /// Integer
    Int(IntValue),
    /// Boolean
    Boolean(bool),
    /// 3D vector
    Vector([f32; 3]),
    /// RGB color
    Color([f32; 3]),
    /// String enum
    StringEnum(StringEnumValue),
    /// Curve
    Curve(CurveValue),
    /// Closures carry no direct value
    Closure,
}

impl SocketValue {
    /// Get the socket type for this value
    pub fn socket_type(&self) -> SocketType {
        match self {
            Self::Float(_) => SocketType::Float,
            Self::Int(_) => SocketType::Int,
            Self::Boolean(_) => SocketType::Boolean,
            Self::Vector(_) => SocketType::Vector,
            Self::Color(_) => SocketType::Color,
            Self::StringEnum(_) => SocketType::StringEnum,
            Self::Curve(_) => SocketType::Curve,
            Self::Closure => SocketType::Closure,
        }
    }
}

/// Error when assigning a value to a socket
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocketError {
    /// Value variant does not match the socket's type tag
    #[error("Socket type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type tag of the socket
        expected: SocketType,
        /// Type of the rejected value
        found: SocketType,
    },

    /// Vector or color component is NaN or infinite
    #[error("Non-finite component in {0} value")]
    NonFinite(SocketType),
}

/// A socket on a node
#[derive(Debug, Clone, PartialEq)]
pub struct Socket {
    /// Name shown in the editor
    pub display_name: String,
    /// Stable machine-readable name
    pub internal_name: String,
    /// Socket direction
    pub direction: SocketDirection,
    socket_type: SocketType,
    value: Option<SocketValue>,
}

impl Socket {
    /// Create a socket, checking that `value` matches `socket_type`
    pub fn new(
        display_name: impl Into<String>,
        internal_name: impl Into<String>,
        direction: SocketDirection,
        socket_type: SocketType,
        value: Option<SocketValue>,
    ) -> Result<Self, SocketError> {
        if let Some(value) = &value {
            check_type(socket_type, value)?;
        }
        Ok(Self {
            display_name: display_name.into(),
            internal_name: internal_name.into(),
            direction,
            socket_type,
            value,
        })
    }

    /// Create an input socket whose type is taken from its default value
    pub fn input(
        display_name: impl Into<String>,
        internal_name: impl Into<String>,
        value: SocketValue,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            internal_name: internal_name.into(),
            direction: SocketDirection::Input,
            socket_type: value.socket_type(),
            value: Some(value),
        }
    }

    /// Create an input socket that only receives values through connections
    pub fn linked_input(
        display_name: impl Into<String>,
        internal_name: impl Into<String>,
        socket_type: SocketType,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            internal_name: internal_name.into(),
            direction: SocketDirection::Input,
            socket_type,
            value: None,
        }
    }

    /// Create an output socket
    pub fn output(
        display_name: impl Into<String>,
        internal_name: impl Into<String>,
        socket_type: SocketType,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            internal_name: internal_name.into(),
            direction: SocketDirection::Output,
            socket_type,
            value: None,
        }
    }

    /// Create an output socket carrying an editable value
    pub fn output_with_value(
        display_name: impl Into<String>,
        internal_name: impl Into<String>,
        value: SocketValue,
    ) -> Self {
        Self {
            socket_type: value.socket_type(),
            value: Some(value),
            ..Self::output(display_name, internal_name, SocketType::Closure)
        }
    }

    /// Type tag
    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    /// Attached value, if any
    pub fn value(&self) -> Option<&SocketValue> {
        self.value.as_ref()
    }

    /// Replace the attached value.
    ///
    /// The socket is left unchanged if the value's variant does not match
    /// the socket type.
    pub fn set_value(&mut self, value: SocketValue) -> Result<(), SocketError> {
        check_type(self.socket_type, &value)?;
        self.value = Some(value);
        Ok(())
    }

    /// Whether this is an input socket
    pub fn is_input(&self) -> bool {
        self.direction == SocketDirection::Input
    }
}

fn check_type(expected: SocketType, value: &SocketValue) -> Result<(), SocketError> {
    let found = value.socket_type();
    if found != expected {
        return Err(SocketError::TypeMismatch { expected, found });
    }
    match value {
        SocketValue::Vector(v) | SocketValue::Color(v) if !v.iter().all(|c| c.is_finite()) => {
            Err(SocketError::NonFinite(found))
        }
        _ => Ok(()),
    }
}
