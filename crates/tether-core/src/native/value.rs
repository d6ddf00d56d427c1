// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::{get_member, NativeHandle};
use serde_json::Value;
use std::sync::Arc;

/// A loosely-typed value read from, or passed to, the host.
#[derive(Debug, Clone, Default)]
pub enum NativeValue {
    /// The absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Text(String),
    /// A two-component vector, typically a map position.
    Vector2 {
        /// Horizontal component.
        x: f32,
        /// Vertical component.
        y: f32,
    },
    /// A reference to another host object.
    Object(NativeHandle),
    /// An ordered list of values.
    List(Vec<NativeValue>),
}

impl NativeValue {
    /// Returns `true` for [`NativeValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    /// Returns the value as a `bool` if it is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NativeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Coerces the value into an `i64`.
    ///
    /// Integral floats and numeric strings are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NativeValue::Int(v) => Some(*v),
            NativeValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            NativeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Coerces the value into an `f64`. Numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NativeValue::Int(v) => Some(*v as f64),
            NativeValue::Float(v) => Some(*v),
            NativeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the referenced host object if the value is an `Object`.
    pub fn as_object(&self) -> Option<&NativeHandle> {
        match self {
            NativeValue::Object(handle) => Some(handle),
            _ => None,
        }
    }

    /// Interprets the value as a 2D vector.
    ///
    /// Accepts a `Vector2`, a two-element numeric `List`, or an object
    /// exposing `X` and `Y` members.
    pub fn as_vector2(&self) -> Option<(f32, f32)> {
        match self {
            NativeValue::Vector2 { x, y } => Some((*x, *y)),
            NativeValue::List(items) if items.len() == 2 => {
                Some((items[0].as_f64()? as f32, items[1].as_f64()? as f32))
            }
            NativeValue::Object(handle) => {
                let x = get_member(handle, "X")?.as_f64()?;
                let y = get_member(handle, "Y")?.as_f64()?;
                Some((x as f32, y as f32))
            }
            _ => None,
        }
    }

    /// Renders the value as display text, used for identifiers.
    pub fn to_text(&self) -> Option<String> {
        match self {
            NativeValue::Text(s) => Some(s.clone()),
            NativeValue::Int(v) => Some(v.to_string()),
            NativeValue::Float(v) => Some(v.to_string()),
            NativeValue::Bool(v) => Some(v.to_string()),
            _ => None,
        }
    }

    /// Converts a JSON parameter value into a native value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => NativeValue::Null,
            Value::Bool(b) => NativeValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => NativeValue::Int(i),
                None => NativeValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => NativeValue::Text(s.clone()),
            Value::Array(items) => NativeValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(_) => NativeValue::Text(value.to_string()),
        }
    }
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeValue::Null, NativeValue::Null) => true,
            (NativeValue::Bool(a), NativeValue::Bool(b)) => a == b,
            (NativeValue::Int(a), NativeValue::Int(b)) => a == b,
            (NativeValue::Float(a), NativeValue::Float(b)) => a == b,
            (NativeValue::Text(a), NativeValue::Text(b)) => a == b,
            (NativeValue::Vector2 { x: ax, y: ay }, NativeValue::Vector2 { x: bx, y: by }) => {
                ax == bx && ay == by
            }
            (NativeValue::Object(a), NativeValue::Object(b)) => Arc::ptr_eq(a, b),
            (NativeValue::List(a), NativeValue::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        NativeValue::Bool(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        NativeValue::Int(value)
    }
}

impl From<u32> for NativeValue {
    fn from(value: u32) -> Self {
        NativeValue::Int(i64::from(value))
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        NativeValue::Float(value)
    }
}

impl From<f32> for NativeValue {
    fn from(value: f32) -> Self {
        NativeValue::Float(f64::from(value))
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        NativeValue::Text(value.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        NativeValue::Text(value)
    }
}

impl From<NativeHandle> for NativeValue {
    fn from(value: NativeHandle) -> Self {
        NativeValue::Object(value)
    }
}
