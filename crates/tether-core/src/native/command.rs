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

use super::{NativeHandle, NativeObject, NativeValue};
use crate::error::NativeError;
use std::any::Any;

/// A host-native command instance ready to be submitted to the router.
///
/// It is itself a [`NativeObject`] so the host side reads it through the same
/// reflection surface as any other object: every argument is a field, and the
/// faction is exposed as `Faction`.
#[derive(Debug, Clone)]
pub struct NativeCommand {
    native_type: String,
    faction: Option<NativeHandle>,
    arguments: Vec<(String, NativeValue)>,
}

impl NativeCommand {
    /// Creates a command of the given host type with no arguments.
    pub fn new(native_type: impl Into<String>) -> Self {
        Self {
            native_type: native_type.into(),
            faction: None,
            arguments: Vec::new(),
        }
    }

    /// Sets the faction the command acts on behalf of.
    pub fn with_faction(mut self, faction: Option<NativeHandle>) -> Self {
        self.faction = faction;
        self
    }

    /// Appends a named argument, replacing any previous one with the same name.
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<NativeValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.arguments.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.arguments.push((name, value)),
        }
        self
    }

    /// Returns the host-side type name of the command.
    pub fn native_type(&self) -> &str {
        &self.native_type
    }

    /// Returns the faction, if any.
    pub fn faction(&self) -> Option<&NativeHandle> {
        self.faction.as_ref()
    }

    /// Returns a named argument.
    pub fn argument(&self, name: &str) -> Option<&NativeValue> {
        self.arguments
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Returns all arguments in insertion order.
    pub fn arguments(&self) -> &[(String, NativeValue)] {
        &self.arguments
    }
}

impl NativeObject for NativeCommand {
    fn type_name(&self) -> &str {
        &self.native_type
    }

    fn field(&self, name: &str) -> Option<NativeValue> {
        if name == "Faction" {
            return self.faction.clone().map(NativeValue::Object);
        }
        self.argument(name).cloned()
    }

    fn invoke(&self, member: &str, _args: &[NativeValue]) -> Result<NativeValue, NativeError> {
        Err(NativeError::MissingMember {
            type_name: self.native_type.clone(),
            member: member.to_string(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
