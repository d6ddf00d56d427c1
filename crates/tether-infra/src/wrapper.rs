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

//! The default wrapper service used by event auto-conversion.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;
use tether_core::native::{get_member, invoke, EntityWrapper, NativeValue, WrapperConverter};
use tether_core::NativeHandle;

/// Host types wrapped by [`HandleWrapperConverter::new`].
pub const DEFAULT_WRAPPED_TYPES: [&str; 3] = ["Building", "Drone", "Faction"];

/// A generic wrapper exposing read and call access to one host entity.
#[derive(Debug, Clone)]
pub struct EntityHandle {
    kind: String,
    handle: NativeHandle,
}

impl EntityHandle {
    /// Wraps a handle under the given kind.
    pub fn new(kind: impl Into<String>, handle: NativeHandle) -> Self {
        Self {
            kind: kind.into(),
            handle,
        }
    }

    /// The entity's `Id` member, if it exposes one.
    pub fn id(&self) -> Option<String> {
        self.get("Id").and_then(|value| value.to_text())
    }

    /// Reads a member of the entity.
    pub fn get(&self, member: &str) -> Option<NativeValue> {
        get_member(&self.handle, member)
    }

    /// Calls a member of the entity, returning `None` on any failure.
    pub fn call(&self, member: &str, args: &[NativeValue]) -> Option<NativeValue> {
        invoke(&self.handle, member, args)
    }
}

impl EntityWrapper for EntityHandle {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn native(&self) -> &NativeHandle {
        &self.handle
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wraps handles whose host type is in a known set.
#[derive(Debug, Clone)]
pub struct HandleWrapperConverter {
    types: HashSet<String>,
}

impl HandleWrapperConverter {
    /// Creates a converter for [`DEFAULT_WRAPPED_TYPES`].
    pub fn new() -> Self {
        Self::for_types(DEFAULT_WRAPPED_TYPES)
    }

    /// Creates a converter for an explicit set of host types.
    pub fn for_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether handles of this host type are wrapped.
    pub fn wraps(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }
}

impl Default for HandleWrapperConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl WrapperConverter for HandleWrapperConverter {
    fn wrap(&self, handle: &NativeHandle) -> Option<Arc<dyn EntityWrapper>> {
        let type_name = handle.type_name();
        if !self.wraps(type_name) {
            return None;
        }
        Some(Arc::new(EntityHandle::new(type_name, Arc::clone(handle))))
    }
}
