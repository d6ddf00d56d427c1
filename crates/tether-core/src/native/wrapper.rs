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

use super::NativeHandle;
use crate::error::ConversionError;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// An SDK-side typed façade over a native handle.
pub trait EntityWrapper: Send + Sync + Debug {
    /// A short name for the kind of entity being wrapped (e.g. "Building").
    fn kind(&self) -> &str;

    /// The handle this wrapper fronts.
    fn native(&self) -> &NativeHandle;

    /// Allows downcasting to concrete wrapper types.
    fn as_any(&self) -> &dyn Any;
}

/// Turns raw native handles into wrappers.
pub trait WrapperConverter: Send + Sync {
    /// Wraps the handle, or returns `None` if no wrapper fits its type.
    fn wrap(&self, handle: &NativeHandle) -> Option<Arc<dyn EntityWrapper>>;
}

/// A reference to a host entity carried inside an event.
#[derive(Debug, Clone, Default)]
pub enum EntityRef {
    /// The payload did not carry an entity.
    #[default]
    Absent,
    /// A raw native reference, as delivered by the host.
    Native(NativeHandle),
    /// A reference that has been upgraded to an SDK wrapper.
    Wrapped(Arc<dyn EntityWrapper>),
}

impl EntityRef {
    /// Returns the underlying native handle, whether wrapped or not.
    pub fn native(&self) -> Option<&NativeHandle> {
        match self {
            EntityRef::Absent => None,
            EntityRef::Native(handle) => Some(handle),
            EntityRef::Wrapped(wrapper) => Some(wrapper.native()),
        }
    }

    /// Returns the wrapper if the reference has been upgraded.
    pub fn wrapper(&self) -> Option<&Arc<dyn EntityWrapper>> {
        match self {
            EntityRef::Wrapped(wrapper) => Some(wrapper),
            _ => None,
        }
    }

    /// Returns the wrapper downcast to a concrete type.
    pub fn wrapper_as<T: 'static>(&self) -> Option<&T> {
        self.wrapper()
            .and_then(|wrapper| wrapper.as_any().downcast_ref::<T>())
    }

    /// Returns `true` if the reference has been upgraded to a wrapper.
    pub fn is_wrapped(&self) -> bool {
        matches!(self, EntityRef::Wrapped(_))
    }

    /// Upgrades a raw native reference in place.
    ///
    /// Absent and already-wrapped references are left untouched.
    pub fn upgrade(&mut self, converter: &dyn WrapperConverter) -> Result<(), ConversionError> {
        if let EntityRef::Native(handle) = self {
            let wrapper = converter
                .wrap(handle)
                .ok_or_else(|| ConversionError::NoWrapper(handle.type_name().to_string()))?;
            *self = EntityRef::Wrapped(wrapper);
        }
        Ok(())
    }
}
