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

//! Capability contracts over the host's object model.
//!
//! The host exposes loosely-typed objects whose shape is only known at
//! runtime. Everything in the bridge talks to them through the narrow traits
//! defined here; the reflection-backed implementations live in `tether-infra`.

mod access;
mod command;
mod value;
mod wrapper;

pub use access::{get_member, invoke};
pub use command::NativeCommand;
pub use value::NativeValue;
pub use wrapper::{EntityRef, EntityWrapper, WrapperConverter};

use crate::error::NativeError;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

/// A shared reference to a host-owned object.
///
/// A handle is only meaningful while the host keeps the underlying object alive.
pub type NativeHandle = Arc<dyn NativeObject>;

/// The reflection surface of a single host object.
pub trait NativeObject: Send + Sync + Debug {
    /// Returns the host-side type name of the object.
    fn type_name(&self) -> &str;

    /// Reads a field by name.
    fn field(&self, name: &str) -> Option<NativeValue>;

    /// Reads a property by name. Objects without properties keep the default.
    fn property(&self, name: &str) -> Option<NativeValue> {
        let _ = name;
        None
    }

    /// Invokes a member with positional arguments.
    fn invoke(&self, member: &str, args: &[NativeValue]) -> Result<NativeValue, NativeError>;

    /// Allows downcasting to concrete object types.
    fn as_any(&self) -> &dyn Any;
}

/// Locates host singletons by type name.
pub trait ObjectLocator: Send + Sync {
    /// Returns the singleton of the given type, or `None` if it is not observable yet.
    fn try_get_singleton(&self, type_name: &str) -> Option<NativeHandle>;
}

/// The host's command intake ("command bus").
pub trait CommandRouter: Send + Sync {
    /// Submits a native command to the host.
    fn submit(&self, command: NativeCommand) -> Result<(), NativeError>;
}

/// Provides the current command router, if the host has created one.
pub trait RouterProvider: Send + Sync {
    /// Returns the router, or `None` while it is unavailable.
    fn router(&self) -> Option<Arc<dyn CommandRouter>>;
}
