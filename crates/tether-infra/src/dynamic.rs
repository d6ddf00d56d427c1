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

//! An in-memory host object whose members can change at runtime.
//!
//! Used to stand in for the host process in tests and demos: the shape of a
//! [`DynamicObject`] is only known by name, exactly like a real host object.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tether_core::native::NativeValue;
use tether_core::{NativeError, NativeObject};

type Method = Arc<dyn Fn(&[NativeValue]) -> Result<NativeValue, NativeError> + Send + Sync>;

#[derive(Default)]
struct Members {
    fields: HashMap<String, NativeValue>,
    properties: HashMap<String, NativeValue>,
    methods: HashMap<String, Method>,
}

/// A host object backed by name-keyed maps.
pub struct DynamicObject {
    type_name: String,
    members: RwLock<Members>,
}

impl DynamicObject {
    /// Creates an object with no members.
    pub fn new(type_name: impl Into<String>) -> Arc<Self> {
        Self::builder(type_name).build()
    }

    /// Starts building an object of the given host type.
    pub fn builder(type_name: impl Into<String>) -> DynamicObjectBuilder {
        DynamicObjectBuilder {
            type_name: type_name.into(),
            members: Members::default(),
        }
    }

    /// Sets or replaces a field.
    pub fn set_field(&self, name: impl Into<String>, value: impl Into<NativeValue>) {
        self.write().fields.insert(name.into(), value.into());
    }

    /// Removes a field, returning its previous value.
    pub fn remove_field(&self, name: &str) -> Option<NativeValue> {
        self.write().fields.remove(name)
    }

    /// Sets or replaces a property.
    pub fn set_property(&self, name: impl Into<String>, value: impl Into<NativeValue>) {
        self.write().properties.insert(name.into(), value.into());
    }

    /// Registers or replaces a method.
    pub fn set_method<F>(&self, name: impl Into<String>, method: F)
    where
        F: Fn(&[NativeValue]) -> Result<NativeValue, NativeError> + Send + Sync + 'static,
    {
        self.write().methods.insert(name.into(), Arc::new(method));
    }

    /// Names of all fields currently set.
    pub fn field_names(&self) -> Vec<String> {
        self.read().fields.keys().cloned().collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Members> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Members> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NativeObject for DynamicObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn field(&self, name: &str) -> Option<NativeValue> {
        self.read().fields.get(name).cloned()
    }

    fn property(&self, name: &str) -> Option<NativeValue> {
        self.read().properties.get(name).cloned()
    }

    fn invoke(&self, member: &str, args: &[NativeValue]) -> Result<NativeValue, NativeError> {
        // The lock is released before the call so methods may mutate the object.
        let method = self.read().methods.get(member).cloned();
        match method {
            Some(method) => method(args),
            None => Err(NativeError::MissingMember {
                type_name: self.type_name.clone(),
                member: member.to_string(),
            }),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for DynamicObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.read();
        let mut fields: Vec<&String> = members.fields.keys().collect();
        fields.sort();
        f.debug_struct("DynamicObject")
            .field("type_name", &self.type_name)
            .field("fields", &fields)
            .field("methods", &members.methods.len())
            .finish()
    }
}

/// Builder for [`DynamicObject`].
pub struct DynamicObjectBuilder {
    type_name: String,
    members: Members,
}

impl DynamicObjectBuilder {
    /// Adds a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<NativeValue>) -> Self {
        self.members.fields.insert(name.into(), value.into());
        self
    }

    /// Adds a property.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<NativeValue>) -> Self {
        self.members.properties.insert(name.into(), value.into());
        self
    }

    /// Adds a method.
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&[NativeValue]) -> Result<NativeValue, NativeError> + Send + Sync + 'static,
    {
        self.members.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Finishes the object.
    pub fn build(self) -> Arc<DynamicObject> {
        Arc::new(DynamicObject {
            type_name: self.type_name,
            members: RwLock::new(self.members),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::native::get_member;
    use tether_core::NativeHandle;

    #[test]
    fn test_builder_and_reflection() {
        let object = DynamicObject::builder("Building")
            .field("Id", "B-1")
            .property("Level", 3i64)
            .method("Double", |args: &[NativeValue]| {
                Ok(NativeValue::Int(args[0].as_i64().unwrap_or(0) * 2))
            })
            .build();

        assert_eq!(object.type_name(), "Building");
        assert_eq!(object.field("Id"), Some(NativeValue::from("B-1")));
        assert_eq!(object.field("Level"), None);
        assert_eq!(object.property("Level"), Some(NativeValue::Int(3)));
        assert_eq!(
            object.invoke("Double", &[NativeValue::Int(21)]),
            Ok(NativeValue::Int(42))
        );
    }

    #[test]
    fn test_missing_method_is_reported() {
        let object = DynamicObject::new("Faction");
        let err = object.invoke("Explode", &[]).unwrap_err();
        assert_eq!(
            err,
            NativeError::MissingMember {
                type_name: "Faction".into(),
                member: "Explode".into()
            }
        );
    }

    #[test]
    fn test_members_change_at_runtime() {
        let object = DynamicObject::new("Host");
        let handle: NativeHandle = object.clone();
        assert!(get_member(&handle, "GameHub").is_none());

        object.set_field("GameHub", NativeValue::Object(DynamicObject::new("GameHub")));
        assert!(get_member(&handle, "GameHub").is_some());

        assert!(object.remove_field("GameHub").is_some());
        assert!(get_member(&handle, "GameHub").is_none());
    }

    #[test]
    fn test_method_may_mutate_its_object() {
        let object = DynamicObject::new("Counter");
        let target = Arc::downgrade(&object);
        object.set_method("Bump", move |_| {
            if let Some(object) = target.upgrade() {
                let next = object.field("Count").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
                object.set_field("Count", next);
            }
            Ok(NativeValue::Null)
        });

        object.invoke("Bump", &[]).unwrap();
        object.invoke("Bump", &[]).unwrap();
        assert_eq!(object.field("Count"), Some(NativeValue::Int(2)));
    }
}
