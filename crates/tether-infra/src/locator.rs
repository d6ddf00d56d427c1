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

//! Singleton discovery by probing well-known member names on a host root.

use crate::router::{ReflectedRouter, DEFAULT_SUBMIT_MEMBER};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tether_core::native::{get_member, CommandRouter, ObjectLocator, RouterProvider};
use tether_core::NativeHandle;

/// Type name of the host's command bus singleton.
pub const DEFAULT_ROUTER_SINGLETON: &str = "CommandBus";

/// Finds host singletons by reading members of a root object.
///
/// For a singleton named `GameHub` the locator tries the members `GameHub`,
/// `gameHub` and `_gameHub`, followed by any aliases registered for that
/// name. Only hits are cached; a miss is retried on the next call, so a
/// singleton the host creates later is picked up without further work.
/// A cached handle is kept until [`invalidate`](Self::invalidate).
#[derive(Debug)]
pub struct ProbingLocator {
    root: NativeHandle,
    aliases: HashMap<String, Vec<String>>,
    router_singleton: String,
    submit_member: String,
    cache: RwLock<HashMap<String, NativeHandle>>,
}

impl ProbingLocator {
    /// Creates a locator over the given root object.
    pub fn new(root: NativeHandle) -> Self {
        Self {
            root,
            aliases: HashMap::new(),
            router_singleton: DEFAULT_ROUTER_SINGLETON.to_string(),
            submit_member: DEFAULT_SUBMIT_MEMBER.to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Registers an extra member name to probe for a singleton.
    pub fn with_alias(mut self, singleton: impl Into<String>, member: impl Into<String>) -> Self {
        self.aliases
            .entry(singleton.into())
            .or_default()
            .push(member.into());
        self
    }

    /// Overrides the command bus singleton name and its submit member.
    pub fn with_router(
        mut self,
        singleton: impl Into<String>,
        submit_member: impl Into<String>,
    ) -> Self {
        self.router_singleton = singleton.into();
        self.submit_member = submit_member.into();
        self
    }

    /// The root object probed by this locator.
    pub fn root(&self) -> &NativeHandle {
        &self.root
    }

    /// Forgets every cached singleton.
    pub fn invalidate(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!("Invalidating {} cached singleton(s).", cache.len());
        cache.clear();
    }

    /// Number of singletons currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn candidates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = String> + 'a {
        let lower = lower_camel(name);
        let underscored = format!("_{lower}");
        [name.to_string(), lower, underscored]
            .into_iter()
            .chain(self.aliases.get(name).into_iter().flatten().cloned())
    }

    fn probe(&self, name: &str) -> Option<NativeHandle> {
        self.candidates(name).find_map(|member| {
            get_member(&self.root, &member).and_then(|value| value.as_object().cloned())
        })
    }
}

impl ObjectLocator for ProbingLocator {
    fn try_get_singleton(&self, type_name: &str) -> Option<NativeHandle> {
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(type_name)
        {
            return Some(Arc::clone(hit));
        }

        let found = if self.root.type_name() == type_name {
            Some(Arc::clone(&self.root))
        } else {
            self.probe(type_name)
        }?;

        log::debug!("Located singleton {type_name} ({}).", found.type_name());
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(type_name.to_string(), Arc::clone(&found));
        Some(found)
    }
}

impl RouterProvider for ProbingLocator {
    fn router(&self) -> Option<Arc<dyn CommandRouter>> {
        self.try_get_singleton(&self.router_singleton).map(|handle| {
            Arc::new(ReflectedRouter::with_member(handle, self.submit_member.clone()))
                as Arc<dyn CommandRouter>
        })
    }
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicObject;
    use tether_core::native::{NativeCommand, NativeValue};
    use tether_core::NativeObject;

    fn object(type_name: &str) -> NativeValue {
        NativeValue::Object(DynamicObject::new(type_name))
    }

    #[test]
    fn test_lower_camel() {
        assert_eq!(lower_camel("GameHub"), "gameHub");
        assert_eq!(lower_camel(""), "");
    }

    #[test]
    fn test_probes_name_variants() {
        let root = DynamicObject::builder("Host")
            .field("gameHub", object("GameHub"))
            .property("_universe", object("Universe"))
            .build();
        let locator = ProbingLocator::new(root);

        assert_eq!(locator.try_get_singleton("GameHub").unwrap().type_name(), "GameHub");
        assert_eq!(locator.try_get_singleton("Universe").unwrap().type_name(), "Universe");
        assert!(locator.try_get_singleton("CurrentPlanet").is_none());
    }

    #[test]
    fn test_root_resolves_to_itself() {
        let locator = ProbingLocator::new(DynamicObject::new("Host"));
        assert_eq!(locator.try_get_singleton("Host").unwrap().type_name(), "Host");
    }

    #[test]
    fn test_aliases_are_probed_last() {
        let root = DynamicObject::builder("Host")
            .field("Hub", object("GameHub"))
            .build();
        let locator = ProbingLocator::new(root).with_alias("GameHub", "Hub");
        assert!(locator.try_get_singleton("GameHub").is_some());
    }

    #[test]
    fn test_only_hits_are_cached() {
        let root = DynamicObject::new("Host");
        let locator = ProbingLocator::new(root.clone());

        assert!(locator.try_get_singleton("GameHub").is_none());
        assert_eq!(locator.cached_count(), 0);

        root.set_field("GameHub", object("GameHub"));
        assert!(locator.try_get_singleton("GameHub").is_some());
        assert_eq!(locator.cached_count(), 1);

        // The cached handle survives the host dropping the member.
        root.remove_field("GameHub");
        assert!(locator.try_get_singleton("GameHub").is_some());

        locator.invalidate();
        assert!(locator.try_get_singleton("GameHub").is_none());
    }

    #[test]
    fn test_router_wraps_command_bus() {
        let bus = DynamicObject::builder("CommandBus")
            .method("Submit", |_: &[NativeValue]| Ok(NativeValue::Bool(true)))
            .build();
        let root = DynamicObject::new("Host");
        let locator = ProbingLocator::new(root.clone()).with_router("CommandBus", "Submit");

        assert!(locator.router().is_none());
        root.set_field("CommandBus", NativeValue::Object(bus));

        let router = locator.router().unwrap();
        assert!(router.submit(NativeCommand::new("ImportResourceCommand")).is_ok());
    }
}
