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

//! Conversion of raw host hook notifications into typed events.

use std::collections::HashMap;
use tether_core::event::native::{tags, UNKNOWN_ID};
use tether_core::event::{
    BuildingDespawned, BuildingSpawned, BuildingUpgraded, DroneDespawned, DroneSpawned,
    NativeEvent, Position,
};
use tether_core::native::{get_member, EntityRef, NativeValue};

type Builder = fn(&PayloadReader<'_>) -> NativeEvent;

/// Turns `(tag, payload)` notifications into [`NativeEvent`]s.
///
/// The tag table is fixed at construction. Payload fields are read with the
/// "field, then property" lookup and replaced by a default when absent, so a
/// payload of an unexpected shape still yields a partially-populated event.
#[derive(Debug, Clone)]
pub struct NativeEventAdapter {
    builders: HashMap<&'static str, Builder>,
}

impl NativeEventAdapter {
    /// Creates the adapter with its built-in tag table.
    pub fn new() -> Self {
        let table: [(&'static str, Builder); 5] = [
            (tags::BUILDING_SPAWNED, building_spawned),
            (tags::BUILDING_DESPAWNED, building_despawned),
            (tags::BUILDING_UPGRADED, building_upgraded),
            (tags::DRONE_SPAWNED, drone_spawned),
            (tags::DRONE_DESPAWNED, drone_despawned),
        ];
        Self {
            builders: table.into_iter().collect(),
        }
    }

    /// Converts a notification. Unrecognized tags yield `None`.
    pub fn convert(&self, tag: &str, payload: &NativeValue) -> Option<NativeEvent> {
        let Some(build) = self.builders.get(tag) else {
            log::trace!("No typed event for native tag '{tag}'.");
            return None;
        };
        Some(build(&PayloadReader { payload }))
    }

    /// Whether the tag has a typed event.
    pub fn supports(&self, tag: &str) -> bool {
        self.builders.contains_key(tag)
    }

    /// All tags with a typed event, sorted.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.builders.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for NativeEventAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Field extraction with documented defaults.
struct PayloadReader<'a> {
    payload: &'a NativeValue,
}

impl PayloadReader<'_> {
    fn member(&self, name: &str) -> Option<NativeValue> {
        get_member(self.payload.as_object()?, name)
    }

    fn id(&self) -> String {
        self.text("Id")
    }

    fn text(&self, name: &str) -> String {
        self.member(name)
            .and_then(|value| value.to_text())
            .unwrap_or_else(|| UNKNOWN_ID.to_string())
    }

    fn level(&self, name: &str) -> i64 {
        self.member(name)
            .and_then(|value| value.as_i64())
            .unwrap_or(0)
    }

    fn position(&self) -> Position {
        self.member("Position")
            .and_then(|value| value.as_vector2())
            .map(Position::from)
            .unwrap_or_default()
    }

    fn entity(&self) -> EntityRef {
        self.payload
            .as_object()
            .map_or(EntityRef::Absent, |handle| EntityRef::Native(handle.clone()))
    }
}

fn building_spawned(reader: &PayloadReader<'_>) -> NativeEvent {
    NativeEvent::BuildingSpawned(BuildingSpawned {
        building_id: reader.id(),
        building_type: reader.text("BuildingType"),
        position: reader.position(),
        entity: reader.entity(),
    })
}

fn building_despawned(reader: &PayloadReader<'_>) -> NativeEvent {
    NativeEvent::BuildingDespawned(BuildingDespawned {
        building_id: reader.id(),
        entity: reader.entity(),
    })
}

fn building_upgraded(reader: &PayloadReader<'_>) -> NativeEvent {
    NativeEvent::BuildingUpgraded(BuildingUpgraded {
        building_id: reader.id(),
        previous_level: reader.level("PreviousLevel"),
        new_level: reader.level("Level"),
        entity: reader.entity(),
    })
}

fn drone_spawned(reader: &PayloadReader<'_>) -> NativeEvent {
    NativeEvent::DroneSpawned(DroneSpawned {
        drone_id: reader.id(),
        drone_type: reader.text("DroneType"),
        position: reader.position(),
        entity: reader.entity(),
    })
}

fn drone_despawned(reader: &PayloadReader<'_>) -> NativeEvent {
    NativeEvent::DroneDespawned(DroneDespawned {
        drone_id: reader.id(),
        entity: reader.entity(),
    })
}
