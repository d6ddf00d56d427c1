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

//! Typed records derived from the host's raw hook notifications.

use super::{EventBus, TypedEvent};
use crate::error::ConversionError;
use crate::native::{EntityRef, WrapperConverter};

/// Identifier used when a payload does not carry one.
pub const UNKNOWN_ID: &str = "Unknown";

/// Hook tags understood by the native event adapter.
pub mod tags {
    /// A building was placed.
    pub const BUILDING_SPAWNED: &str = "BuildingSpawned";
    /// A building was removed.
    pub const BUILDING_DESPAWNED: &str = "BuildingDespawned";
    /// A building was upgraded.
    pub const BUILDING_UPGRADED: &str = "BuildingUpgraded";
    /// A drone was created.
    pub const DRONE_SPAWNED: &str = "DroneSpawned";
    /// A drone was destroyed.
    pub const DRONE_DESPAWNED: &str = "DroneDespawned";
    /// The host started a new game.
    pub const NEW_GAME_STARTED: &str = "NewGameStarted";
    /// The host continued a saved game.
    pub const GAME_CONTINUED: &str = "GameContinued";
}

/// A position on the map. Defaults to the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// Creates a position.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// A building was placed on the map.
#[derive(Debug, Clone)]
pub struct BuildingSpawned {
    /// Host identifier of the building.
    pub building_id: String,
    /// Host type of the building.
    pub building_type: String,
    /// Where it was placed.
    pub position: Position,
    /// The building entity itself.
    pub entity: EntityRef,
}

/// A building was removed from the map.
#[derive(Debug, Clone)]
pub struct BuildingDespawned {
    /// Host identifier of the building.
    pub building_id: String,
    /// The building entity itself.
    pub entity: EntityRef,
}

/// A building changed level.
#[derive(Debug, Clone)]
pub struct BuildingUpgraded {
    /// Host identifier of the building.
    pub building_id: String,
    /// Level before the upgrade.
    pub previous_level: i64,
    /// Level after the upgrade.
    pub new_level: i64,
    /// The building entity itself.
    pub entity: EntityRef,
}

/// A drone was created.
#[derive(Debug, Clone)]
pub struct DroneSpawned {
    /// Host identifier of the drone.
    pub drone_id: String,
    /// Host type of the drone.
    pub drone_type: String,
    /// Where it appeared.
    pub position: Position,
    /// The drone entity itself.
    pub entity: EntityRef,
}

/// A drone was destroyed.
#[derive(Debug, Clone)]
pub struct DroneDespawned {
    /// Host identifier of the drone.
    pub drone_id: String,
    /// The drone entity itself.
    pub entity: EntityRef,
}

macro_rules! entity_event {
    ($($event:ty),* $(,)?) => {
        $(
            impl TypedEvent for $event {
                fn convert_references(
                    &mut self,
                    converter: &dyn WrapperConverter,
                ) -> Result<(), ConversionError> {
                    self.entity.upgrade(converter)
                }
            }
        )*
    };
}

entity_event!(
    BuildingSpawned,
    BuildingDespawned,
    BuildingUpgraded,
    DroneSpawned,
    DroneDespawned,
);

/// Any of the typed records the native adapter can produce.
#[derive(Debug, Clone)]
pub enum NativeEvent {
    /// See [`BuildingSpawned`].
    BuildingSpawned(BuildingSpawned),
    /// See [`BuildingDespawned`].
    BuildingDespawned(BuildingDespawned),
    /// See [`BuildingUpgraded`].
    BuildingUpgraded(BuildingUpgraded),
    /// See [`DroneSpawned`].
    DroneSpawned(DroneSpawned),
    /// See [`DroneDespawned`].
    DroneDespawned(DroneDespawned),
}

impl NativeEvent {
    /// The hook tag this event is produced from.
    pub fn tag(&self) -> &'static str {
        match self {
            NativeEvent::BuildingSpawned(_) => tags::BUILDING_SPAWNED,
            NativeEvent::BuildingDespawned(_) => tags::BUILDING_DESPAWNED,
            NativeEvent::BuildingUpgraded(_) => tags::BUILDING_UPGRADED,
            NativeEvent::DroneSpawned(_) => tags::DRONE_SPAWNED,
            NativeEvent::DroneDespawned(_) => tags::DRONE_DESPAWNED,
        }
    }

    /// Publishes the contained record under its own type.
    ///
    /// Returns the number of handlers that received it.
    pub fn publish_to(self, bus: &EventBus) -> usize {
        match self {
            NativeEvent::BuildingSpawned(event) => bus.publish(event),
            NativeEvent::BuildingDespawned(event) => bus.publish(event),
            NativeEvent::BuildingUpgraded(event) => bus.publish(event),
            NativeEvent::DroneSpawned(event) => bus.publish(event),
            NativeEvent::DroneDespawned(event) => bus.publish(event),
        }
    }
}
