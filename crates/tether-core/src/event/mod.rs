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

//! Typed events and the bus that delivers them.

mod bus;
pub mod command;
pub mod lifecycle;
pub mod native;

pub use bus::{BusStatistics, EventBus, SubscriptionId};
pub use command::{CommandExecuted, CommandFailed};
pub use lifecycle::{
    BaseGameDetected, EarlyModsReady, GameFullyLoaded, GameHubInitialized, GameHubReady,
    GameLoadTimedOut, LoadTrigger,
};
pub use native::{
    BuildingDespawned, BuildingSpawned, BuildingUpgraded, DroneDespawned, DroneSpawned,
    NativeEvent, Position,
};

use crate::error::ConversionError;
use crate::native::WrapperConverter;
use std::any::Any;
use std::fmt::Debug;

/// A plain data record delivered through the [`EventBus`].
///
/// The bus routes on the event's concrete type.
pub trait TypedEvent: Any + Clone + Send + Sync + Debug {
    /// Upgrades raw native references held by the event into wrappers.
    ///
    /// Called by the bus on a copy of the event when auto-conversion is
    /// enabled. Events without native references keep the default no-op.
    fn convert_references(&mut self, converter: &dyn WrapperConverter) -> Result<(), ConversionError> {
        let _ = converter;
        Ok(())
    }
}
