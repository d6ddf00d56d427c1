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

//! # Tether SDK
//!
//! The stable API extensions use to issue commands against the host and to
//! subscribe to typed notifications about it.
//!
//! ```rust,ignore
//! let sdk = Sdk::with_host(root, SdkConfig::default());
//! sdk.on_command_failed(|event| log::warn!("{}", event.error));
//! sdk.events().subscribe(|event: &GameFullyLoaded| log::info!("ready at {}", event.tick));
//!
//! // Once per host frame:
//! sdk.on_frame();
//! sdk.commands().import_resource(None, "WATER", 1000)?;
//! ```

#![warn(missing_docs)]

mod commands;
mod config;
mod logging;
mod sdk;

pub use commands::{CommandBuilder, Commands};
pub use config::{ConfigError, SdkConfig};
pub use logging::init_logging;
pub use sdk::{HostServices, Sdk};

/// Re-exports of the types most extensions need.
pub mod prelude {
    pub use crate::{CommandBuilder, Commands, HostServices, Sdk, SdkConfig};
    pub use tether_control::{BatchMode, DispatchError, LifecycleState, NativeHook};
    pub use tether_core::event::{
        BaseGameDetected, BuildingDespawned, BuildingSpawned, BuildingUpgraded, CommandExecuted,
        CommandFailed, DroneDespawned, DroneSpawned, EarlyModsReady, GameFullyLoaded,
        GameHubInitialized, GameHubReady, GameLoadTimedOut, LoadTrigger, Position,
    };
    pub use tether_core::native::{EntityRef, NativeValue};
    pub use tether_core::{
        BatchCommandResult, CommandError, CommandKind, CommandResult, EventBus, GameCommand,
        NativeHandle, SubscriptionId, TypedEvent,
    };
    pub use tether_infra::EntityHandle;
}
