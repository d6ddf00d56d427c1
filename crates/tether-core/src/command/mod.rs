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

//! The SDK-level command model.
//!
//! Built-in commands are a tagged variant model decided at the API boundary.
//! Extension-defined shapes that cannot be known in advance go through
//! [`CommandKind::Custom`], the only path that relies on name-based parameter
//! extraction.

mod factory;
mod result;

pub use factory::CommandFactory;
pub use result::{BatchCommandResult, CommandResult};

use crate::native::NativeHandle;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Ordered named parameters of a command.
pub type Parameters = serde_json::Map<String, Value>;

/// The highest game speed a `SetGameSpeed` command accepts.
pub const MAX_GAME_SPEED: f32 = 10.0;

/// Routing keys of the built-in command kinds.
pub const BUILTIN_COMMAND_TYPES: [&str; 4] = [
    "ImportResource",
    "UnlockBuilding",
    "ResearchTechnology",
    "SetGameSpeed",
];

/// What a command asks the host to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommandKind {
    /// Adds an amount of a resource to the faction's stockpile.
    ImportResource {
        /// Resource identifier (e.g. "WATER").
        resource: String,
        /// Amount to import. Must be positive.
        amount: u32,
    },
    /// Makes a building available for construction.
    UnlockBuilding {
        /// Identifier of the building.
        building_id: String,
    },
    /// Completes a technology on the research tree.
    ResearchTechnology {
        /// Identifier of the technology.
        technology_id: String,
    },
    /// Changes the simulation speed multiplier.
    SetGameSpeed {
        /// Speed multiplier in `0.0..=MAX_GAME_SPEED`.
        speed: f32,
    },
    /// An extension-defined command with an open-ended parameter shape.
    Custom {
        /// Routing key of the command.
        command_type: String,
        /// Named parameters, in insertion order.
        parameters: Parameters,
    },
}

impl CommandKind {
    /// Builds a kind from a routing key and named parameters.
    ///
    /// Built-in routing keys whose parameters decode into the typed variant
    /// produce that variant; everything else becomes [`CommandKind::Custom`].
    pub fn from_parts(command_type: &str, parameters: Parameters) -> Self {
        if BUILTIN_COMMAND_TYPES.contains(&command_type) {
            let mut tagged = parameters.clone();
            tagged.insert("type".to_string(), Value::String(command_type.to_string()));
            if let Ok(kind) = serde_json::from_value::<CommandKind>(Value::Object(tagged)) {
                return kind;
            }
            log::debug!(
                "Parameters for '{}' do not match the built-in shape; treating as custom",
                command_type
            );
        }
        CommandKind::Custom {
            command_type: command_type.to_string(),
            parameters,
        }
    }

    /// Returns the stable routing key of this kind.
    pub fn command_type(&self) -> &str {
        match self {
            CommandKind::ImportResource { .. } => "ImportResource",
            CommandKind::UnlockBuilding { .. } => "UnlockBuilding",
            CommandKind::ResearchTechnology { .. } => "ResearchTechnology",
            CommandKind::SetGameSpeed { .. } => "SetGameSpeed",
            CommandKind::Custom { command_type, .. } => command_type,
        }
    }

    /// Checks the kind's own constraints. Pure; callable any number of times.
    pub fn is_valid(&self) -> bool {
        match self {
            CommandKind::ImportResource { resource, amount } => {
                !resource.trim().is_empty() && *amount > 0
            }
            CommandKind::UnlockBuilding { building_id } => !building_id.trim().is_empty(),
            CommandKind::ResearchTechnology { technology_id } => !technology_id.trim().is_empty(),
            CommandKind::SetGameSpeed { speed } => {
                speed.is_finite() && (0.0..=MAX_GAME_SPEED).contains(speed)
            }
            CommandKind::Custom { command_type, .. } => !command_type.trim().is_empty(),
        }
    }

    /// Returns the named parameters of this kind in a stable order.
    pub fn parameters(&self) -> Parameters {
        let value = match self {
            CommandKind::ImportResource { resource, amount } => {
                json!({ "resource": resource, "amount": amount })
            }
            CommandKind::UnlockBuilding { building_id } => json!({ "building_id": building_id }),
            CommandKind::ResearchTechnology { technology_id } => {
                json!({ "technology_id": technology_id })
            }
            CommandKind::SetGameSpeed { speed } => json!({ "speed": speed }),
            CommandKind::Custom { parameters, .. } => return parameters.clone(),
        };
        match value {
            Value::Object(map) => map,
            _ => Parameters::new(),
        }
    }
}

/// A command issued by extension code against the host.
#[derive(Debug, Clone)]
pub struct GameCommand {
    id: Uuid,
    kind: CommandKind,
    faction: Option<NativeHandle>,
    issued_at: Instant,
}

impl GameCommand {
    /// Creates a command of the given kind with no faction.
    pub fn new(kind: CommandKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            faction: None,
            issued_at: Instant::now(),
        }
    }

    /// Sets the faction the command acts on behalf of.
    pub fn with_faction(mut self, faction: NativeHandle) -> Self {
        self.faction = Some(faction);
        self
    }

    /// Shorthand for an [`CommandKind::ImportResource`] command.
    pub fn import_resource(resource: impl Into<String>, amount: u32) -> Self {
        Self::new(CommandKind::ImportResource {
            resource: resource.into(),
            amount,
        })
    }

    /// Shorthand for an [`CommandKind::UnlockBuilding`] command.
    pub fn unlock_building(building_id: impl Into<String>) -> Self {
        Self::new(CommandKind::UnlockBuilding {
            building_id: building_id.into(),
        })
    }

    /// Shorthand for a [`CommandKind::ResearchTechnology`] command.
    pub fn research_technology(technology_id: impl Into<String>) -> Self {
        Self::new(CommandKind::ResearchTechnology {
            technology_id: technology_id.into(),
        })
    }

    /// Shorthand for a [`CommandKind::SetGameSpeed`] command.
    pub fn set_game_speed(speed: f32) -> Self {
        Self::new(CommandKind::SetGameSpeed { speed })
    }

    /// Shorthand for a [`CommandKind::Custom`] command.
    pub fn custom(command_type: impl Into<String>, parameters: Parameters) -> Self {
        Self::new(CommandKind::Custom {
            command_type: command_type.into(),
            parameters,
        })
    }

    /// Unique identifier of this command instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The command's kind.
    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// The stable routing key.
    pub fn command_type(&self) -> &str {
        self.kind.command_type()
    }

    /// The faction this command acts for, if any.
    pub fn faction(&self) -> Option<&NativeHandle> {
        self.faction.as_ref()
    }

    /// When the command was created.
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// The command's named parameters.
    pub fn parameters(&self) -> Parameters {
        self.kind.parameters()
    }

    /// Whether the command passes its own validity check.
    pub fn is_valid(&self) -> bool {
        self.kind.is_valid()
    }
}

impl fmt::Display for GameCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CommandKind::ImportResource { resource, amount } => {
                write!(f, "ImportResource({resource} x{amount})")
            }
            CommandKind::UnlockBuilding { building_id } => write!(f, "UnlockBuilding({building_id})"),
            CommandKind::ResearchTechnology { technology_id } => {
                write!(f, "ResearchTechnology({technology_id})")
            }
            CommandKind::SetGameSpeed { speed } => write!(f, "SetGameSpeed({speed})"),
            CommandKind::Custom {
                command_type,
                parameters,
            } => write!(f, "{command_type}({} params)", parameters.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => Parameters::new(),
        }
    }

    #[test]
    fn test_builtin_validity() {
        assert!(GameCommand::import_resource("WATER", 1000).is_valid());
        assert!(!GameCommand::import_resource("WATER", 0).is_valid());
        assert!(!GameCommand::import_resource("  ", 5).is_valid());
        assert!(GameCommand::unlock_building("greenhouse").is_valid());
        assert!(!GameCommand::research_technology("").is_valid());
        assert!(GameCommand::set_game_speed(2.0).is_valid());
        assert!(!GameCommand::set_game_speed(f32::NAN).is_valid());
        assert!(!GameCommand::set_game_speed(MAX_GAME_SPEED + 1.0).is_valid());
    }

    #[test]
    fn test_validity_is_repeatable() {
        let command = GameCommand::import_resource("WATER", 0);
        for _ in 0..3 {
            assert!(!command.is_valid());
        }
    }

    #[test]
    fn test_custom_requires_type() {
        assert!(GameCommand::custom("SpawnMeteor", Parameters::new()).is_valid());
        assert!(!GameCommand::custom(" ", Parameters::new()).is_valid());
    }

    #[test]
    fn test_command_type_and_parameters() {
        let command = GameCommand::import_resource("WATER", 1000);
        assert_eq!(command.command_type(), "ImportResource");

        let parameters = command.parameters();
        let keys: Vec<&str> = parameters.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["resource", "amount"]);
        assert_eq!(parameters["amount"], json!(1000));
    }

    #[test]
    fn test_from_parts_decodes_builtins() {
        let kind = CommandKind::from_parts(
            "ImportResource",
            params(json!({ "resource": "ICE", "amount": 5 })),
        );
        assert_eq!(
            kind,
            CommandKind::ImportResource {
                resource: "ICE".into(),
                amount: 5
            }
        );
    }

    #[test]
    fn test_from_parts_falls_back_to_custom() {
        let kind = CommandKind::from_parts("ImportResource", params(json!({ "what": "ICE" })));
        assert_eq!(kind.command_type(), "ImportResource");
        assert!(matches!(kind, CommandKind::Custom { .. }));

        let kind = CommandKind::from_parts("GiftColonists", params(json!({ "Quantity": 3 })));
        assert!(matches!(kind, CommandKind::Custom { .. }));
        assert_eq!(kind.parameters()["Quantity"], json!(3));
    }

    #[test]
    fn test_display_describes_command() {
        assert_eq!(
            GameCommand::import_resource("WATER", 1000).to_string(),
            "ImportResource(WATER x1000)"
        );
        let custom = GameCommand::custom("Rain", params(json!({ "a": 1, "b": 2 })));
        assert_eq!(custom.to_string(), "Rain(2 params)");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = GameCommand::unlock_building("dome");
        let b = GameCommand::unlock_building("dome");
        assert_ne!(a.id(), b.id());
    }
}
