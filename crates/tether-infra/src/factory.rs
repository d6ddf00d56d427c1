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

//! The default translation from SDK commands to host-native commands.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tether_core::command::Parameters;
use tether_core::native::{NativeCommand, NativeValue};
use tether_core::{CommandFactory, CommandKind, ConversionError, GameCommand};

/// Builds the native command for a custom command type.
///
/// Returning `Ok(None)` declines the command.
pub type CustomBuilder =
    Arc<dyn Fn(&Parameters) -> Result<Option<NativeCommand>, ConversionError> + Send + Sync>;

/// Maps every command kind onto a `<CommandType>Command` native type.
///
/// Built-in kinds map their typed fields onto fixed argument names. Custom
/// kinds go to a registered builder when one exists. Without a builder the
/// parameters are matched by name: a name containing `Resource` supplies the
/// resource identifier and one containing `Amount` or `Quantity` supplies the
/// amount. Matching is case-sensitive, and the resource name must not also
/// contain `Amount` or `Quantity`.
#[derive(Default)]
pub struct NativeCommandFactory {
    builders: RwLock<HashMap<String, CustomBuilder>>,
}

impl NativeCommandFactory {
    /// Creates a factory with no custom builders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the builder used for a custom command type.
    pub fn register<F>(&self, command_type: impl Into<String>, builder: F)
    where
        F: Fn(&Parameters) -> Result<Option<NativeCommand>, ConversionError> + Send + Sync + 'static,
    {
        let command_type = command_type.into();
        log::debug!("Registered native builder for custom command '{command_type}'.");
        self.builders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(command_type, Arc::new(builder));
    }

    /// Whether a custom builder is registered for the command type.
    pub fn has_builder(&self, command_type: &str) -> bool {
        self.builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(command_type)
    }

    fn custom(
        &self,
        command_type: &str,
        parameters: &Parameters,
    ) -> Result<Option<NativeCommand>, ConversionError> {
        let builder = self
            .builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(command_type)
            .cloned();

        match builder {
            Some(builder) => builder(parameters),
            None => extract_by_name(command_type, parameters).map(Some),
        }
    }
}

impl CommandFactory for NativeCommandFactory {
    fn create(&self, command: &GameCommand) -> Result<Option<NativeCommand>, ConversionError> {
        let native = match command.kind() {
            CommandKind::ImportResource { resource, amount } => Some(
                native_for("ImportResource")
                    .with_argument("resource", resource.as_str())
                    .with_argument("amount", *amount),
            ),
            CommandKind::UnlockBuilding { building_id } => Some(
                native_for("UnlockBuilding").with_argument("buildingId", building_id.as_str()),
            ),
            CommandKind::ResearchTechnology { technology_id } => Some(
                native_for("ResearchTechnology")
                    .with_argument("technologyId", technology_id.as_str()),
            ),
            CommandKind::SetGameSpeed { speed } => {
                Some(native_for("SetGameSpeed").with_argument("speed", *speed))
            }
            CommandKind::Custom {
                command_type,
                parameters,
            } => self.custom(command_type, parameters)?,
        };

        Ok(native.map(|native| native.with_faction(command.faction().cloned())))
    }
}

impl fmt::Debug for NativeCommandFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let builders = self.builders.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("NativeCommandFactory")
            .field("custom_builders", &builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn native_for(command_type: &str) -> NativeCommand {
    NativeCommand::new(format!("{command_type}Command"))
}

fn extract_by_name(
    command_type: &str,
    parameters: &Parameters,
) -> Result<NativeCommand, ConversionError> {
    let is_amount = |name: &str| name.contains("Amount") || name.contains("Quantity");

    let (resource_key, resource) = parameters
        .iter()
        .find(|(name, _)| name.contains("Resource") && !is_amount(name))
        .ok_or(ConversionError::MissingParameter("Resource"))?;
    let (amount_key, amount) = parameters
        .iter()
        .find(|(name, _)| is_amount(name))
        .ok_or(ConversionError::MissingParameter("Amount"))?;

    let resource = match resource {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => {
            return Err(ConversionError::Other(format!(
                "parameter '{resource_key}' is not a resource identifier"
            )))
        }
    };
    let amount =
        coerce_number(amount).ok_or_else(|| ConversionError::NotNumeric(amount_key.clone()))?;

    Ok(native_for(command_type)
        .with_argument("resource", resource)
        .with_argument("amount", amount))
}

fn coerce_number(value: &Value) -> Option<NativeValue> {
    let number = match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Some(NativeValue::Int(int));
            }
            number.as_f64()?
        }
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !number.is_finite() {
        return None;
    }
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Some(NativeValue::Int(number as i64))
    } else {
        Some(NativeValue::Float(number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicObject;
    use serde_json::json;
    use tether_core::NativeHandle;

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn create(factory: &NativeCommandFactory, command: GameCommand) -> NativeCommand {
        factory.create(&command).unwrap().unwrap()
    }

    #[test]
    fn test_builtins_map_to_native_types() {
        let factory = NativeCommandFactory::new();

        let native = create(&factory, GameCommand::import_resource("WATER", 1000));
        assert_eq!(native.native_type(), "ImportResourceCommand");
        assert_eq!(native.argument("resource"), Some(&NativeValue::from("WATER")));
        assert_eq!(native.argument("amount"), Some(&NativeValue::Int(1000)));

        let native = create(&factory, GameCommand::unlock_building("Greenhouse"));
        assert_eq!(native.native_type(), "UnlockBuildingCommand");
        assert_eq!(native.argument("buildingId"), Some(&NativeValue::from("Greenhouse")));

        let native = create(&factory, GameCommand::research_technology("Fusion"));
        assert_eq!(native.argument("technologyId"), Some(&NativeValue::from("Fusion")));

        let native = create(&factory, GameCommand::set_game_speed(2.5));
        assert_eq!(native.argument("speed"), Some(&NativeValue::Float(2.5)));
    }

    #[test]
    fn test_faction_is_attached() {
        let faction: NativeHandle = DynamicObject::new("Faction");
        let command = GameCommand::import_resource("WATER", 1).with_faction(faction.clone());
        let native = create(&NativeCommandFactory::new(), command);
        assert!(Arc::ptr_eq(native.faction().unwrap(), &faction));
    }

    #[test]
    fn test_custom_extraction_by_name() {
        let factory = NativeCommandFactory::new();
        let command = GameCommand::custom(
            "Donate",
            params(json!({ "TargetResource": "OXYGEN", "DonationQuantity": "250" })),
        );

        let native = create(&factory, command);
        assert_eq!(native.native_type(), "DonateCommand");
        assert_eq!(native.argument("resource"), Some(&NativeValue::from("OXYGEN")));
        assert_eq!(native.argument("amount"), Some(&NativeValue::Int(250)));
    }

    #[test]
    fn test_custom_extraction_keeps_fractional_amounts() {
        let factory = NativeCommandFactory::new();
        let command = GameCommand::custom(
            "Spill",
            params(json!({ "Resource": "WATER", "Amount": 0.5 })),
        );
        let native = create(&factory, command);
        assert_eq!(native.argument("amount"), Some(&NativeValue::Float(0.5)));
    }

    #[test]
    fn test_custom_extraction_failures() {
        let factory = NativeCommandFactory::new();

        let missing = GameCommand::custom("Rain", params(json!({ "Intensity": 3 })));
        assert_eq!(
            factory.create(&missing).unwrap_err(),
            ConversionError::MissingParameter("Resource")
        );

        let no_amount = GameCommand::custom("Rain", params(json!({ "Resource": "WATER" })));
        assert_eq!(
            factory.create(&no_amount).unwrap_err(),
            ConversionError::MissingParameter("Amount")
        );

        let not_numeric = GameCommand::custom(
            "Rain",
            params(json!({ "Resource": "WATER", "Amount": "lots" })),
        );
        assert_eq!(
            factory.create(&not_numeric).unwrap_err(),
            ConversionError::NotNumeric("Amount".into())
        );
    }

    #[test]
    fn test_resource_amount_name_is_not_a_resource() {
        let factory = NativeCommandFactory::new();
        let command = GameCommand::custom(
            "Trade",
            params(json!({ "ResourceAmount": 5, "Resource": "IRON" })),
        );
        let native = create(&factory, command);
        assert_eq!(native.argument("resource"), Some(&NativeValue::from("IRON")));
        assert_eq!(native.argument("amount"), Some(&NativeValue::Int(5)));
    }

    #[test]
    fn test_registered_builder_takes_precedence() {
        let factory = NativeCommandFactory::new();
        factory.register("Rain", |parameters: &Parameters| {
            let intensity = parameters.get("Intensity").and_then(Value::as_f64);
            Ok(intensity.map(|i| NativeCommand::new("WeatherCommand").with_argument("rain", i)))
        });
        assert!(factory.has_builder("Rain"));

        let native = create(&factory, GameCommand::custom("Rain", params(json!({ "Intensity": 3.0 }))));
        assert_eq!(native.native_type(), "WeatherCommand");

        let declined = GameCommand::custom("Rain", Parameters::new());
        assert!(factory.create(&declined).unwrap().is_none());
    }
}
