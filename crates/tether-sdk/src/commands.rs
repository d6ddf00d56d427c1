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

//! The command-issuing half of the public API.

use serde_json::Value;
use std::sync::Arc;
use tether_control::{CommandDispatcher, DispatchError};
use tether_core::command::Parameters;
use tether_core::{CommandKind, CommandResult, GameCommand, NativeHandle};

/// Entry point for building and dispatching commands.
///
/// Obtained from [`Sdk::commands`](crate::Sdk::commands).
#[derive(Debug, Clone, Copy)]
pub struct Commands<'a> {
    dispatcher: &'a CommandDispatcher,
}

impl<'a> Commands<'a> {
    pub(crate) fn new(dispatcher: &'a CommandDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Starts a command of the given type.
    ///
    /// Built-in types whose parameters match their typed shape become the
    /// typed variant; anything else is dispatched as a custom command.
    pub fn create(&self, command_type: impl Into<String>) -> CommandBuilder<'a> {
        CommandBuilder {
            dispatcher: self.dispatcher,
            command_type: command_type.into(),
            parameters: Parameters::new(),
            faction: None,
        }
    }

    /// Adds `amount` of `resource` to the faction's stockpile.
    pub fn import_resource(
        &self,
        faction: Option<NativeHandle>,
        resource: &str,
        amount: u32,
    ) -> Result<CommandResult, DispatchError> {
        self.create("ImportResource")
            .maybe_faction(faction)
            .param("resource", resource)
            .param("amount", amount)
            .execute()
    }

    /// Makes a building available for construction.
    pub fn unlock_building(
        &self,
        faction: Option<NativeHandle>,
        building_id: &str,
    ) -> Result<CommandResult, DispatchError> {
        self.create("UnlockBuilding")
            .maybe_faction(faction)
            .param("building_id", building_id)
            .execute()
    }

    /// Completes a technology.
    pub fn research_technology(
        &self,
        faction: Option<NativeHandle>,
        technology_id: &str,
    ) -> Result<CommandResult, DispatchError> {
        self.create("ResearchTechnology")
            .maybe_faction(faction)
            .param("technology_id", technology_id)
            .execute()
    }

    /// Changes the simulation speed.
    pub fn set_game_speed(&self, speed: f32) -> Result<CommandResult, DispatchError> {
        self.create("SetGameSpeed").param("speed", speed).execute()
    }
}

/// Accumulates the parts of one command.
#[derive(Debug, Clone)]
pub struct CommandBuilder<'a> {
    dispatcher: &'a CommandDispatcher,
    command_type: String,
    parameters: Parameters,
    faction: Option<NativeHandle>,
}

impl CommandBuilder<'_> {
    /// Issues the command on behalf of a faction.
    pub fn faction(mut self, faction: NativeHandle) -> Self {
        self.faction = Some(faction);
        self
    }

    /// Sets a named parameter, replacing an earlier value of the same name.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Finishes the command without dispatching it.
    pub fn build(self) -> GameCommand {
        let kind = CommandKind::from_parts(&self.command_type, self.parameters);
        let command = GameCommand::new(kind);
        match self.faction {
            Some(faction) => command.with_faction(faction),
            None => command,
        }
    }

    /// Dispatches the command on the calling thread.
    pub fn execute(self) -> Result<CommandResult, DispatchError> {
        let dispatcher = self.dispatcher;
        dispatcher.dispatch(self.build())
    }

    /// Dispatches the command on the blocking pool.
    pub async fn execute_async(self) -> Result<CommandResult, DispatchError> {
        let dispatcher = self.dispatcher;
        dispatcher.dispatch_async(Arc::new(self.build())).await
    }

    fn maybe_faction(mut self, faction: Option<NativeHandle>) -> Self {
        self.faction = faction;
        self
    }
}
