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

//! Notifications about executed commands.

use super::TypedEvent;
use crate::command::CommandResult;
use crate::error::CommandError;

/// Published once for every command that executed successfully.
#[derive(Debug, Clone)]
pub struct CommandExecuted {
    /// The successful result.
    pub result: CommandResult,
}

impl TypedEvent for CommandExecuted {}

/// Published once for every command that failed, for any reason.
#[derive(Debug, Clone)]
pub struct CommandFailed {
    /// The failed result.
    pub result: CommandResult,
    /// The failure reason, copied out of the result for convenience.
    pub error: CommandError,
}

impl TypedEvent for CommandFailed {}
