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

use super::GameCommand;
use crate::error::ConversionError;
use crate::native::NativeCommand;

/// Converts an SDK-level command into a host-native command instance.
pub trait CommandFactory: Send + Sync {
    /// Produces the native command.
    ///
    /// `Ok(None)` means the factory had nothing to offer for this command; the
    /// executor reports it as a generic conversion failure.
    fn create(&self, command: &GameCommand) -> Result<Option<NativeCommand>, ConversionError>;
}
