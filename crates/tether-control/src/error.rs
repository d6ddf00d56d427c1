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

//! Programmer errors raised by the dispatcher.

use thiserror::Error;

/// Misuse of the [`CommandDispatcher`](crate::CommandDispatcher) lifecycle.
///
/// Command failures never appear here; they are carried in the returned
/// [`CommandResult`](tether_core::CommandResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A command was dispatched before `initialize` was called.
    #[error("command dispatcher is not initialized")]
    NotInitialized,
    /// `initialize` was called a second time.
    #[error("command dispatcher is already initialized")]
    AlreadyInitialized,
}
