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

//! # Tether Core
//!
//! Foundational crate containing the command model, typed events, the event
//! bus, and the capability contracts used to talk to the host process.

#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod event;
pub mod native;
pub mod utils;

pub use command::{BatchCommandResult, CommandFactory, CommandKind, CommandResult, GameCommand};
pub use error::{CommandError, ConversionError, NativeError};
pub use event::{EventBus, SubscriptionId, TypedEvent};
pub use native::{NativeHandle, NativeObject, NativeValue};
pub use utils::timer::Stopwatch;
