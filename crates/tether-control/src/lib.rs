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

//! # Tether Control
//!
//! The runtime half of the bridge: executes commands against the host,
//! publishes their outcome, forwards host notifications as typed events and
//! detects when the host has finished loading.

#![warn(missing_docs)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod publisher;

pub use config::{BusConfig, ExecutorConfig, LifecycleConfig};
pub use dispatcher::{BatchMode, CommandDispatcher};
pub use error::DispatchError;
pub use executor::{CommandExecutor, ExecutorStatistics};
pub use lifecycle::{
    LifecycleDetector, LifecycleState, LifecycleTransition, LifecycleWatch, LoadSignal,
    TickStatus,
};
pub use publisher::{EventPublisher, NativeHook};
