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

//! Readiness notifications published while the host starts up.

use super::TypedEvent;

/// The host root singleton became observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameHubReady {
    /// Detector tick on which the hub was found.
    pub tick: u64,
}

/// Extensions may now run their early initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyModsReady {
    /// Detector tick of the notification.
    pub tick: u64,
}

/// The hub finished its own initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameHubInitialized {
    /// Detector tick of the notification.
    pub tick: u64,
}

/// The simulation root was observed for the first time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseGameDetected {
    /// Detector tick on which the root was found.
    pub tick: u64,
}

/// What caused the detector to declare the game fully loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTrigger {
    /// Both the simulation root and its sub-root were found by polling.
    Polling,
    /// The host reported that a new game was started.
    NewGame,
    /// The host reported that a saved game was continued.
    ContinueGame,
}

/// The game is playable. Published at most once per detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameFullyLoaded {
    /// Detector tick of the notification.
    pub tick: u64,
    /// What triggered the notification.
    pub trigger: LoadTrigger,
}

/// The host never became playable within the polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLoadTimedOut {
    /// Ticks spent waiting for the full load.
    pub waited_ticks: u64,
}

impl TypedEvent for GameHubReady {}
impl TypedEvent for EarlyModsReady {}
impl TypedEvent for GameHubInitialized {}
impl TypedEvent for BaseGameDetected {}
impl TypedEvent for GameFullyLoaded {}
impl TypedEvent for GameLoadTimedOut {}
