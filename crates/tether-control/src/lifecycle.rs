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

//! Frame-driven detection of the host's startup phases.

use crate::config::LifecycleConfig;
use std::sync::{Arc, PoisonError, RwLock};
use tether_core::event::{
    BaseGameDetected, EarlyModsReady, GameFullyLoaded, GameHubInitialized, GameHubReady,
    GameLoadTimedOut, LoadTrigger,
};
use tether_core::native::{get_member, ObjectLocator};
use tether_core::{EventBus, TypedEvent};

/// The phase the detector believes the host is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    /// The hub singleton has not been seen yet.
    #[default]
    WaitingForHub,
    /// The hub is up; early initialisation is being announced.
    WaitingForBaseGame,
    /// Waiting for a playable simulation.
    WaitingForFullLoad,
    /// The game is fully loaded.
    Done,
    /// The full-load budget ran out.
    TimedOut,
}

impl LifecycleState {
    /// Whether the detector has stopped.
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Done | LifecycleState::TimedOut)
    }

    /// Transitions only move forward; no state is revisited.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (WaitingForHub, WaitingForBaseGame)
                | (WaitingForBaseGame, WaitingForFullLoad)
                | (WaitingForFullLoad, Done)
                | (WaitingForFullLoad, TimedOut)
        )
    }
}

/// Tells the tick source whether to keep calling the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Call again next frame.
    Continue,
    /// The detector is finished; stop ticking it.
    Detach,
}

/// One recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTransition {
    /// State before the change.
    pub from: LifecycleState,
    /// State after the change.
    pub to: LifecycleState,
    /// Detector tick of the change.
    pub tick: u64,
}

/// A cloneable handle used to report host load notifications.
///
/// Safe to use from any thread; signals are consumed by the detector's tick.
#[derive(Debug, Clone)]
pub struct LoadSignal {
    sender: flume::Sender<LoadTrigger>,
}

impl LoadSignal {
    /// Reports a load trigger. Returns `false` if the detector is gone.
    pub fn signal(&self, trigger: LoadTrigger) -> bool {
        self.sender.send(trigger).is_ok()
    }
}

/// A cloneable read-only view of a detector's state.
///
/// Reading it never waits on a tick in progress, so event handlers may query
/// it while the detector is publishing.
#[derive(Debug, Clone, Default)]
pub struct LifecycleWatch {
    state: Arc<RwLock<LifecycleState>>,
}

impl LifecycleWatch {
    /// The detector's latest state.
    pub fn get(&self) -> LifecycleState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set(&self, state: LifecycleState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// A state machine that follows the host from launch to a playable game.
///
/// The detector is driven by [`tick`](Self::tick), called once per host
/// frame. Ticks are counted from the detector's creation. The hub is looked
/// up on every tick and its wait is unbounded. Full-load polling happens only
/// on ticks divisible by the poll interval and gives up after
/// `max_full_load_ticks` ticks, counted from entering
/// [`LifecycleState::WaitingForFullLoad`].
///
/// [`GameFullyLoaded`] is published at most once, whichever of polling or a
/// [`LoadSignal`] gets there first. [`BaseGameDetected`] is published once
/// before it on either path.
///
/// Each state change is recorded before the events announcing it are
/// published, so handlers observe the new state.
pub struct LifecycleDetector {
    config: LifecycleConfig,
    locator: Arc<dyn ObjectLocator>,
    bus: Arc<EventBus>,
    state: LifecycleState,
    watch: LifecycleWatch,
    ticks: u64,
    full_load_entered_at: u64,
    base_game_seen: bool,
    fully_loaded_published: bool,
    transitions: Vec<LifecycleTransition>,
    signal_tx: flume::Sender<LoadTrigger>,
    signal_rx: flume::Receiver<LoadTrigger>,
}

impl LifecycleDetector {
    /// Creates a detector in [`LifecycleState::WaitingForHub`].
    pub fn new(
        config: LifecycleConfig,
        locator: Arc<dyn ObjectLocator>,
        bus: Arc<EventBus>,
    ) -> Self {
        let (signal_tx, signal_rx) = flume::unbounded();
        Self {
            config,
            locator,
            bus,
            state: LifecycleState::default(),
            watch: LifecycleWatch::default(),
            ticks: 0,
            full_load_entered_at: 0,
            base_game_seen: false,
            fully_loaded_published: false,
            transitions: Vec::new(),
            signal_tx,
            signal_rx,
        }
    }

    /// The current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns a view of the state that stays valid after the detector is dropped.
    pub fn watch(&self) -> LifecycleWatch {
        self.watch.clone()
    }

    /// Number of non-terminal ticks processed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Every state change so far, oldest first.
    pub fn transitions(&self) -> &[LifecycleTransition] {
        &self.transitions
    }

    /// Whether [`GameFullyLoaded`] has been published.
    pub fn has_fully_loaded(&self) -> bool {
        self.fully_loaded_published
    }

    /// Returns a handle host notifications can signal through.
    pub fn load_signal(&self) -> LoadSignal {
        LoadSignal {
            sender: self.signal_tx.clone(),
        }
    }

    /// Reports a load trigger, to be consumed on the next full-load tick.
    pub fn signal(&self, trigger: LoadTrigger) {
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.signal_tx.send(trigger);
    }

    /// Advances the state machine by one frame.
    pub fn tick(&mut self) -> TickStatus {
        if self.state.is_terminal() {
            return TickStatus::Detach;
        }
        self.ticks += 1;
        let tick = self.ticks;

        match self.state {
            LifecycleState::WaitingForHub => self.poll_hub(tick),
            LifecycleState::WaitingForFullLoad => self.poll_full_load(tick),
            // Left within the tick that enters it; terminal states returned above.
            LifecycleState::WaitingForBaseGame
            | LifecycleState::Done
            | LifecycleState::TimedOut => {}
        }

        if self.state.is_terminal() {
            TickStatus::Detach
        } else {
            TickStatus::Continue
        }
    }

    fn poll_hub(&mut self, tick: u64) {
        if self.locator.try_get_singleton(&self.config.hub_singleton).is_none() {
            return;
        }
        self.transition(LifecycleState::WaitingForBaseGame, tick);
        self.publish(GameHubReady { tick });
        self.publish(EarlyModsReady { tick });

        self.full_load_entered_at = tick;
        self.transition(LifecycleState::WaitingForFullLoad, tick);
        self.publish(GameHubInitialized { tick });
    }

    fn poll_full_load(&mut self, tick: u64) {
        let signalled = self.signal_rx.try_iter().fold(None, |first, t| first.or(Some(t)));
        if let Some(trigger) = signalled {
            self.detect_base_game(tick);
            self.finish(tick, trigger);
            return;
        }

        if tick % self.config.poll_interval_ticks.max(1) == 0 && self.simulation_ready(tick) {
            self.finish(tick, LoadTrigger::Polling);
            return;
        }

        let waited = tick - self.full_load_entered_at;
        if waited >= self.config.max_full_load_ticks {
            log::warn!("Game did not finish loading after {waited} ticks; giving up.");
            self.transition(LifecycleState::TimedOut, tick);
            self.publish(GameLoadTimedOut {
                waited_ticks: waited,
            });
        }
    }

    /// Checks for the simulation root and its sub-root.
    fn simulation_ready(&mut self, tick: u64) -> bool {
        let Some(root) = self.locator.try_get_singleton(&self.config.simulation_root) else {
            return false;
        };
        self.detect_base_game(tick);
        get_member(&root, &self.config.sub_root_member).is_some()
    }

    fn detect_base_game(&mut self, tick: u64) {
        if !self.base_game_seen {
            self.base_game_seen = true;
            self.publish(BaseGameDetected { tick });
        }
    }

    fn finish(&mut self, tick: u64, trigger: LoadTrigger) {
        self.transition(LifecycleState::Done, tick);
        if !self.fully_loaded_published {
            self.fully_loaded_published = true;
            log::info!("Game fully loaded at tick {tick} ({trigger:?}).");
            self.publish(GameFullyLoaded { tick, trigger });
        }
    }

    fn transition(&mut self, next: LifecycleState, tick: u64) {
        if !self.state.can_transition_to(next) {
            log::warn!("Lifecycle: invalid transition {:?} → {:?}", self.state, next);
            return;
        }
        log::info!("Lifecycle: {:?} → {:?} (tick {tick})", self.state, next);
        self.transitions.push(LifecycleTransition {
            from: self.state,
            to: next,
            tick,
        });
        self.state = next;
        self.watch.set(next);
    }

    fn publish<T: TypedEvent>(&self, event: T) {
        self.bus.publish(event);
    }
}

impl std::fmt::Debug for LifecycleDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleDetector")
            .field("state", &self.state)
            .field("ticks", &self.ticks)
            .field("config", &self.config)
            .finish()
    }
}
