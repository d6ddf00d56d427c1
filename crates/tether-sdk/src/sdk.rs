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

//! The composition root that wires the bridge together.

use crate::commands::Commands;
use crate::config::SdkConfig;
use std::sync::{Arc, Mutex, TryLockError};
use tether_control::{
    CommandDispatcher, DispatchError, EventPublisher, ExecutorConfig, LifecycleDetector,
    LifecycleState, LifecycleWatch, LoadSignal, NativeHook, TickStatus,
};
use tether_core::event::native::tags;
use tether_core::event::{CommandExecuted, CommandFailed, GameHubReady, LoadTrigger};
use tether_core::native::{NativeValue, ObjectLocator, RouterProvider, WrapperConverter};
use tether_core::{CommandFactory, EventBus, NativeHandle, SubscriptionId};
use tether_infra::{HandleWrapperConverter, NativeCommandFactory, ProbingLocator};

/// The host-facing collaborators the SDK runs on.
#[derive(Clone)]
pub struct HostServices {
    /// Finds host singletons for the lifecycle detector.
    pub locator: Arc<dyn ObjectLocator>,
    /// Supplies the host command bus.
    pub routers: Arc<dyn RouterProvider>,
    /// Translates commands into native ones.
    pub factory: Arc<dyn CommandFactory>,
    /// Upgrades native references in events, if auto-conversion is wanted.
    pub converter: Option<Arc<dyn WrapperConverter>>,
}

impl HostServices {
    /// Builds the reflection-backed adapters around a host root object.
    pub fn from_root(root: NativeHandle) -> Self {
        let locator = Arc::new(ProbingLocator::new(root));
        Self {
            locator: locator.clone(),
            routers: locator,
            factory: Arc::new(NativeCommandFactory::new()),
            converter: Some(Arc::new(HandleWrapperConverter::new())),
        }
    }

    /// Replaces the command factory.
    pub fn with_factory(mut self, factory: Arc<dyn CommandFactory>) -> Self {
        self.factory = factory;
        self
    }
}

/// One bridge instance per host process.
///
/// The host calls [`on_frame`](Self::on_frame) once per update and forwards
/// its hook notifications to [`handle_native_event`](Self::handle_native_event),
/// or to a [`NativeHook`] from other threads. Commands become dispatchable
/// once the lifecycle detector has seen the hub.
pub struct Sdk {
    config: SdkConfig,
    bus: Arc<EventBus>,
    publisher: Arc<EventPublisher>,
    dispatcher: Arc<CommandDispatcher>,
    // `None` once the detector has detached.
    detector: Mutex<Option<LifecycleDetector>>,
    lifecycle: LifecycleWatch,
    load_signal: LoadSignal,
    routers: Arc<dyn RouterProvider>,
    factory: Arc<dyn CommandFactory>,
}

impl Sdk {
    /// Wires the bus, publisher, dispatcher and lifecycle detector.
    pub fn new(config: SdkConfig, services: HostServices) -> Self {
        let bus = Arc::new(match services.converter {
            Some(converter) => EventBus::with_converter(converter, config.bus.auto_conversion),
            None => EventBus::new(),
        });
        let publisher = Arc::new(EventPublisher::new(Arc::clone(&bus)));
        let dispatcher = Arc::new(CommandDispatcher::new(Arc::clone(&publisher)));

        {
            let dispatcher = Arc::clone(&dispatcher);
            let routers = Arc::clone(&services.routers);
            let factory = Arc::clone(&services.factory);
            let executor = config.executor.clone();
            bus.subscribe(move |event: &GameHubReady| {
                log::info!("Game hub ready at tick {}; enabling commands.", event.tick);
                initialize_dispatcher(
                    &dispatcher,
                    Arc::clone(&routers),
                    Arc::clone(&factory),
                    executor.clone(),
                );
            });
        }

        let detector = LifecycleDetector::new(
            config.lifecycle.clone(),
            services.locator,
            Arc::clone(&bus),
        );
        let load_signal = detector.load_signal();
        let lifecycle = detector.watch();

        for (tag, trigger) in [
            (tags::NEW_GAME_STARTED, LoadTrigger::NewGame),
            (tags::GAME_CONTINUED, LoadTrigger::ContinueGame),
        ] {
            let signal = load_signal.clone();
            bus.subscribe_named(tag, move |_: &NativeValue| {
                signal.signal(trigger);
            });
        }

        log::info!("Tether SDK initialized.");
        Self {
            config,
            bus,
            publisher,
            dispatcher,
            detector: Mutex::new(Some(detector)),
            lifecycle,
            load_signal,
            routers: services.routers,
            factory: services.factory,
        }
    }

    /// Builds the SDK over a host root with the default adapters.
    pub fn with_host(root: NativeHandle, config: SdkConfig) -> Self {
        Self::new(config, HostServices::from_root(root))
    }

    /// Runs one host frame: delivers queued notifications, then ticks the detector.
    ///
    /// A call made from inside a lifecycle handler delivers notifications but
    /// does not tick the detector again.
    ///
    /// ## Returns
    /// The number of queued notifications delivered.
    pub fn on_frame(&self) -> usize {
        let drained = self.publisher.drain_native_queue();

        let mut detector = match self.detector.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                log::trace!("Lifecycle tick already in progress; skipping.");
                return drained;
            }
        };
        let detached = detector
            .as_mut()
            .is_some_and(|running| running.tick() == TickStatus::Detach);
        if detached {
            log::info!("Lifecycle detector detached in {:?}.", self.lifecycle.get());
            *detector = None;
        }
        drained
    }

    /// Delivers a host notification on the calling thread.
    ///
    /// Load notifications (`NewGameStarted`, `GameContinued`) also signal the
    /// lifecycle detector.
    pub fn handle_native_event(&self, tag: &str, payload: &NativeValue) -> usize {
        self.publisher.publish_native(tag, payload)
    }

    /// Returns a thread-safe sender for host notifications.
    pub fn native_hook(&self) -> NativeHook {
        self.publisher.native_hook()
    }

    /// Reports a load trigger directly.
    pub fn signal_load(&self, trigger: LoadTrigger) {
        self.load_signal.signal(trigger);
    }

    /// Command creation and dispatch.
    pub fn commands(&self) -> Commands<'_> {
        Commands::new(&self.dispatcher)
    }

    /// The event bus extensions subscribe on.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The underlying dispatcher.
    pub fn dispatcher(&self) -> &Arc<CommandDispatcher> {
        &self.dispatcher
    }

    /// The configuration the SDK was built with.
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// Registers a handler for successful commands.
    pub fn on_command_executed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CommandExecuted) + Send + Sync + 'static,
    {
        self.dispatcher.on_command_executed(handler)
    }

    /// Registers a handler for failed commands.
    pub fn on_command_failed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CommandFailed) + Send + Sync + 'static,
    {
        self.dispatcher.on_command_failed(handler)
    }

    /// The detector's current, or final, state.
    ///
    /// Safe to call from event handlers, including during [`on_frame`](Self::on_frame).
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.get()
    }

    /// Enables commands without waiting for the hub, for hosts that are already up.
    pub fn initialize_now(&self) -> Result<(), DispatchError> {
        self.dispatcher.initialize(
            Arc::clone(&self.routers),
            Arc::clone(&self.factory),
            self.config.executor.clone(),
        )
    }
}

impl Drop for Sdk {
    fn drop(&mut self) {
        // Handlers hold the dispatcher, which holds the bus.
        self.bus.clear();
        log::debug!("Tether SDK shut down.");
    }
}

impl std::fmt::Debug for Sdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sdk")
            .field("lifecycle", &self.lifecycle_state())
            .field("dispatcher", &self.dispatcher)
            .field("bus", &self.bus)
            .finish()
    }
}

fn initialize_dispatcher(
    dispatcher: &CommandDispatcher,
    routers: Arc<dyn RouterProvider>,
    factory: Arc<dyn CommandFactory>,
    config: ExecutorConfig,
) {
    if let Err(e) = dispatcher.initialize(routers, factory, config) {
        log::debug!("Skipping dispatcher initialization: {e}");
    }
}
