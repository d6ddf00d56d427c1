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

//! The single entry point that executes commands and announces their outcome.

use crate::config::ExecutorConfig;
use crate::error::DispatchError;
use crate::executor::{CommandExecutor, ExecutorStatistics};
use crate::publisher::EventPublisher;
use std::sync::{Arc, OnceLock};
use tether_core::event::{CommandExecuted, CommandFailed};
use tether_core::native::RouterProvider;
use tether_core::{
    BatchCommandResult, CommandFactory, CommandResult, GameCommand, SubscriptionId,
};

/// How a dispatched batch reacts to a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Run every command regardless of earlier failures.
    #[default]
    Continue,
    /// Stop after the first failure. Earlier successes are not undone.
    StopOnFailure,
}

/// Executes commands and publishes exactly one outcome event per command.
///
/// The dispatcher has a two-phase lifecycle. It is created with its
/// publisher, so outcome handlers may be registered right away, and becomes
/// usable once [`initialize`](Self::initialize) has provided the host
/// collaborators. Dispatching earlier is a programming error reported as
/// [`DispatchError::NotInitialized`].
#[derive(Debug)]
pub struct CommandDispatcher {
    publisher: Arc<EventPublisher>,
    executor: OnceLock<CommandExecutor>,
}

impl CommandDispatcher {
    /// Creates an uninitialised dispatcher.
    pub fn new(publisher: Arc<EventPublisher>) -> Self {
        Self {
            publisher,
            executor: OnceLock::new(),
        }
    }

    /// Builds the executor. Succeeds exactly once.
    pub fn initialize(
        &self,
        routers: Arc<dyn RouterProvider>,
        factory: Arc<dyn CommandFactory>,
        config: ExecutorConfig,
    ) -> Result<(), DispatchError> {
        self.executor
            .set(CommandExecutor::new(routers, factory, config))
            .map_err(|_| DispatchError::AlreadyInitialized)?;
        log::info!("Command dispatcher initialized.");
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.executor.get().is_some()
    }

    /// The publisher outcome events go through.
    pub fn publisher(&self) -> &Arc<EventPublisher> {
        &self.publisher
    }

    /// Executes a command on the calling thread and publishes its outcome.
    pub fn dispatch(
        &self,
        command: impl Into<Arc<GameCommand>>,
    ) -> Result<CommandResult, DispatchError> {
        let executor = self.executor()?;
        let command = command.into();
        log::debug!("Dispatching {command}");
        let result = executor.execute(command);
        self.announce(&result);
        Ok(result)
    }

    /// Executes commands in order and publishes each outcome as it happens.
    pub fn dispatch_batch<I>(
        &self,
        commands: I,
        mode: BatchMode,
    ) -> Result<BatchCommandResult, DispatchError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<GameCommand>>,
    {
        let executor = self.executor()?;
        let mut results = Vec::new();
        for command in commands {
            let result = executor.execute(command);
            self.announce(&result);
            let stop = mode == BatchMode::StopOnFailure && !result.is_success();
            results.push(result);
            if stop {
                log::debug!("Batch stopped after {} command(s).", results.len());
                break;
            }
        }
        Ok(BatchCommandResult::new(results))
    }

    /// Executes a command on the blocking pool and publishes its outcome.
    ///
    /// The outcome is published from the awaiting task, not the pool thread.
    pub async fn dispatch_async(
        &self,
        command: impl Into<Arc<GameCommand>>,
    ) -> Result<CommandResult, DispatchError> {
        let executor = self.executor()?;
        let result = executor.execute_async(command).await;
        self.announce(&result);
        Ok(result)
    }

    /// Executes commands concurrently and publishes their outcomes in input order.
    ///
    /// `max_concurrency` falls back to the configured default. The caller
    /// accepts that commands touching the same host state may race.
    pub async fn dispatch_parallel<I>(
        &self,
        commands: I,
        max_concurrency: Option<usize>,
    ) -> Result<BatchCommandResult, DispatchError>
    where
        I: IntoIterator,
        I::Item: Into<Arc<GameCommand>>,
    {
        let executor = self.executor()?;
        let limit = max_concurrency.unwrap_or(executor.config().default_max_concurrency);
        let batch = executor.execute_batch_parallel(commands, limit).await;
        for result in &batch {
            self.announce(result);
        }
        Ok(batch)
    }

    /// Registers a handler for successful commands.
    pub fn on_command_executed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CommandExecuted) + Send + Sync + 'static,
    {
        self.publisher.bus().subscribe(handler)
    }

    /// Registers a handler for failed commands.
    pub fn on_command_failed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&CommandFailed) + Send + Sync + 'static,
    {
        self.publisher.bus().subscribe(handler)
    }

    /// Execution counters, or `None` before initialisation.
    pub fn statistics(&self) -> Option<ExecutorStatistics> {
        self.executor.get().map(CommandExecutor::statistics)
    }

    fn executor(&self) -> Result<&CommandExecutor, DispatchError> {
        self.executor.get().ok_or(DispatchError::NotInitialized)
    }

    fn announce(&self, result: &CommandResult) {
        match result.error() {
            None => {
                self.publisher.publish(CommandExecuted {
                    result: result.clone(),
                });
            }
            Some(error) => {
                self.publisher.publish(CommandFailed {
                    result: result.clone(),
                    error: error.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::tests::{FakeRouter, FixedRouters};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tether_core::{CommandError, EventBus};
    use tether_infra::NativeCommandFactory;

    struct Fixture {
        dispatcher: CommandDispatcher,
        executed: Arc<AtomicUsize>,
        failures: Arc<Mutex<Vec<CommandError>>>,
    }

    fn fixture(router: Option<Arc<FakeRouter>>) -> Fixture {
        let publisher = Arc::new(EventPublisher::new(Arc::new(EventBus::new())));
        let dispatcher = CommandDispatcher::new(publisher);

        let executed = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&executed);
        dispatcher.on_command_executed(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&failures);
        dispatcher.on_command_failed(move |event| sink.lock().unwrap().push(event.error.clone()));

        dispatcher
            .initialize(
                Arc::new(FixedRouters(router)),
                Arc::new(NativeCommandFactory::new()),
                ExecutorConfig::default(),
            )
            .unwrap();

        Fixture {
            dispatcher,
            executed,
            failures,
        }
    }

    #[test]
    fn test_dispatch_before_initialize_fails_fast() {
        let publisher = Arc::new(EventPublisher::new(Arc::new(EventBus::new())));
        let dispatcher = CommandDispatcher::new(publisher);

        assert!(!dispatcher.is_initialized());
        assert_eq!(
            dispatcher.dispatch(GameCommand::unlock_building("A")).unwrap_err(),
            DispatchError::NotInitialized
        );
        assert!(dispatcher.statistics().is_none());
    }

    #[test]
    fn test_initialize_only_once() {
        let Fixture { dispatcher, .. } = fixture(None);
        let again = dispatcher.initialize(
            Arc::new(FixedRouters(None)),
            Arc::new(NativeCommandFactory::new()),
            ExecutorConfig::default(),
        );
        assert_eq!(again, Err(DispatchError::AlreadyInitialized));
    }

    #[test]
    fn test_each_dispatch_publishes_one_outcome() {
        let fx = fixture(Some(Arc::new(FakeRouter::default())));

        let ok = fx.dispatcher.dispatch(GameCommand::unlock_building("A")).unwrap();
        let bad = fx.dispatcher.dispatch(GameCommand::unlock_building("")).unwrap();

        assert!(ok.is_success());
        assert!(!bad.is_success());
        assert_eq!(fx.executed.load(Ordering::SeqCst), 1);
        assert_eq!(*fx.failures.lock().unwrap(), vec![CommandError::Validation]);
    }

    #[test]
    fn test_panicking_handler_does_not_affect_dispatch() {
        let fx = fixture(Some(Arc::new(FakeRouter::default())));
        fx.dispatcher.on_command_executed(|_| panic!("extension bug"));

        let result = fx.dispatcher.dispatch(GameCommand::unlock_building("A")).unwrap();
        assert!(result.is_success());
        assert_eq!(fx.executed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_batch_modes() {
        let fx = fixture(Some(Arc::new(FakeRouter::default())));
        let commands = || {
            vec![
                GameCommand::unlock_building("A"),
                GameCommand::unlock_building(""),
                GameCommand::unlock_building("C"),
            ]
        };

        let all = fx.dispatcher.dispatch_batch(commands(), BatchMode::Continue).unwrap();
        assert_eq!(all.total_count(), 3);

        let stopped = fx
            .dispatcher
            .dispatch_batch(commands(), BatchMode::StopOnFailure)
            .unwrap();
        assert_eq!(stopped.total_count(), 2);

        assert_eq!(fx.executed.load(Ordering::SeqCst), 3);
        assert_eq!(fx.failures.lock().unwrap().len(), 2);
        assert_eq!(fx.dispatcher.statistics().unwrap().executed, 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_and_parallel_publish_outcomes() {
        let fx = fixture(Some(Arc::new(FakeRouter::default())));

        let result = fx
            .dispatcher
            .dispatch_async(GameCommand::research_technology("Fusion"))
            .await
            .unwrap();
        assert!(result.is_success());

        let batch = fx
            .dispatcher
            .dispatch_parallel(
                (0..4).map(|i| GameCommand::unlock_building(format!("B-{i}"))),
                Some(2),
            )
            .await
            .unwrap();
        assert_eq!(batch.success_count(), 4);
        assert_eq!(fx.executed.load(Ordering::SeqCst), 5);
    }
}
