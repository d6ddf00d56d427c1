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

//! Validated, timed, panic-isolated execution of commands against the host.

use crate::config::ExecutorConfig;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tether_core::native::RouterProvider;
use tether_core::utils::panic::panic_message;
use tether_core::{
    BatchCommandResult, CommandError, CommandFactory, CommandResult, GameCommand, Stopwatch,
};
use tokio::sync::Semaphore;

/// Counters over every command this executor has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutorStatistics {
    /// Commands executed, successful or not.
    pub executed: u64,
    /// Commands that succeeded.
    pub succeeded: u64,
    /// Commands that failed.
    pub failed: u64,
    /// Sum of the execution times of all commands.
    pub total_execution_time_ms: u64,
}

#[derive(Debug, Default)]
struct Counters {
    executed: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    total_execution_time_ms: AtomicU64,
}

impl Counters {
    fn record(&self, result: &CommandResult) {
        self.executed.fetch_add(1, Ordering::Relaxed);
        let outcome = if result.is_success() {
            &self.succeeded
        } else {
            &self.failed
        };
        outcome.fetch_add(1, Ordering::Relaxed);
        self.total_execution_time_ms
            .fetch_add(result.execution_time_ms(), Ordering::Relaxed);
    }

    fn snapshot(&self) -> ExecutorStatistics {
        ExecutorStatistics {
            executed: self.executed.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            total_execution_time_ms: self.total_execution_time_ms.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.executed.store(0, Ordering::Relaxed);
        self.succeeded.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.total_execution_time_ms.store(0, Ordering::Relaxed);
    }
}

struct ExecutorInner {
    routers: Arc<dyn RouterProvider>,
    factory: Arc<dyn CommandFactory>,
    config: ExecutorConfig,
    counters: Counters,
}

/// Runs commands through validation, native conversion and submission.
///
/// `execute` never panics and never returns an error: every failure,
/// including a panic inside the factory or the router, becomes a failed
/// [`CommandResult`]. The executor is cheap to clone; clones share the
/// same collaborators and statistics.
///
/// The host command bus is not documented as thread-safe. The async and
/// parallel entry points move execution onto other threads, so callers that
/// use them accept the risk of racing on host state.
#[derive(Clone)]
pub struct CommandExecutor {
    inner: Arc<ExecutorInner>,
}

impl CommandExecutor {
    /// Creates an executor over the given router source and factory.
    pub fn new(
        routers: Arc<dyn RouterProvider>,
        factory: Arc<dyn CommandFactory>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                routers,
                factory,
                config,
                counters: Counters::default(),
            }),
        }
    }

    /// The configuration this executor was built with.
    pub fn config(&self) -> &ExecutorConfig {
        &self.inner.config
    }

    /// Executes one command on the calling thread.
    ///
    /// An invalid command fails with `validation failed` and a zero
    /// execution time; nothing is sent to the host. Otherwise the execution
    /// time covers conversion, router lookup and submission.
    pub fn execute(&self, command: impl Into<Arc<GameCommand>>) -> CommandResult {
        let command = command.into();

        let result = if !command.is_valid() {
            log::debug!("Rejected invalid command {command}");
            CommandResult::failed(Arc::clone(&command), CommandError::Validation, Duration::ZERO)
        } else {
            let stopwatch = Stopwatch::new();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.submit(&command)))
                .unwrap_or_else(|payload| {
                    Err(CommandError::NativeExecution(panic_message(payload.as_ref())))
                });
            let elapsed = stopwatch.elapsed();

            match outcome {
                Ok(native_type) => {
                    log::debug!("Executed {command} as {native_type} in {elapsed:?}");
                    CommandResult::succeeded(Arc::clone(&command), elapsed)
                        .with_metadata("native_type", native_type)
                }
                Err(error) => {
                    log::debug!("Command {command} failed: {error}");
                    CommandResult::failed(Arc::clone(&command), error, elapsed)
                }
            }
        };

        let result = result
            .with_metadata("command_id", command.id().to_string())
            .with_metadata("command_type", command.command_type());
        self.inner.counters.record(&result);
        result
    }

    /// Executes one command on the blocking thread pool.
    pub async fn execute_async(&self, command: impl Into<Arc<GameCommand>>) -> CommandResult {
        let command = command.into();
        let executor = self.clone();
        let task_command = Arc::clone(&command);

        match tokio::task::spawn_blocking(move || executor.execute(task_command)).await {
            Ok(result) => result,
            Err(e) => self.worker_lost(command, e.to_string()),
        }
    }

    /// Executes every command in order, continuing after failures.
    pub fn execute_batch<I>(&self, commands: I) -> BatchCommandResult
    where
        I: IntoIterator,
        I::Item: Into<Arc<GameCommand>>,
    {
        BatchCommandResult::new(commands.into_iter().map(|c| self.execute(c)).collect())
    }

    /// Executes commands in order, stopping after the first failure.
    ///
    /// Commands already executed before the failure are not undone.
    pub fn execute_batch_stop_on_failure<I>(&self, commands: I) -> BatchCommandResult
    where
        I: IntoIterator,
        I::Item: Into<Arc<GameCommand>>,
    {
        let mut results = Vec::new();
        for command in commands {
            let result = self.execute(command);
            let failed = !result.is_success();
            results.push(result);
            if failed {
                break;
            }
        }
        BatchCommandResult::new(results)
    }

    /// Executes commands concurrently, at most `max_concurrency` at a time.
    ///
    /// A `max_concurrency` of zero is treated as one. Results are returned
    /// in input order regardless of completion order. Commands that mutate
    /// the same host state may race.
    pub async fn execute_batch_parallel<I>(
        &self,
        commands: I,
        max_concurrency: usize,
    ) -> BatchCommandResult
    where
        I: IntoIterator,
        I::Item: Into<Arc<GameCommand>>,
    {
        let permits = Arc::new(Semaphore::new(max_concurrency.max(1)));

        let tasks: Vec<_> = commands
            .into_iter()
            .map(|command| {
                let command: Arc<GameCommand> = command.into();
                let executor = self.clone();
                let permits = Arc::clone(&permits);
                let task_command = Arc::clone(&command);

                let task = tokio::spawn(async move {
                    // Acquired inside the task so the permit lives as long as the work.
                    let _permit = match permits.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => return executor.worker_lost(task_command, e.to_string()),
                    };
                    executor.execute_async(task_command).await
                });
                (command, task)
            })
            .collect();

        let mut results = Vec::with_capacity(tasks.len());
        for (command, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => self.worker_lost(command, e.to_string()),
            };
            results.push(result);
        }
        BatchCommandResult::new(results)
    }

    /// Returns a snapshot of the execution counters.
    pub fn statistics(&self) -> ExecutorStatistics {
        self.inner.counters.snapshot()
    }

    /// Resets the execution counters to zero.
    pub fn reset_statistics(&self) {
        self.inner.counters.reset();
    }

    /// Steps 2 to 4: conversion, router lookup and submission.
    ///
    /// A panicking factory is a conversion failure; the host is never contacted.
    fn submit(&self, command: &GameCommand) -> Result<String, CommandError> {
        let created = panic::catch_unwind(AssertUnwindSafe(|| self.inner.factory.create(command)))
            .map_err(|payload| CommandError::Conversion(panic_message(payload.as_ref())))?;
        let native = created?.ok_or_else(CommandError::conversion_failed)?;

        let router = self.inner.routers.router().ok_or(CommandError::Unavailable)?;

        let native_type = native.native_type().to_string();
        router.submit(native)?;
        Ok(native_type)
    }

    fn worker_lost(&self, command: Arc<GameCommand>, reason: String) -> CommandResult {
        log::error!("Worker executing {command} was lost: {reason}");
        let result = CommandResult::failed(
            Arc::clone(&command),
            CommandError::NativeExecution(reason),
            Duration::ZERO,
        )
        .with_metadata("command_id", command.id().to_string())
        .with_metadata("command_type", command.command_type());
        self.inner.counters.record(&result);
        result
    }
}

impl std::fmt::Debug for CommandExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandExecutor")
            .field("config", &self.inner.config)
            .field("statistics", &self.statistics())
            .finish()
    }
}
