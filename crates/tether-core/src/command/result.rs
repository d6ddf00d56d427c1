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

use super::{GameCommand, Parameters};
use crate::error::CommandError;
use crate::utils::timer::duration_to_ms;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The immutable outcome of one command execution.
///
/// Exactly one of "succeeded" and "carries an error" holds: the outcome is a
/// `Result`, so the two cannot diverge.
#[derive(Debug, Clone)]
pub struct CommandResult {
    outcome: Result<(), CommandError>,
    command: Arc<GameCommand>,
    executed_at: Instant,
    execution_time_ms: u64,
    metadata: Parameters,
}

impl CommandResult {
    /// Creates a successful result.
    pub fn succeeded(command: Arc<GameCommand>, execution_time: Duration) -> Self {
        Self::from_outcome(command, Ok(()), execution_time)
    }

    /// Creates a failed result.
    pub fn failed(command: Arc<GameCommand>, error: CommandError, execution_time: Duration) -> Self {
        Self::from_outcome(command, Err(error), execution_time)
    }

    fn from_outcome(
        command: Arc<GameCommand>,
        outcome: Result<(), CommandError>,
        execution_time: Duration,
    ) -> Self {
        Self {
            outcome,
            command,
            executed_at: Instant::now(),
            execution_time_ms: duration_to_ms(execution_time),
            metadata: Parameters::new(),
        }
    }

    /// Attaches a metadata entry. Intended for use before the result is published.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the command succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The failure reason, present iff the command failed.
    pub fn error(&self) -> Option<&CommandError> {
        self.outcome.as_ref().err()
    }

    /// The failure message, present iff the command failed.
    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// The command this result belongs to.
    pub fn command(&self) -> &GameCommand {
        &self.command
    }

    /// A shared reference to the command this result belongs to.
    pub fn shared_command(&self) -> Arc<GameCommand> {
        Arc::clone(&self.command)
    }

    /// When execution finished.
    pub fn executed_at(&self) -> Instant {
        self.executed_at
    }

    /// How long execution took, in whole milliseconds.
    pub fn execution_time_ms(&self) -> u64 {
        self.execution_time_ms
    }

    /// Additional information recorded during execution.
    pub fn metadata(&self) -> &Parameters {
        &self.metadata
    }
}

/// The outcome of a batch of command executions, in execution order.
///
/// All counts are derived from the contained results on demand.
#[derive(Debug, Clone, Default)]
pub struct BatchCommandResult {
    results: Vec<CommandResult>,
}

impl BatchCommandResult {
    /// Wraps a finished set of results.
    pub fn new(results: Vec<CommandResult>) -> Self {
        Self { results }
    }

    /// All results.
    pub fn results(&self) -> &[CommandResult] {
        &self.results
    }

    /// Consumes the batch, returning its results.
    pub fn into_results(self) -> Vec<CommandResult> {
        self.results
    }

    /// Number of results in the batch.
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// Number of successful results.
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of failed results.
    pub fn failure_count(&self) -> usize {
        self.total_count() - self.success_count()
    }

    /// Sum of every result's execution time.
    pub fn total_execution_time_ms(&self) -> u64 {
        self.results
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.execution_time_ms()))
    }

    /// Whether every result succeeded. An empty batch counts as success.
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(CommandResult::is_success)
    }

    /// The first failed result, if any.
    pub fn first_failure(&self) -> Option<&CommandResult> {
        self.results.iter().find(|r| !r.is_success())
    }

    /// Iterates over the results.
    pub fn iter(&self) -> std::slice::Iter<'_, CommandResult> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a BatchCommandResult {
    type Item = &'a CommandResult;
    type IntoIter = std::slice::Iter<'a, CommandResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command() -> Arc<GameCommand> {
        Arc::new(GameCommand::import_resource("WATER", 1000))
    }

    #[test]
    fn test_success_has_no_error() {
        let result = CommandResult::succeeded(command(), Duration::from_millis(3));
        assert!(result.is_success());
        assert!(result.error().is_none());
        assert_eq!(result.execution_time_ms(), 3);
        assert_eq!(result.command().command_type(), "ImportResource");
    }

    #[test]
    fn test_failure_carries_error() {
        let result = CommandResult::failed(command(), CommandError::Unavailable, Duration::ZERO);
        assert!(!result.is_success());
        assert_eq!(result.error_message().as_deref(), Some("command bus unavailable"));
    }

    #[test]
    fn test_metadata_is_recorded() {
        let result = CommandResult::succeeded(command(), Duration::ZERO)
            .with_metadata("native_type", "ImportResourceCommand");
        assert_eq!(result.metadata()["native_type"], json!("ImportResourceCommand"));
    }

    #[test]
    fn test_batch_counts_are_derived() {
        let batch = BatchCommandResult::new(vec![
            CommandResult::succeeded(command(), Duration::from_millis(2)),
            CommandResult::failed(command(), CommandError::Validation, Duration::ZERO),
            CommandResult::succeeded(command(), Duration::from_millis(5)),
        ]);

        assert_eq!(batch.total_count(), 3);
        assert_eq!(batch.success_count(), 2);
        assert_eq!(batch.failure_count(), 1);
        assert_eq!(batch.total_execution_time_ms(), 7);
        assert!(!batch.all_succeeded());
        assert_eq!(
            batch.first_failure().and_then(CommandResult::error),
            Some(&CommandError::Validation)
        );
        assert_eq!(batch.iter().count(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let batch = BatchCommandResult::default();
        assert_eq!(batch.total_count(), 0);
        assert!(batch.all_succeeded());
        assert!(batch.first_failure().is_none());
    }
}
