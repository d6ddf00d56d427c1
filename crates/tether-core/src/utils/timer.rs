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

//! Wall-clock timing helpers.

use std::time::{Duration, Instant};

/// A started timer used to measure how long an operation took.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Creates a stopwatch and starts it immediately.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the instant the stopwatch was started at.
    pub fn started_at(&self) -> Instant {
        self.start
    }

    /// Returns the elapsed time since the stopwatch was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time in whole milliseconds, saturating at `u64::MAX`.
    pub fn elapsed_ms(&self) -> u64 {
        duration_to_ms(self.elapsed())
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a duration into whole milliseconds, saturating at `u64::MAX`.
pub fn duration_to_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_elapsed_grows() {
        let stopwatch = Stopwatch::new();
        thread::sleep(Duration::from_millis(5));
        assert!(stopwatch.elapsed_ms() >= 5);
        assert!(stopwatch.started_at() <= Instant::now());
    }

    #[test]
    fn test_duration_to_ms_truncates() {
        assert_eq!(duration_to_ms(Duration::from_micros(1_999)), 1);
        assert_eq!(duration_to_ms(Duration::ZERO), 0);
    }
}
