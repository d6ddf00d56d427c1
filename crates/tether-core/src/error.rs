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

//! Error taxonomy shared by every layer of the bridge.

use thiserror::Error;

/// A failure reported while talking to a host object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// The requested member does not exist on the host object.
    #[error("member '{member}' not found on {type_name}")]
    MissingMember {
        /// The host type that was probed.
        type_name: String,
        /// The member name that was requested.
        member: String,
    },
    /// A member exists but holds a value of an unexpected shape.
    #[error("member '{member}' is not a {expected}")]
    TypeMismatch {
        /// The member name that was read.
        member: String,
        /// A human-readable name of the expected shape.
        expected: &'static str,
    },
    /// The host call was attempted and raised an error.
    #[error("host call failed: {0}")]
    Invocation(String),
    /// The host received a command and refused it.
    #[error("host rejected command {0}")]
    Rejected(String),
}

/// Errors raised while translating SDK-level values into host-native ones.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// No parameter name matched the expected substring.
    #[error("no parameter matching '{0}'")]
    MissingParameter(&'static str),
    /// A parameter was found but could not be coerced into a number.
    #[error("parameter '{0}' is not numeric")]
    NotNumeric(String),
    /// The wrapper service has no wrapper for the given native type.
    #[error("no wrapper available for native type {0}")]
    NoWrapper(String),
    /// Any other conversion failure, carrying the converter's message.
    #[error("{0}")]
    Other(String),
}

/// The reason a command execution failed.
///
/// Every variant is carried inside a failed [`CommandResult`](crate::CommandResult);
/// none of them is ever raised past the executor boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command failed its own validity check and never reached the host.
    #[error("validation failed")]
    Validation,
    /// The abstract command could not be translated into a native one.
    #[error("{0}")]
    Conversion(String),
    /// The host command router is not observable yet.
    #[error("command bus unavailable")]
    Unavailable,
    /// The host call was attempted and reported or raised a failure.
    #[error("{0}")]
    NativeExecution(String),
}

impl CommandError {
    /// The conversion error used when a factory produced nothing.
    pub fn conversion_failed() -> Self {
        CommandError::Conversion("conversion failed".to_string())
    }

    /// Returns `true` if the host was never contacted for this failure.
    pub fn is_pre_submission(&self) -> bool {
        !matches!(self, CommandError::NativeExecution(_))
    }
}

impl From<ConversionError> for CommandError {
    fn from(error: ConversionError) -> Self {
        CommandError::Conversion(error.to_string())
    }
}

impl From<NativeError> for CommandError {
    fn from(error: NativeError) -> Self {
        CommandError::NativeExecution(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_error_messages() {
        assert_eq!(CommandError::Validation.to_string(), "validation failed");
        assert_eq!(CommandError::Unavailable.to_string(), "command bus unavailable");
        assert_eq!(
            CommandError::conversion_failed().to_string(),
            "conversion failed"
        );
    }

    #[test]
    fn test_conversion_error_keeps_message() {
        let error: CommandError = ConversionError::NotNumeric("Amount".to_string()).into();
        assert_eq!(error, CommandError::Conversion("parameter 'Amount' is not numeric".into()));
        assert!(error.is_pre_submission());
    }

    #[test]
    fn test_native_error_maps_to_execution_failure() {
        let error: CommandError = NativeError::Rejected("ImportResourceCommand".into()).into();
        assert_eq!(
            error.to_string(),
            "host rejected command ImportResourceCommand"
        );
        assert!(!error.is_pre_submission());
    }
}
