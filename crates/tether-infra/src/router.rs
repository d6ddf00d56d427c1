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

//! Command submission through a reflected host member.

use std::sync::Arc;
use tether_core::native::{CommandRouter, NativeCommand, NativeValue};
use tether_core::{NativeError, NativeHandle};

/// Member invoked on the host's command bus when none is configured.
pub const DEFAULT_SUBMIT_MEMBER: &str = "ExecuteCommand";

/// A [`CommandRouter`] that calls a submit method on the host's command bus.
///
/// The command is passed as the single argument. A `false` reply is a host
/// rejection; any other reply, including `Null`, counts as accepted.
#[derive(Debug, Clone)]
pub struct ReflectedRouter {
    handle: NativeHandle,
    submit_member: String,
}

impl ReflectedRouter {
    /// Creates a router over the given command bus handle.
    pub fn new(handle: NativeHandle) -> Self {
        Self::with_member(handle, DEFAULT_SUBMIT_MEMBER)
    }

    /// Creates a router that calls a custom submit member.
    pub fn with_member(handle: NativeHandle, submit_member: impl Into<String>) -> Self {
        Self {
            handle,
            submit_member: submit_member.into(),
        }
    }

    /// The command bus handle this router submits to.
    pub fn handle(&self) -> &NativeHandle {
        &self.handle
    }
}

impl CommandRouter for ReflectedRouter {
    fn submit(&self, command: NativeCommand) -> Result<(), NativeError> {
        let native_type = command.native_type().to_string();
        let argument = NativeValue::Object(Arc::new(command));

        match self.handle.invoke(&self.submit_member, &[argument])? {
            NativeValue::Bool(false) => {
                log::warn!("Host rejected {native_type}");
                Err(NativeError::Rejected(native_type))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicObject;
    use std::sync::Mutex;
    use tether_core::NativeObject;

    fn command_bus(reply: NativeValue, seen: Arc<Mutex<Vec<String>>>) -> NativeHandle {
        DynamicObject::builder("CommandBus")
            .method(DEFAULT_SUBMIT_MEMBER, move |args: &[NativeValue]| {
                let command = args[0].as_object().unwrap();
                seen.lock().unwrap().push(command.type_name().to_string());
                Ok(reply.clone())
            })
            .build()
    }

    #[test]
    fn test_submit_passes_command_object() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let router = ReflectedRouter::new(command_bus(NativeValue::Null, seen.clone()));

        router.submit(NativeCommand::new("UnlockBuildingCommand")).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["UnlockBuildingCommand"]);
    }

    #[test]
    fn test_false_reply_is_rejection() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let router = ReflectedRouter::new(command_bus(NativeValue::Bool(false), seen));

        let err = router.submit(NativeCommand::new("SetGameSpeedCommand")).unwrap_err();
        assert_eq!(err, NativeError::Rejected("SetGameSpeedCommand".into()));
    }

    #[test]
    fn test_missing_submit_member() {
        let router = ReflectedRouter::with_member(DynamicObject::new("CommandBus"), "Enqueue");
        let err = router.submit(NativeCommand::new("X")).unwrap_err();
        assert!(matches!(err, NativeError::MissingMember { member, .. } if member == "Enqueue"));
    }
}
