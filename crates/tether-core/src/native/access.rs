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

use super::{NativeHandle, NativeValue};
use crate::utils::panic::panic_message;
use std::panic::{self, AssertUnwindSafe};

/// Reads a member from a host object, trying the field first and then the property.
///
/// `Null` values count as absent. A panic raised by the host accessor is caught
/// and also treated as "member absent": lookups never fail loudly.
pub fn get_member(handle: &NativeHandle, name: &str) -> Option<NativeValue> {
    let lookup = panic::catch_unwind(AssertUnwindSafe(|| {
        handle
            .field(name)
            .filter(|value| !value.is_null())
            .or_else(|| handle.property(name).filter(|value| !value.is_null()))
    }));

    match lookup {
        Ok(value) => value,
        Err(payload) => {
            log::debug!(
                "Lookup of '{}' on {} panicked: {}",
                name,
                handle.type_name(),
                panic_message(payload.as_ref())
            );
            None
        }
    }
}

/// Invokes a member on a host object, returning `None` on any failure.
pub fn invoke(handle: &NativeHandle, member: &str, args: &[NativeValue]) -> Option<NativeValue> {
    match panic::catch_unwind(AssertUnwindSafe(|| handle.invoke(member, args))) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            log::debug!("Invocation of {}.{} failed: {e}", handle.type_name(), member);
            None
        }
        Err(payload) => {
            log::debug!(
                "Invocation of {}.{} panicked: {}",
                handle.type_name(),
                member,
                panic_message(payload.as_ref())
            );
            None
        }
    }
}
