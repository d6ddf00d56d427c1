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

//! # Tether Infra
//!
//! Concrete implementations of the native capability contracts declared in
//! `tether-core`. Every adapter here reaches the host only through the
//! [`NativeObject`](tether_core::NativeObject) reflection surface.

#![warn(missing_docs)]

pub mod adapter;
pub mod dynamic;
pub mod factory;
pub mod locator;
pub mod router;
pub mod wrapper;

pub use adapter::NativeEventAdapter;
pub use dynamic::{DynamicObject, DynamicObjectBuilder};
pub use factory::NativeCommandFactory;
pub use locator::ProbingLocator;
pub use router::ReflectedRouter;
pub use wrapper::{EntityHandle, HandleWrapperConverter};
