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

use std::sync::{Arc, Mutex};
use tether_core::event::native::tags;
use tether_core::event::{BuildingSpawned, NativeEvent};
use tether_core::native::{get_member, NativeCommand, NativeValue, ObjectLocator, RouterProvider};
use tether_core::{CommandFactory, EventBus, GameCommand, NativeHandle, NativeObject};
use tether_infra::{
    DynamicObject, EntityHandle, HandleWrapperConverter, NativeCommandFactory, NativeEventAdapter,
    ProbingLocator,
};

/// A host whose command bus records the native type and arguments it receives.
fn recording_host() -> (Arc<DynamicObject>, Arc<Mutex<Vec<(String, Vec<String>)>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let bus = DynamicObject::builder("CommandBus")
        .method("ExecuteCommand", move |args: &[NativeValue]| {
            let command = args[0]
                .as_object()
                .and_then(|o| o.as_any().downcast_ref::<NativeCommand>())
                .expect("router should pass a NativeCommand");
            let names: Vec<String> = command
                .arguments()
                .iter()
                .map(|(name, _)| name.clone())
                .collect();
            sink.lock()
                .unwrap()
                .push((command.native_type().to_string(), names));
            Ok(NativeValue::Bool(true))
        })
        .build();

    let host = DynamicObject::builder("Host")
        .field("CommandBus", NativeValue::Object(bus))
        .build();
    (host, received)
}

#[test]
fn test_command_travels_from_factory_to_host() {
    // --- 1. ARRANGE ---
    let (host, received) = recording_host();
    let locator = ProbingLocator::new(host);
    let factory = NativeCommandFactory::new();
    let command = GameCommand::import_resource("WATER", 1000);

    // --- 2. ACT ---
    let native = factory.create(&command).unwrap().unwrap();
    let router = locator.router().expect("command bus should be located");
    router.submit(native).unwrap();

    // --- 3. ASSERT ---
    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "ImportResourceCommand");
    assert_eq!(received[0].1, vec!["resource", "amount"]);
}

#[test]
fn test_host_event_becomes_wrapped_typed_event() {
    // --- 1. ARRANGE ---
    let bus = EventBus::with_converter(Arc::new(HandleWrapperConverter::new()), true);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe(move |event: &BuildingSpawned| sink.lock().unwrap().push(event.clone()));

    let building = DynamicObject::builder("Building")
        .field("Id", "B-42")
        .field("BuildingType", "Farm")
        .build();

    // --- 2. ACT ---
    let event = NativeEventAdapter::new()
        .convert(tags::BUILDING_SPAWNED, &NativeValue::Object(building))
        .expect("BuildingSpawned has a typed event");
    assert!(matches!(event, NativeEvent::BuildingSpawned(_)));
    let delivered = event.publish_to(&bus);

    // --- 3. ASSERT ---
    assert_eq!(delivered, 1);
    let seen = seen.lock().unwrap();
    let wrapper = seen[0]
        .entity
        .wrapper_as::<EntityHandle>()
        .expect("building should be upgraded to an EntityHandle");
    assert_eq!(wrapper.id().as_deref(), Some("B-42"));
    assert_eq!(seen[0].building_type, "Farm");
}

#[test]
fn test_locator_sees_late_singletons() {
    let host = DynamicObject::new("Host");
    let locator = ProbingLocator::new(host.clone());
    assert!(locator.try_get_singleton("Universe").is_none());

    let planet = DynamicObject::new("Planet");
    let universe = DynamicObject::builder("Universe")
        .property("CurrentPlanet", NativeValue::Object(planet))
        .build();
    host.set_field("_universe", NativeValue::Object(universe));

    let universe: NativeHandle = locator.try_get_singleton("Universe").unwrap();
    let planet = get_member(&universe, "CurrentPlanet").and_then(|v| v.as_object().cloned());
    assert_eq!(planet.map(|p| p.type_name().to_string()).as_deref(), Some("Planet"));
}
