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

//! Publication of command outcomes and host notifications.

use std::sync::Arc;
use tether_core::native::NativeValue;
use tether_core::{EventBus, TypedEvent};
use tether_infra::NativeEventAdapter;

/// A host notification waiting to be delivered on the update thread.
#[derive(Debug, Clone)]
struct QueuedNotification {
    tag: String,
    payload: NativeValue,
}

/// Publishes typed events and forwards host notifications to the bus.
///
/// Host hooks that fire off the update thread push into a queue through a
/// [`NativeHook`]; the queue is drained by [`drain_native_queue`](Self::drain_native_queue),
/// so delivery of native-derived events stays on the thread that owns the frame loop.
#[derive(Debug)]
pub struct EventPublisher {
    bus: Arc<EventBus>,
    adapter: NativeEventAdapter,
    sender: flume::Sender<QueuedNotification>,
    receiver: flume::Receiver<QueuedNotification>,
}

impl EventPublisher {
    /// Creates a publisher over the given bus with the built-in adapter table.
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self::with_adapter(bus, NativeEventAdapter::new())
    }

    /// Creates a publisher with a specific adapter.
    pub fn with_adapter(bus: Arc<EventBus>, adapter: NativeEventAdapter) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            bus,
            adapter,
            sender,
            receiver,
        }
    }

    /// The bus events are published on.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Publishes a typed event.
    ///
    /// ## Returns
    /// The number of handlers that received it.
    pub fn publish<T: TypedEvent>(&self, event: T) -> usize {
        self.bus.publish(event)
    }

    /// Delivers a host notification on the calling thread.
    ///
    /// Legacy subscribers of `tag` receive the raw payload first. The payload
    /// is then converted, and the typed event, if the tag has one, is
    /// published.
    ///
    /// ## Returns
    /// The number of handlers reached across both registries.
    pub fn publish_native(&self, tag: &str, payload: &NativeValue) -> usize {
        let legacy = self.bus.publish_named(tag, payload);
        let typed = self
            .adapter
            .convert(tag, payload)
            .map_or(0, |event| event.publish_to(&self.bus));
        log::trace!("Native '{tag}' reached {legacy} legacy and {typed} typed handler(s).");
        legacy + typed
    }

    /// Returns a sender that may be used from any thread.
    pub fn native_hook(&self) -> NativeHook {
        NativeHook {
            sender: self.sender.clone(),
        }
    }

    /// Delivers the host notifications queued when the drain starts.
    ///
    /// Notifications emitted by handlers during the drain wait for the next one.
    ///
    /// ## Returns
    /// The number of notifications drained.
    pub fn drain_native_queue(&self) -> usize {
        let queued = self.receiver.len();
        let mut drained = 0;
        for notification in (0..queued).map_while(|_| self.receiver.try_recv().ok()) {
            self.publish_native(&notification.tag, &notification.payload);
            drained += 1;
        }
        drained
    }

    /// Number of notifications waiting in the queue.
    pub fn pending_native_events(&self) -> usize {
        self.receiver.len()
    }
}

/// A cloneable, thread-safe entry point for host notifications.
#[derive(Debug, Clone)]
pub struct NativeHook {
    sender: flume::Sender<QueuedNotification>,
}

impl NativeHook {
    /// Queues a notification for the next drain.
    ///
    /// ## Returns
    /// `false` if the publisher is gone and the notification was dropped.
    pub fn emit(&self, tag: impl Into<String>, payload: NativeValue) -> bool {
        let notification = QueuedNotification {
            tag: tag.into(),
            payload,
        };
        match self.sender.send(notification) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to queue native '{}': receiver disconnected.", e.0.tag);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use tether_core::event::native::tags;
    use tether_core::event::{BuildingDespawned, DroneSpawned};
    use tether_infra::DynamicObject;

    fn counting<T: TypedEvent>(bus: &EventBus) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        bus.subscribe(move |_: &T| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_publish_native_reaches_both_registries() {
        let bus = Arc::new(EventBus::new());
        let publisher = EventPublisher::new(Arc::clone(&bus));
        let typed = counting::<BuildingDespawned>(&bus);

        let raw = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&raw);
        bus.subscribe_named(tags::BUILDING_DESPAWNED, move |payload: &NativeValue| {
            assert!(payload.as_object().is_some());
            sink.fetch_add(1, Ordering::SeqCst);
        });

        let building = DynamicObject::builder("Building").field("Id", "B-1").build();
        let payload = NativeValue::Object(building);
        assert_eq!(publisher.publish_native(tags::BUILDING_DESPAWNED, &payload), 2);
        assert_eq!(typed.load(Ordering::SeqCst), 1);
        assert_eq!(raw.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_tag_only_reaches_legacy_handlers() {
        let bus = Arc::new(EventBus::new());
        let publisher = EventPublisher::new(Arc::clone(&bus));
        bus.subscribe_named("WeatherChanged", |_| {});

        assert_eq!(publisher.publish_native("WeatherChanged", &NativeValue::Null), 1);
        assert_eq!(publisher.publish_native("Nothing", &NativeValue::Null), 0);
    }

    #[test]
    fn test_hook_queue_drains_on_update_thread() {
        let bus = Arc::new(EventBus::new());
        let publisher = EventPublisher::new(Arc::clone(&bus));
        let drones = counting::<DroneSpawned>(&bus);

        let hook = publisher.native_hook();
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let hook = hook.clone();
                thread::spawn(move || hook.emit(tags::DRONE_SPAWNED, NativeValue::Null))
            })
            .collect();
        for worker in workers {
            assert!(worker.join().unwrap());
        }

        // Nothing is delivered until the queue is drained.
        assert_eq!(drones.load(Ordering::SeqCst), 0);
        assert_eq!(publisher.pending_native_events(), 4);

        assert_eq!(publisher.drain_native_queue(), 4);
        assert_eq!(drones.load(Ordering::SeqCst), 4);
        assert_eq!(publisher.pending_native_events(), 0);
    }

    #[test]
    fn test_reemitted_notifications_wait_for_next_drain() {
        let bus = Arc::new(EventBus::new());
        let publisher = EventPublisher::new(Arc::clone(&bus));
        let hook = publisher.native_hook();
        {
            let hook = hook.clone();
            bus.subscribe_named(tags::DRONE_SPAWNED, move |_: &NativeValue| {
                hook.emit(tags::DRONE_SPAWNED, NativeValue::Null);
            });
        }
        hook.emit(tags::DRONE_SPAWNED, NativeValue::Null);

        assert_eq!(publisher.drain_native_queue(), 1);
        assert_eq!(publisher.pending_native_events(), 1);
        assert_eq!(publisher.drain_native_queue(), 1);
    }

    #[test]
    fn test_hook_outliving_publisher() {
        let publisher = EventPublisher::new(Arc::new(EventBus::new()));
        let hook = publisher.native_hook();
        drop(publisher);
        assert!(!hook.emit(tags::DRONE_DESPAWNED, NativeValue::Null));
    }
}
