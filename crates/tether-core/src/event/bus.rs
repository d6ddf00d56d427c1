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

use super::TypedEvent;
use crate::native::{NativeValue, WrapperConverter};
use crate::utils::panic::panic_message;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type TypedHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;
type NamedHandler = Arc<dyn Fn(&NativeValue) + Send + Sync>;

/// Identifies one registered handler, in either registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct Subscription<H> {
    id: SubscriptionId,
    handler: H,
}

/// A snapshot of the bus's registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusStatistics {
    /// Number of event types with at least one typed handler.
    pub event_type_count: usize,
    /// Number of typed handlers across all event types.
    pub total_handlers: usize,
    /// Number of legacy tags with at least one handler.
    pub named_tag_count: usize,
    /// Whether auto-conversion is currently applied.
    pub auto_conversion_enabled: bool,
    /// Number of typed and named publications since creation.
    pub published_events: u64,
}

/// Manages an in-process, thread-safe publish-subscribe registry.
///
/// Typed handlers are keyed by the event's concrete type. A parallel,
/// string-keyed registry serves legacy subscribers; the two are never
/// unified, so an event published on one is never seen by the other.
///
/// Handlers run on the publishing thread, outside the registry lock. A
/// handler that panics is isolated: the panic is logged and delivery
/// continues with the next handler.
pub struct EventBus {
    typed: RwLock<HashMap<TypeId, Vec<Subscription<TypedHandler>>>>,
    named: RwLock<HashMap<String, Vec<Subscription<NamedHandler>>>>,
    next_id: AtomicU64,
    published: AtomicU64,
    auto_conversion: AtomicBool,
    converter: Option<Arc<dyn WrapperConverter>>,
}

impl EventBus {
    /// Creates an empty bus without a wrapper converter.
    pub fn new() -> Self {
        log::info!("EventBus initialized.");
        Self {
            typed: RwLock::new(HashMap::new()),
            named: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            published: AtomicU64::new(0),
            auto_conversion: AtomicBool::new(false),
            converter: None,
        }
    }

    /// Creates an empty bus that can upgrade native references before delivery.
    pub fn with_converter(converter: Arc<dyn WrapperConverter>, auto_conversion: bool) -> Self {
        let mut bus = Self::new();
        bus.converter = Some(converter);
        bus.auto_conversion.store(auto_conversion, Ordering::SeqCst);
        bus
    }

    /// Registers a handler for events of type `T`.
    ///
    /// Handlers are invoked in subscription order. A subscription made while
    /// a publish is in flight takes effect from the next publish.
    pub fn subscribe<T, F>(&self, handler: F) -> SubscriptionId
    where
        T: TypedEvent,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        let erased: TypedHandler = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<T>() {
                handler(event);
            }
        });

        self.typed
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Subscription { id, handler: erased });

        log::trace!("Subscribed {:?} to {}", id, type_name::<T>());
        id
    }

    /// Registers a legacy handler for a string tag.
    pub fn subscribe_named<F>(&self, tag: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&NativeValue) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        let tag = tag.into();
        log::trace!("Subscribed {:?} to legacy tag '{}'", id, tag);

        self.named
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(tag)
            .or_default()
            .push(Subscription {
                id,
                handler: Arc::new(handler),
            });
        id
    }

    /// Removes a handler from whichever registry holds it.
    ///
    /// Returns `false` if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_subscription(&self.typed, id) || remove_subscription(&self.named, id)
    }

    /// Removes every handler from both registries.
    pub fn clear(&self) {
        self.typed.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.named.write().unwrap_or_else(PoisonError::into_inner).clear();
        log::debug!("EventBus cleared.");
    }

    /// Delivers an event to every handler registered for its type.
    ///
    /// Returns the number of handlers that completed without panicking.
    /// Publishing with no subscribers is a no-op beyond the lookup.
    pub fn publish<T: TypedEvent>(&self, event: T) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);

        let handlers: Vec<TypedHandler> = {
            let typed = self.typed.read().unwrap_or_else(PoisonError::into_inner);
            match typed.get(&TypeId::of::<T>()) {
                Some(subscriptions) if !subscriptions.is_empty() => subscriptions
                    .iter()
                    .map(|s| Arc::clone(&s.handler))
                    .collect(),
                _ => {
                    log::trace!("No subscribers for {}", type_name::<T>());
                    return 0;
                }
            }
        };

        let event = self.prepare(event);
        log::trace!("Publishing {} to {} handler(s)", type_name::<T>(), handlers.len());

        handlers
            .iter()
            .filter(|handler| deliver(type_name::<T>(), || handler(&event)))
            .count()
    }

    /// Delivers a raw payload to every legacy handler registered for `tag`.
    ///
    /// Returns the number of handlers that completed without panicking.
    pub fn publish_named(&self, tag: &str, payload: &NativeValue) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);

        let handlers: Vec<NamedHandler> = {
            let named = self.named.read().unwrap_or_else(PoisonError::into_inner);
            match named.get(tag) {
                Some(subscriptions) if !subscriptions.is_empty() => subscriptions
                    .iter()
                    .map(|s| Arc::clone(&s.handler))
                    .collect(),
                _ => return 0,
            }
        };

        handlers
            .iter()
            .filter(|handler| deliver(tag, || handler(payload)))
            .count()
    }

    /// Number of typed handlers registered for `T`.
    pub fn handler_count<T: TypedEvent>(&self) -> usize {
        self.typed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .map_or(0, Vec::len)
    }

    /// Number of legacy handlers registered for `tag`.
    pub fn named_handler_count(&self, tag: &str) -> usize {
        self.named
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .map_or(0, Vec::len)
    }

    /// Enables or disables auto-conversion.
    ///
    /// Enabling it on a bus without a converter has no effect on delivery.
    pub fn set_auto_conversion(&self, enabled: bool) {
        if enabled && self.converter.is_none() {
            log::warn!("Auto-conversion enabled on an EventBus without a wrapper converter.");
        }
        self.auto_conversion.store(enabled, Ordering::SeqCst);
    }

    /// Whether auto-conversion is applied before delivery.
    pub fn auto_conversion_enabled(&self) -> bool {
        self.auto_conversion.load(Ordering::SeqCst) && self.converter.is_some()
    }

    /// Returns a snapshot of the registries.
    pub fn statistics(&self) -> BusStatistics {
        let (event_type_count, total_handlers) = {
            let typed = self.typed.read().unwrap_or_else(PoisonError::into_inner);
            (typed.len(), typed.values().map(Vec::len).sum())
        };
        let named_tag_count = self
            .named
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();

        BusStatistics {
            event_type_count,
            total_handlers,
            named_tag_count,
            auto_conversion_enabled: self.auto_conversion_enabled(),
            published_events: self.published.load(Ordering::Relaxed),
        }
    }

    fn allocate_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Runs the conversion pass on a copy of the event.
    ///
    /// On failure the original, unconverted event is returned.
    fn prepare<T: TypedEvent>(&self, event: T) -> T {
        if !self.auto_conversion.load(Ordering::SeqCst) {
            return event;
        }
        let Some(converter) = self.converter.as_deref() else {
            return event;
        };

        let mut converted = event.clone();
        match converted.convert_references(converter) {
            Ok(()) => converted,
            Err(e) => {
                log::warn!(
                    "Auto-conversion of {} failed: {e}. Delivering unconverted event.",
                    type_name::<T>()
                );
                event
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("statistics", &self.statistics())
            .finish()
    }
}

fn deliver(event_name: &str, call: impl FnOnce()) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(()) => true,
        Err(payload) => {
            log::error!(
                "Handler for {} panicked: {}",
                event_name,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

fn remove_subscription<K, H>(
    registry: &RwLock<HashMap<K, Vec<Subscription<H>>>>,
    id: SubscriptionId,
) -> bool
where
    K: Eq + std::hash::Hash,
{
    let mut registry = registry.write().unwrap_or_else(PoisonError::into_inner);
    let mut removed = false;
    registry.retain(|_, subscriptions| {
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        removed |= subscriptions.len() != before;
        !subscriptions.is_empty()
    });
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::native::{EntityRef, EntityWrapper, NativeCommand, NativeHandle};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Ping(u32);
    impl TypedEvent for Ping {}

    #[derive(Debug, Clone, PartialEq)]
    struct Pong;
    impl TypedEvent for Pong {}

    #[derive(Debug, Clone)]
    struct Spotted {
        entity: EntityRef,
        fail: bool,
    }

    impl TypedEvent for Spotted {
        fn convert_references(
            &mut self,
            converter: &dyn WrapperConverter,
        ) -> Result<(), ConversionError> {
            self.entity.upgrade(converter)?;
            if self.fail {
                return Err(ConversionError::Other("half converted".into()));
            }
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Wrapped(NativeHandle);

    impl EntityWrapper for Wrapped {
        fn kind(&self) -> &str {
            "Wrapped"
        }
        fn native(&self) -> &NativeHandle {
            &self.0
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct WrapEverything;

    impl WrapperConverter for WrapEverything {
        fn wrap(&self, handle: &NativeHandle) -> Option<Arc<dyn EntityWrapper>> {
            Some(Arc::new(Wrapped(handle.clone())))
        }
    }

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |event: &T| sink.lock().unwrap().push(event.clone()))
    }

    fn spotted(fail: bool) -> Spotted {
        let handle: NativeHandle = Arc::new(NativeCommand::new("Building"));
        Spotted {
            entity: EntityRef::Native(handle),
            fail,
        }
    }

    #[test]
    fn test_publish_reaches_handlers_in_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe(move |_: &Ping| order.lock().unwrap().push(label));
        }

        assert_eq!(bus.publish(Ping(1)), 3);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_publish_routes_by_type() {
        let bus = EventBus::new();
        let (pings, on_ping) = recorder::<Ping>();
        bus.subscribe(on_ping);

        assert_eq!(bus.publish(Pong), 0);
        bus.publish(Ping(7));
        assert_eq!(*pings.lock().unwrap(), vec![Ping(7)]);
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(Ping(1)), 0);
        let stats = bus.statistics();
        assert_eq!(stats.event_type_count, 0);
        assert_eq!(stats.total_handlers, 0);
        assert_eq!(stats.published_events, 1);
    }

    #[test]
    fn test_panicking_handler_does_not_block_siblings() {
        let bus = EventBus::new();
        bus.subscribe(|_: &Ping| panic!("first handler fails"));
        let (pings, on_ping) = recorder::<Ping>();
        bus.subscribe(on_ping);

        assert_eq!(bus.publish(Ping(3)), 1);
        assert_eq!(*pings.lock().unwrap(), vec![Ping(3)]);
    }

    #[test]
    fn test_unsubscribe_and_clear() {
        let bus = EventBus::new();
        let (pings, on_ping) = recorder::<Ping>();
        let id = bus.subscribe(on_ping);
        bus.subscribe(|_: &Pong| {});

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(Ping(1));
        assert!(pings.lock().unwrap().is_empty());
        assert_eq!(bus.handler_count::<Ping>(), 0);
        assert_eq!(bus.statistics().event_type_count, 1);

        bus.subscribe_named("Legacy", |_| {});
        bus.clear();
        let stats = bus.statistics();
        assert_eq!(stats.total_handlers, 0);
        assert_eq!(stats.named_tag_count, 0);
    }

    #[test]
    fn test_named_registry_is_separate() {
        let bus = EventBus::new();
        let (pings, on_ping) = recorder::<Ping>();
        bus.subscribe(on_ping);

        let legacy_hits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&legacy_hits);
        let id = bus.subscribe_named("Ping", move |payload: &NativeValue| {
            sink.lock().unwrap().push(payload.clone())
        });

        assert_eq!(bus.publish_named("Ping", &NativeValue::Int(9)), 1);
        assert!(pings.lock().unwrap().is_empty());

        bus.publish(Ping(2));
        assert_eq!(*legacy_hits.lock().unwrap(), vec![NativeValue::Int(9)]);
        assert_eq!(bus.named_handler_count("Ping"), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.publish_named("Ping", &NativeValue::Null), 0);
    }

    #[test]
    fn test_subscribe_during_publish_applies_next_time() {
        let bus = Arc::new(EventBus::new());
        let late_hits = Arc::new(Mutex::new(0));

        let inner_bus = Arc::clone(&bus);
        let hits = Arc::clone(&late_hits);
        bus.subscribe(move |_: &Ping| {
            let hits = Arc::clone(&hits);
            inner_bus.subscribe(move |_: &Ping| *hits.lock().unwrap() += 1);
        });

        assert_eq!(bus.publish(Ping(1)), 1);
        assert_eq!(*late_hits.lock().unwrap(), 0);
        assert_eq!(bus.publish(Ping(2)), 2);
        assert_eq!(*late_hits.lock().unwrap(), 1);
        bus.clear();
    }

    #[test]
    fn test_auto_conversion_upgrades_references() {
        let bus = EventBus::with_converter(Arc::new(WrapEverything), true);
        let (seen, on_spotted) = recorder::<Spotted>();
        bus.subscribe(on_spotted);

        bus.publish(spotted(false));
        let seen = seen.lock().unwrap();
        assert!(seen[0].entity.is_wrapped());
        assert!(seen[0].entity.wrapper_as::<Wrapped>().is_some());
    }

    #[test]
    fn test_failed_conversion_delivers_original() {
        let bus = EventBus::with_converter(Arc::new(WrapEverything), true);
        let (seen, on_spotted) = recorder::<Spotted>();
        bus.subscribe(on_spotted);

        assert_eq!(bus.publish(spotted(true)), 1);
        let seen = seen.lock().unwrap();
        assert!(!seen[0].entity.is_wrapped());
        assert!(seen[0].entity.native().is_some());
    }

    #[test]
    fn test_auto_conversion_toggle() {
        let bus = EventBus::with_converter(Arc::new(WrapEverything), false);
        let (seen, on_spotted) = recorder::<Spotted>();
        bus.subscribe(on_spotted);

        bus.publish(spotted(false));
        assert!(!bus.statistics().auto_conversion_enabled);

        bus.set_auto_conversion(true);
        bus.publish(spotted(false));
        assert!(bus.statistics().auto_conversion_enabled);

        let seen = seen.lock().unwrap();
        assert!(!seen[0].entity.is_wrapped());
        assert!(seen[1].entity.is_wrapped());
    }

    #[test]
    fn test_auto_conversion_requires_converter() {
        let bus = EventBus::new();
        bus.set_auto_conversion(true);
        assert!(!bus.auto_conversion_enabled());
    }
}
