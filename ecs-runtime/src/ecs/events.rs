// Copyright 2025 John Brosnihan
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
//! Lifecycle event dispatch
//!
//! Listeners are shared trait objects (`Rc<dyn ...>`). A listener's identity
//! is its allocation, so subscribing the same `Rc` twice can be detected and
//! unsubscribing removes exactly that listener.
//!
//! Two shapes are provided:
//!
//! - [`Listeners`]: an ordered list of global subscribers
//! - [`ScopedEvent`]: global subscribers plus per-entity subscribers kept in
//!   a dense slot table indexed by entity identifier
//!
//! Every dispatch iterates over a snapshot of the list taken before the
//! first listener runs, so a listener that subscribes or unsubscribes during
//! dispatch never corrupts the list being walked.
//!
//! All closures of the right shape implement the listener traits, so
//! `Rc::new(|entity, value: &Health| ...)` can be subscribed directly.

use crate::ecs::component::{Component, ComponentInfo};
use crate::ecs::group::ComponentGroup;
use crate::ecs::Entity;
use std::any::Any;
use std::rc::Rc;

/// Check whether two listener handles point at the same listener
pub fn same_listener<L: ?Sized>(a: &Rc<L>, b: &Rc<L>) -> bool {
    // Compare data pointers only; vtable pointers are not unique per type
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

/// Receives group membership events (added, removing, removed)
pub trait GroupListener {
    /// Called with the group that raised the event and the affected entity
    fn on_group_event(&self, group: &ComponentGroup, entity: Entity);
}

impl<F: Fn(&ComponentGroup, Entity)> GroupListener for F {
    fn on_group_event(&self, group: &ComponentGroup, entity: Entity) {
        self(group, entity)
    }
}

/// Receives typed component events that carry the value (added, removing, changed)
pub trait ComponentListener<T: Component> {
    /// Called with the entity and the component value
    fn on_component(&self, entity: Entity, component: &T);
}

impl<T: Component, F: Fn(Entity, &T)> ComponentListener<T> for F {
    fn on_component(&self, entity: Entity, component: &T) {
        self(entity, component)
    }
}

/// Receives untyped component events that carry the value
pub trait AnyComponentListener {
    /// Called with the entity, the component type and the value
    fn on_any_component(&self, entity: Entity, info: ComponentInfo, component: &dyn Any);
}

impl<F: Fn(Entity, ComponentInfo, &dyn Any)> AnyComponentListener for F {
    fn on_any_component(&self, entity: Entity, info: ComponentInfo, component: &dyn Any) {
        self(entity, info, component)
    }
}

/// Receives component-removed events, raised after the value is gone
pub trait RemovedListener {
    /// Called with the entity and the type of the removed component
    fn on_removed(&self, entity: Entity, info: ComponentInfo);
}

impl<F: Fn(Entity, ComponentInfo)> RemovedListener for F {
    fn on_removed(&self, entity: Entity, info: ComponentInfo) {
        self(entity, info)
    }
}

/// Ordered list of subscribers
pub struct Listeners<L: ?Sized> {
    listeners: Vec<Rc<L>>,
}

impl<L: ?Sized> Listeners<L> {
    /// Create an empty list
    pub fn new() -> Self {
        Listeners {
            listeners: Vec::new(),
        }
    }

    /// Append a subscriber, allowing repeats
    pub fn subscribe(&mut self, listener: Rc<L>) {
        self.listeners.push(listener);
    }

    /// Append a subscriber unless it is already subscribed
    ///
    /// Returns `false` when the listener was rejected as a duplicate.
    pub fn subscribe_unique(&mut self, listener: Rc<L>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Remove the first occurrence of a subscriber
    pub fn unsubscribe(&mut self, listener: &Rc<L>) -> bool {
        match self.listeners.iter().position(|l| same_listener(l, listener)) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Check if the listener is subscribed
    pub fn contains(&self, listener: &Rc<L>) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    /// Number of subscriptions
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if nobody is subscribed
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Copy of the current subscribers, in subscription order
    pub fn snapshot(&self) -> Vec<Rc<L>> {
        self.listeners.clone()
    }
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Event with global subscribers and per-entity subscribers
///
/// Dispatch order is fixed: global subscribers first, then the subscribers
/// scoped to the entity, each in subscription order. A slot whose last
/// scoped subscriber leaves is released.
pub struct ScopedEvent<L: ?Sized> {
    global: Listeners<L>,
    scoped: Vec<Option<Listeners<L>>>,
    occupied: usize,
}

impl<L: ?Sized> ScopedEvent<L> {
    /// Create an event with no subscribers
    pub fn new() -> Self {
        ScopedEvent {
            global: Listeners::new(),
            scoped: Vec::new(),
            occupied: 0,
        }
    }

    /// Subscribe to the event for every entity
    pub fn subscribe(&mut self, listener: Rc<L>) {
        self.global.subscribe(listener);
    }

    /// Remove a global subscription
    pub fn unsubscribe(&mut self, listener: &Rc<L>) -> bool {
        self.global.unsubscribe(listener)
    }

    /// Subscribe to the event for one entity only
    pub fn subscribe_entity(&mut self, entity: Entity, listener: Rc<L>) {
        let index = entity.index();
        if index >= self.scoped.len() {
            self.scoped.resize_with(index + 1, || None);
        }
        let slot = &mut self.scoped[index];
        if slot.is_none() {
            self.occupied += 1;
        }
        slot.get_or_insert_with(Listeners::new).subscribe(listener);
    }

    /// Remove a subscription scoped to one entity
    pub fn unsubscribe_entity(&mut self, entity: Entity, listener: &Rc<L>) -> bool {
        let Some(Some(listeners)) = self.scoped.get_mut(entity.index()) else {
            return false;
        };
        let removed = listeners.unsubscribe(listener);
        if listeners.is_empty() {
            self.release_entity(entity);
        }
        removed
    }

    /// Drop every subscription scoped to the entity
    pub fn release_entity(&mut self, entity: Entity) {
        let index = entity.index();
        if let Some(slot) = self.scoped.get_mut(index) {
            if slot.take().is_some() {
                self.occupied -= 1;
            }
        }
        while matches!(self.scoped.last(), Some(None)) {
            self.scoped.pop();
        }
    }

    /// Number of global subscriptions
    pub fn global_len(&self) -> usize {
        self.global.len()
    }

    /// Number of subscriptions scoped to the entity
    pub fn entity_len(&self, entity: Entity) -> usize {
        match self.scoped.get(entity.index()) {
            Some(Some(listeners)) => listeners.len(),
            _ => 0,
        }
    }

    /// Number of entities with at least one scoped subscription
    pub fn scoped_entities(&self) -> usize {
        self.occupied
    }

    /// Size of the scoped slot table
    pub fn slot_capacity(&self) -> usize {
        self.scoped.len()
    }

    /// Subscribers to notify for the entity, global ones first
    pub fn snapshot(&self, entity: Entity) -> Vec<Rc<L>> {
        let mut listeners = self.global.snapshot();
        if let Some(Some(scoped)) = self.scoped.get(entity.index()) {
            listeners.extend(scoped.snapshot());
        }
        listeners
    }
}

impl<L: ?Sized> Default for ScopedEvent<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed component events for one component type
pub struct ComponentEvents<T: Component> {
    /// Raised after a component is added
    pub added: ScopedEvent<dyn ComponentListener<T>>,
    /// Raised before a component is removed; the value is still stored
    pub removing: ScopedEvent<dyn ComponentListener<T>>,
    /// Raised after a component is removed
    pub removed: ScopedEvent<dyn RemovedListener>,
    /// Raised after an existing component is overwritten
    pub changed: ScopedEvent<dyn ComponentListener<T>>,
}

impl<T: Component> ComponentEvents<T> {
    /// Create events with no subscribers
    pub fn new() -> Self {
        ComponentEvents {
            added: ScopedEvent::new(),
            removing: ScopedEvent::new(),
            removed: ScopedEvent::new(),
            changed: ScopedEvent::new(),
        }
    }

    pub(crate) fn fire_added(&self, entity: Entity, component: &T) {
        for listener in self.added.snapshot(entity) {
            listener.on_component(entity, component);
        }
    }

    pub(crate) fn fire_changed(&self, entity: Entity, component: &T) {
        for listener in self.changed.snapshot(entity) {
            listener.on_component(entity, component);
        }
    }
}

impl<T: Component> Default for ComponentEvents<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of [`ComponentEvents`], used on paths that only know the
/// component's [`TypeId`](std::any::TypeId)
pub(crate) trait ErasedComponentEvents {
    fn fire_removing_any(&self, entity: Entity, component: &dyn Any);
    fn fire_removed(&self, entity: Entity);
    fn release_entity(&mut self, entity: Entity);
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Component> ErasedComponentEvents for ComponentEvents<T> {
    fn fire_removing_any(&self, entity: Entity, component: &dyn Any) {
        if let Some(component) = component.downcast_ref::<T>() {
            for listener in self.removing.snapshot(entity) {
                listener.on_component(entity, component);
            }
        }
    }

    fn fire_removed(&self, entity: Entity) {
        let info = ComponentInfo::of::<T>();
        for listener in self.removed.snapshot(entity) {
            listener.on_removed(entity, info);
        }
    }

    fn release_entity(&mut self, entity: Entity) {
        self.added.release_entity(entity);
        self.removing.release_entity(entity);
        self.removed.release_entity(entity);
        self.changed.release_entity(entity);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Component events for every component type, used by binding layers
#[derive(Default)]
pub struct AnyComponentEvents {
    /// Raised after any component is added
    pub added: ScopedEvent<dyn AnyComponentListener>,
    /// Raised before any component is removed
    pub removing: ScopedEvent<dyn AnyComponentListener>,
    /// Raised after any component is removed
    pub removed: ScopedEvent<dyn RemovedListener>,
    /// Raised after any component is overwritten
    pub changed: ScopedEvent<dyn AnyComponentListener>,
}

impl AnyComponentEvents {
    pub(crate) fn fire_added(&self, entity: Entity, info: ComponentInfo, component: &dyn Any) {
        for listener in self.added.snapshot(entity) {
            listener.on_any_component(entity, info, component);
        }
    }

    pub(crate) fn fire_removing(&self, entity: Entity, info: ComponentInfo, component: &dyn Any) {
        for listener in self.removing.snapshot(entity) {
            listener.on_any_component(entity, info, component);
        }
    }

    pub(crate) fn fire_removed(&self, entity: Entity, info: ComponentInfo) {
        for listener in self.removed.snapshot(entity) {
            listener.on_removed(entity, info);
        }
    }

    pub(crate) fn fire_changed(&self, entity: Entity, info: ComponentInfo, component: &dyn Any) {
        for listener in self.changed.snapshot(entity) {
            listener.on_any_component(entity, info, component);
        }
    }

    pub(crate) fn release_entity(&mut self, entity: Entity) {
        self.added.release_entity(entity);
        self.removing.release_entity(entity);
        self.removed.release_entity(entity);
        self.changed.release_entity(entity);
    }
}

/// Receiver of broadcast messages
pub trait MessageReceiver<M: ?Sized> {
    /// Handle one message
    fn notify(&self, message: &M);
}

impl<M: ?Sized, F: Fn(&M)> MessageReceiver<M> for F {
    fn notify(&self, message: &M) {
        self(message)
    }
}

/// Broadcast channel that hands every message to all registered receivers
///
/// Receivers are notified in registration order. Use `Messenger<()>` for
/// signals without a payload.
pub struct Messenger<M: ?Sized> {
    receivers: Listeners<dyn MessageReceiver<M>>,
}

impl<M: ?Sized + 'static> Messenger<M> {
    /// Create a messenger with no receivers
    pub fn new() -> Self {
        Messenger {
            receivers: Listeners::new(),
        }
    }

    /// Register a receiver
    pub fn register(&mut self, receiver: Rc<dyn MessageReceiver<M>>) {
        self.receivers.subscribe(receiver);
    }

    /// Remove a receiver
    pub fn unregister(&mut self, receiver: &Rc<dyn MessageReceiver<M>>) -> bool {
        self.receivers.unsubscribe(receiver)
    }

    /// Number of registered receivers
    pub fn receiver_count(&self) -> usize {
        self.receivers.len()
    }

    /// Deliver a message to every receiver
    pub fn notify(&self, message: &M) {
        for receiver in self.receivers.snapshot() {
            receiver.notify(message);
        }
    }
}

impl<M: ?Sized + 'static> Default for Messenger<M> {
    fn default() -> Self {
        Self::new()
    }
}
