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
//! Entity manager
//!
//! The entity manager is the central registry of the runtime. It owns every
//! component storage and every component group, allocates entities, and
//! routes each component mutation to the storages, the events and the
//! groups in a fixed order:
//!
//! 1. add: storage write, component-added events, group inspection
//! 2. set on an existing component: storage write, component-changed
//!    events, group storage refresh
//! 3. remove: component-removing events, storage removal,
//!    component-removed events, group inspection
//!
//! Everything runs synchronously on the calling thread.

use crate::config::{InspectMode, RuntimeConfig};
use crate::ecs::component::{Component, ComponentArray, ComponentInfo};
use crate::ecs::events::{AnyComponentEvents, ComponentEvents, ErasedComponentEvents};
use crate::ecs::group::{ComponentGroup, ComponentSet, GroupHandle, GroupMatcher};
use crate::ecs::registry::ComponentRegistry;
use crate::ecs::Entity;
use crate::error::{EcsError, InjectionError};
use std::any::{type_name, TypeId};
use std::collections::HashMap;

/// Owner of all entities, component storages and groups
pub struct EntityManager {
    config: RuntimeConfig,
    next_entity_id: u32,
    alive: Vec<bool>,
    alive_count: usize,
    registry: ComponentRegistry,
    groups: Vec<ComponentGroup>,
    matchers: HashMap<GroupMatcher, GroupHandle>,
    groups_by_type: HashMap<TypeId, Vec<GroupHandle>>,
    group_keys: HashMap<String, GroupHandle>,
    component_events: HashMap<TypeId, Box<dyn ErasedComponentEvents>>,
    any_events: AnyComponentEvents,
}

impl EntityManager {
    /// Create an empty manager with the default configuration
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create an empty manager
    pub fn with_config(config: RuntimeConfig) -> Self {
        EntityManager {
            alive: Vec::with_capacity(config.entity_capacity),
            config,
            next_entity_id: 0,
            alive_count: 0,
            registry: ComponentRegistry::new(),
            groups: Vec::new(),
            matchers: HashMap::new(),
            groups_by_type: HashMap::new(),
            group_keys: HashMap::new(),
            component_events: HashMap::new(),
            any_events: AnyComponentEvents::default(),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Create a new entity
    ///
    /// Identifiers increase monotonically and are never reused.
    pub fn create_entity(&mut self) -> Entity {
        let entity = Entity::new(self.next_entity_id);
        self.next_entity_id += 1;

        if entity.index() >= self.alive.len() {
            self.alive.resize(entity.index() + 1, false);
        }
        self.alive[entity.index()] = true;
        self.alive_count += 1;

        tracing::trace!(%entity, "entity created");
        entity
    }

    /// Destroy an entity
    ///
    /// Every component is removed (raising the usual events), the entity
    /// leaves every group and all listeners scoped to it are released.
    /// Returns `false` if the entity was not alive.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.is_entity_alive(entity) {
            return false;
        }

        for info in self.registry.components_of(entity) {
            self.remove_erased(entity, info.type_id());
        }

        self.alive[entity.index()] = false;
        self.alive_count -= 1;

        for events in self.component_events.values_mut() {
            events.release_entity(entity);
        }
        self.any_events.release_entity(entity);
        for group in &mut self.groups {
            group.release_entity(entity);
        }

        tracing::debug!(%entity, "entity destroyed");
        true
    }

    /// Check if an entity is alive
    pub fn is_entity_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.alive_count
    }

    /// Iterate over alive entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(id, _)| Entity::new(id as u32))
    }

    /// Destroy every alive entity
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = self.entities().collect();
        for entity in entities {
            self.destroy_entity(entity);
        }
    }

    /// Add a component to an entity
    ///
    /// Returns `Ok(true)` for a new component. If the entity already owns a
    /// component of this type the value is overwritten exactly as by
    /// [`set_component`](Self::set_component) and `Ok(false)` is returned.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<bool, EcsError> {
        self.ensure_alive(entity)?;

        let type_id = TypeId::of::<T>();
        if self.registry.has_component(entity, type_id) {
            self.overwrite(entity, component);
            return Ok(false);
        }

        self.registry.register::<T>().add(entity, component);

        if let Some(value) = self.registry.storage::<T>().and_then(|s| s.get(entity)) {
            if let Some(events) = typed_events::<T>(&self.component_events) {
                events.fire_added(entity, value);
            }
            self.any_events.fire_added(entity, ComponentInfo::of::<T>(), value);
        }

        self.refresh_groups(entity, type_id);
        Ok(true)
    }

    /// Set the component of an entity, adding it if absent
    ///
    /// Overwriting never changes group membership; the new value is copied
    /// into every group that holds the entity.
    pub fn set_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<(), EcsError> {
        self.ensure_alive(entity)?;

        if self.registry.has_component(entity, TypeId::of::<T>()) {
            self.overwrite(entity, component);
            Ok(())
        } else {
            self.add_component(entity, component).map(|_| ())
        }
    }

    /// Remove a component from an entity
    ///
    /// Returns `false` if there was nothing to remove.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> bool {
        if !self.is_entity_alive(entity) {
            return false;
        }
        self.remove_erased(entity, TypeId::of::<T>())
    }

    /// Get a reference to an entity's component
    pub fn get_component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.registry.storage::<T>()?.get(entity)
    }

    /// Get a reference to an entity's component, or an error naming what is missing
    pub fn component<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.ensure_alive(entity)?;
        self.get_component::<T>(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Check if the entity owns a component of type `T`
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.registry.has_component(entity, TypeId::of::<T>())
    }

    /// Check if the entity owns a component of the given type
    pub fn has_component_type(&self, entity: Entity, type_id: TypeId) -> bool {
        self.registry.has_component(entity, type_id)
    }

    /// Types of the components an entity owns
    pub fn components_of(&self, entity: Entity) -> Vec<ComponentInfo> {
        self.registry.components_of(entity)
    }

    /// Storage holding every value of component type `T`
    pub fn storage<T: Component>(&self) -> Option<&ComponentArray<T>> {
        self.registry.storage::<T>()
    }

    /// Get the shared group for a component set, creating it on first use
    ///
    /// Structurally equal sets always yield the same handle. A new group is
    /// filled with the alive entities that already match, without raising
    /// events.
    pub fn group<S: ComponentSet>(&mut self) -> GroupHandle {
        S::register(&mut self.registry);

        let matcher = GroupMatcher::of::<S>();
        if let Some(&handle) = self.matchers.get(&matcher) {
            return handle;
        }

        let handle = GroupHandle(self.groups.len());
        let mut group = ComponentGroup::of::<S>(handle);
        for (id, alive) in self.alive.iter().enumerate() {
            if *alive {
                group.inspect(Entity::new(id as u32), &self.registry);
            }
        }

        for info in matcher.types() {
            self.groups_by_type
                .entry(info.type_id())
                .or_default()
                .push(handle);
        }
        tracing::debug!(group = %matcher, members = group.len(), "component group created");

        self.matchers.insert(matcher, handle);
        self.groups.push(group);
        handle
    }

    /// Look up the group for a matcher without creating it
    pub fn group_handle(&self, matcher: &GroupMatcher) -> Option<GroupHandle> {
        self.matchers.get(matcher).copied()
    }

    /// Get a group by handle
    pub fn get_group(&self, handle: GroupHandle) -> Option<&ComponentGroup> {
        self.groups.get(handle.0)
    }

    /// Get a group by handle, for subscribing to its events
    pub fn group_mut(&mut self, handle: GroupHandle) -> Option<&mut ComponentGroup> {
        self.groups.get_mut(handle.0)
    }

    /// Get a group by handle, or an error for a foreign handle
    pub fn try_group(&self, handle: GroupHandle) -> Result<&ComponentGroup, EcsError> {
        self.get_group(handle)
            .ok_or(EcsError::InvalidGroupHandle(handle))
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Iterate over groups in creation order
    pub fn groups(&self) -> impl Iterator<Item = &ComponentGroup> + '_ {
        self.groups.iter()
    }

    /// Bind a logical key to a group
    ///
    /// Rebinding a key to the group it already names is a no-op; binding it
    /// to another group is a conflict.
    pub fn bind_group_key(&mut self, key: &str, handle: GroupHandle) -> Result<(), InjectionError> {
        if let Some(&existing) = self.group_keys.get(key) {
            if existing == handle {
                return Ok(());
            }
            let describe = |h: GroupHandle| {
                self.groups
                    .get(h.0)
                    .map(|g| g.matcher().to_string())
                    .unwrap_or_else(|| format!("{:?}", h))
            };
            let err = InjectionError::TupleKeyConflict {
                key: key.to_string(),
                existing: describe(existing),
                requested: describe(handle),
            };
            tracing::warn!(%err, "tuple key conflict");
            return Err(err);
        }
        self.group_keys.insert(key.to_string(), handle);
        Ok(())
    }

    /// Group bound to a logical key
    pub fn group_by_key(&self, key: &str) -> Option<GroupHandle> {
        self.group_keys.get(key).copied()
    }

    /// Typed component events for `T`
    pub fn component_events<T: Component>(&mut self) -> &mut ComponentEvents<T> {
        self.component_events
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentEvents::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentEvents<T>>()
            .expect("component events keyed by their own TypeId")
    }

    /// Component events covering every component type
    pub fn any_component_events(&mut self) -> &mut AnyComponentEvents {
        &mut self.any_events
    }

    fn ensure_alive(&self, entity: Entity) -> Result<(), EcsError> {
        if self.is_entity_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::EntityNotAlive(entity))
        }
    }

    fn overwrite<T: Component>(&mut self, entity: Entity, component: T) {
        let Some(storage) = self.registry.storage_mut::<T>() else {
            return;
        };
        storage.update(entity, component);

        let Some(value) = self.registry.storage::<T>().and_then(|s| s.get(entity)) else {
            return;
        };
        if let Some(events) = typed_events::<T>(&self.component_events) {
            events.fire_changed(entity, value);
        }
        self.any_events
            .fire_changed(entity, ComponentInfo::of::<T>(), value);

        if let Some(handles) = self.groups_by_type.get(&TypeId::of::<T>()) {
            for handle in handles {
                self.groups[handle.0].update(entity, value);
            }
        }
    }

    fn remove_erased(&mut self, entity: Entity, type_id: TypeId) -> bool {
        let Some(storage) = self.registry.get(type_id) else {
            return false;
        };
        let info = storage.info();
        let Some(value) = storage.get_any(entity) else {
            return false;
        };

        let events = self.component_events.get(&type_id);
        if let Some(events) = events {
            events.fire_removing_any(entity, value);
        }
        self.any_events.fire_removing(entity, info, value);

        if let Some(storage) = self.registry.get_mut(type_id) {
            storage.remove_entity(entity);
        }

        if let Some(events) = self.component_events.get(&type_id) {
            events.fire_removed(entity);
        }
        self.any_events.fire_removed(entity, info);

        tracing::trace!(%entity, component = info.name(), "component removed");
        self.refresh_groups(entity, type_id);
        true
    }

    fn refresh_groups(&mut self, entity: Entity, type_id: TypeId) {
        let registry = &self.registry;
        match self.config.inspect_mode {
            InspectMode::Targeted => {
                if let Some(handles) = self.groups_by_type.get(&type_id) {
                    for handle in handles {
                        self.groups[handle.0].inspect(entity, registry);
                    }
                }
            }
            InspectMode::Broadcast => {
                for group in &mut self.groups {
                    group.inspect(entity, registry);
                }
            }
        }
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

fn typed_events<T: Component>(
    events: &HashMap<TypeId, Box<dyn ErasedComponentEvents>>,
) -> Option<&ComponentEvents<T>> {
    events
        .get(&TypeId::of::<T>())?
        .as_any()
        .downcast_ref::<ComponentEvents<T>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::events::GroupListener;
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Position(f32);
    impl Component for Position {}

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity(f32);
    impl Component for Velocity {}

    #[derive(Debug, Clone, PartialEq)]
    struct Frozen;
    impl Component for Frozen {}

    #[test]
    fn test_entity_lifecycle() {
        let mut manager = EntityManager::new();

        let e1 = manager.create_entity();
        let e2 = manager.create_entity();
        assert_eq!(manager.entity_count(), 2);
        assert_ne!(e1, e2);

        assert!(manager.destroy_entity(e1));
        assert!(!manager.destroy_entity(e1));
        assert_eq!(manager.entity_count(), 1);
        assert!(!manager.is_entity_alive(e1));
        assert!(manager.is_entity_alive(e2));

        // Identifiers are not reused
        let e3 = manager.create_entity();
        assert!(e3.id() > e2.id());
    }

    #[test]
    fn test_add_to_dead_entity_fails() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.destroy_entity(entity);

        let result = manager.add_component(entity, Position(0.0));
        assert!(matches!(result, Err(EcsError::EntityNotAlive(e)) if e == entity));
        assert!(manager.set_component(Entity::new(77), Position(0.0)).is_err());
    }

    #[test]
    fn test_component_crud() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();

        assert!(manager.add_component(entity, Position(1.0)).unwrap());
        assert!(manager.has_component::<Position>(entity));
        assert_eq!(manager.get_component::<Position>(entity), Some(&Position(1.0)));

        assert!(!manager.add_component(entity, Position(2.0)).unwrap());
        assert_eq!(manager.component::<Position>(entity).unwrap(), &Position(2.0));
        assert_eq!(manager.storage::<Position>().unwrap().len(), 1);

        manager.set_component(entity, Position(3.0)).unwrap();
        assert_eq!(manager.get_component::<Position>(entity), Some(&Position(3.0)));

        assert!(manager.remove_component::<Position>(entity));
        assert!(!manager.remove_component::<Position>(entity));
        assert!(!manager.remove_component::<Velocity>(entity));
        assert!(matches!(
            manager.component::<Position>(entity),
            Err(EcsError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_set_adds_when_absent() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        let group = manager.group::<(Velocity,)>();

        manager.set_component(entity, Velocity(4.0)).unwrap();
        assert!(manager.get_group(group).unwrap().contains(entity));
    }

    #[test]
    fn test_group_membership_tracks_components() {
        let mut manager = EntityManager::new();
        let handle = manager.group::<(Position, Velocity)>();
        let entity = manager.create_entity();

        manager.add_component(entity, Position(0.0)).unwrap();
        assert!(!manager.get_group(handle).unwrap().contains(entity));

        manager.add_component(entity, Velocity(1.0)).unwrap();
        assert!(manager.get_group(handle).unwrap().contains(entity));

        manager.remove_component::<Position>(entity);
        assert!(!manager.get_group(handle).unwrap().contains(entity));
    }

    #[test]
    fn test_group_is_shared_and_backfilled() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.add_component(entity, Position(5.0)).unwrap();

        let first = manager.group::<(Position,)>();
        let second = manager.group::<(Position,)>();
        assert_eq!(first, second);
        assert_eq!(manager.group_count(), 1);

        let group = manager.get_group(first).unwrap();
        assert_eq!(group.entities(), &[entity]);
        assert_eq!(manager.group_handle(&GroupMatcher::of::<(Position,)>()), Some(first));
    }

    #[test]
    fn test_repeated_type_query_shares_single_type_group() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        manager.add_component(entity, Position(2.0)).unwrap();

        let doubled = manager.group::<(Position, Position)>();
        assert_eq!(manager.group::<(Position,)>(), doubled);
        assert_eq!(manager.group_count(), 1);

        manager.remove_component::<Position>(entity);
        assert!(manager.get_group(doubled).unwrap().is_empty());
    }

    #[test]
    fn test_set_refreshes_group_values() {
        let mut manager = EntityManager::new();
        let handle = manager.group::<(Position,)>();
        let entity = manager.create_entity();
        manager.add_component(entity, Position(1.0)).unwrap();

        manager.set_component(entity, Position(9.0)).unwrap();

        let group = manager.get_group(handle).unwrap();
        assert_eq!(group.storage::<Position>().unwrap().get(entity), Some(&Position(9.0)));
    }

    #[test]
    fn test_destroy_purges_groups_once() {
        let mut manager = EntityManager::new();
        let handle = manager.group::<(Position, Velocity)>();
        let entity = manager.create_entity();
        manager.add_component(entity, Position(0.0)).unwrap();
        manager.add_component(entity, Velocity(0.0)).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let removing_log = log.clone();
        let removed_log = log.clone();
        let group = manager.group_mut(handle).unwrap();
        group.removing_event().subscribe(Rc::new(move |_: &ComponentGroup, e: Entity| {
            removing_log.borrow_mut().push(format!("removing {}", e.id()));
        }));
        group.removed_event().subscribe(Rc::new(move |_: &ComponentGroup, e: Entity| {
            removed_log.borrow_mut().push(format!("removed {}", e.id()));
        }));

        assert!(manager.destroy_entity(entity));
        assert_eq!(*log.borrow(), vec!["removing 0", "removed 0"]);
        assert!(manager.get_group(handle).unwrap().is_empty());
        assert!(manager.components_of(entity).is_empty());
    }

    #[test]
    fn test_component_event_order() {
        let mut manager = EntityManager::new();
        let entity = manager.create_entity();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = log.clone();
        manager.component_events::<Position>().added.subscribe(Rc::new(
            move |_: Entity, p: &Position| l.borrow_mut().push(format!("added {}", p.0)),
        ));
        let l = log.clone();
        manager.component_events::<Position>().changed.subscribe(Rc::new(
            move |_: Entity, p: &Position| l.borrow_mut().push(format!("changed {}", p.0)),
        ));
        let l = log.clone();
        manager.component_events::<Position>().removing.subscribe(Rc::new(
            move |_: Entity, p: &Position| l.borrow_mut().push(format!("removing {}", p.0)),
        ));
        let l = log.clone();
        manager.component_events::<Position>().removed.subscribe(Rc::new(
            move |_: Entity, info: ComponentInfo| {
                l.borrow_mut().push(format!("removed {}", info.name().ends_with("Position")))
            },
        ));

        manager.add_component(entity, Position(1.0)).unwrap();
        manager.set_component(entity, Position(2.0)).unwrap();
        manager.remove_component::<Position>(entity);

        assert_eq!(
            *log.borrow(),
            vec!["added 1", "changed 2", "removing 2", "removed true"]
        );
    }

    #[test]
    fn test_any_component_events_scoped_to_entity() {
        let mut manager = EntityManager::new();
        let watched = manager.create_entity();
        let other = manager.create_entity();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        manager.any_component_events().added.subscribe_entity(
            watched,
            Rc::new(move |e: Entity, info: ComponentInfo, value: &dyn Any| {
                let is_position = value.downcast_ref::<Position>().is_some();
                sink.borrow_mut().push((e.id(), info.name().ends_with("Position"), is_position));
            }),
        );

        manager.add_component(other, Position(0.0)).unwrap();
        manager.add_component(watched, Position(0.0)).unwrap();
        manager.add_component(watched, Frozen).unwrap();

        assert_eq!(*seen.borrow(), vec![(watched.id(), true, true), (watched.id(), false, false)]);

        manager.destroy_entity(watched);
        assert_eq!(manager.any_component_events().added.scoped_entities(), 0);
    }

    #[test]
    fn test_targeted_mode_skips_unrelated_groups() {
        let mut manager = EntityManager::new();
        let frozen = manager.group::<(Frozen,)>();
        let entity = manager.create_entity();

        let joins = Rc::new(RefCell::new(0));
        let counter = joins.clone();
        let listener: Rc<dyn GroupListener> = Rc::new(move |_: &ComponentGroup, _: Entity| {
            *counter.borrow_mut() += 1;
        });
        manager.group_mut(frozen).unwrap().subscribe_added(listener);

        manager.add_component(entity, Position(0.0)).unwrap();
        manager.add_component(entity, Frozen).unwrap();
        manager.add_component(entity, Velocity(0.0)).unwrap();
        assert_eq!(*joins.borrow(), 1);
    }

    #[test]
    fn test_broadcast_mode_matches_targeted_membership() {
        let config = RuntimeConfig::default().with_inspect_mode(InspectMode::Broadcast);
        let mut manager = EntityManager::with_config(config);
        let both = manager.group::<(Position, Velocity)>();
        let pos = manager.group::<(Position,)>();

        let entity = manager.create_entity();
        manager.add_component(entity, Position(0.0)).unwrap();
        manager.add_component(entity, Velocity(0.0)).unwrap();
        manager.add_component(entity, Frozen).unwrap();
        assert!(manager.get_group(both).unwrap().contains(entity));
        assert!(manager.get_group(pos).unwrap().contains(entity));

        manager.remove_component::<Velocity>(entity);
        assert!(!manager.get_group(both).unwrap().contains(entity));
        assert!(manager.get_group(pos).unwrap().contains(entity));
    }

    #[test]
    fn test_group_keys() {
        let mut manager = EntityManager::new();
        let movers = manager.group::<(Position, Velocity)>();
        let frozen = manager.group::<(Frozen,)>();

        manager.bind_group_key("movers", movers).unwrap();
        manager.bind_group_key("movers", movers).unwrap();
        assert_eq!(manager.group_by_key("movers"), Some(movers));
        assert_eq!(manager.group_by_key("idle"), None);

        let err = manager.bind_group_key("movers", frozen).unwrap_err();
        assert!(matches!(err, InjectionError::TupleKeyConflict { .. }));
    }

    #[test]
    fn test_invalid_group_handle() {
        let manager = EntityManager::new();
        let bogus = GroupHandle(3);
        assert!(manager.get_group(bogus).is_none());
        assert!(matches!(manager.try_group(bogus), Err(EcsError::InvalidGroupHandle(_))));
    }

    #[test]
    fn test_clear_destroys_everything() {
        let mut manager = EntityManager::new();
        let handle = manager.group::<(Position,)>();
        for i in 0..5 {
            let entity = manager.create_entity();
            manager.add_component(entity, Position(i as f32)).unwrap();
        }

        manager.clear();
        assert_eq!(manager.entity_count(), 0);
        assert!(manager.storage::<Position>().unwrap().is_empty());
        assert!(manager.get_group(handle).unwrap().is_empty());
        assert_eq!(manager.entities().count(), 0);
    }
}
