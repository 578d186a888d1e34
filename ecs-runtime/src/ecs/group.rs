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
//! Component groups
//!
//! A [`ComponentGroup`] tracks the entities that own every component type
//! named by its [`GroupMatcher`]. Membership is maintained incrementally:
//! the entity manager calls [`ComponentGroup::inspect`] for one entity after
//! each mutation that could change its membership.
//!
//! Each group keeps its own copy of the matched components, one storage per
//! required type. All of a group's storages gain and lose entities together,
//! so position `i` names the same entity in every one of them.
//!
//! # Events
//!
//! - **added**: after an entity becomes a member (duplicate subscriptions
//!   are rejected)
//! - **removing**: before a member leaves; its values are still readable
//! - **removed**: after a member has left
//!
//! Removing and removed accept entity-scoped subscribers as well.

use crate::ecs::component::{AnyStorage, Component, ComponentArray, ComponentInfo};
use crate::ecs::events::{GroupListener, Listeners, ScopedEvent};
use crate::ecs::registry::ComponentRegistry;
use crate::ecs::Entity;
use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Index of a group inside its entity manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupHandle(pub(crate) usize);

impl GroupHandle {
    /// Position of the group in creation order
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Ordered set of component types that defines a query
///
/// Two matchers describe the same query when their type sequences are
/// equal. The polynomial hash (seed 5381, multiplier 33) is cached and only
/// feeds [`Hash`].
#[derive(Clone)]
pub struct GroupMatcher {
    types: Vec<ComponentInfo>,
    hash: u64,
}

impl GroupMatcher {
    /// Build a matcher from component types, in the given order
    ///
    /// Repeated types are dropped after their first occurrence.
    pub fn new(types: impl IntoIterator<Item = ComponentInfo>) -> Self {
        let mut unique: Vec<ComponentInfo> = Vec::new();
        for info in types {
            if !unique.contains(&info) {
                unique.push(info);
            }
        }
        let hash = Self::generate_hash(&unique);
        GroupMatcher {
            types: unique,
            hash,
        }
    }

    /// Matcher for a component set
    pub fn of<S: ComponentSet>() -> Self {
        Self::new(S::infos())
    }

    /// Polynomial hash over the ordered type identities
    pub fn generate_hash(types: &[ComponentInfo]) -> u64 {
        types.iter().fold(5381u64, |hash, info| {
            let mut hasher = DefaultHasher::new();
            info.type_id().hash(&mut hasher);
            hash.wrapping_mul(33).wrapping_add(hasher.finish())
        })
    }

    /// The cached hash value
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    /// Component types in order
    pub fn types(&self) -> &[ComponentInfo] {
        &self.types
    }

    /// Check if the type is required by this matcher
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.types.iter().any(|info| info.type_id() == type_id)
    }

    /// Number of required types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no type is required
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl PartialEq for GroupMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.types.len() == other.types.len()
            && self
                .types
                .iter()
                .zip(other.types.iter())
                .all(|(a, b)| a.type_id() == b.type_id())
    }
}

impl Eq for GroupMatcher {}

impl Hash for GroupMatcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for GroupMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, info) in self.types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(info.name())?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for GroupMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupMatcher{}", self)
    }
}

/// A tuple of component types usable as a group query
///
/// Implemented for tuples of one to six [`Component`] types.
pub trait ComponentSet: 'static {
    /// Component types in tuple order
    fn infos() -> Vec<ComponentInfo>;

    /// Ensure the entity manager has a storage for every type
    fn register(registry: &mut ComponentRegistry);

    /// Fresh, empty storages paired with their types, in tuple order
    fn storages() -> Vec<(ComponentInfo, Box<dyn AnyStorage>)>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn infos() -> Vec<ComponentInfo> {
                vec![$(ComponentInfo::of::<$name>()),+]
            }

            fn register(registry: &mut ComponentRegistry) {
                $(registry.register::<$name>();)+
            }

            fn storages() -> Vec<(ComponentInfo, Box<dyn AnyStorage>)> {
                vec![$((
                    ComponentInfo::of::<$name>(),
                    Box::new(ComponentArray::<$name>::new()) as Box<dyn AnyStorage>,
                )),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);

/// Outcome of inspecting one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Membership {
    /// Nothing changed
    Unchanged,
    /// The entity became a member
    Added,
    /// The entity stopped being a member
    Removed,
}

/// The set of entities owning every type of a [`GroupMatcher`]
pub struct ComponentGroup {
    handle: GroupHandle,
    matcher: GroupMatcher,
    storages: Vec<Box<dyn AnyStorage>>,
    added: Listeners<dyn GroupListener>,
    removing: ScopedEvent<dyn GroupListener>,
    removed: ScopedEvent<dyn GroupListener>,
}

impl ComponentGroup {
    /// Empty group for a component set
    ///
    /// A repeated type keeps only the storage of its first occurrence, in
    /// step with [`GroupMatcher::new`].
    pub(crate) fn of<S: ComponentSet>(handle: GroupHandle) -> Self {
        let mut types: Vec<ComponentInfo> = Vec::new();
        let mut storages = Vec::new();
        for (info, storage) in S::storages() {
            if !types.contains(&info) {
                types.push(info);
                storages.push(storage);
            }
        }
        Self::new(handle, GroupMatcher::new(types), storages)
    }

    fn new(
        handle: GroupHandle,
        matcher: GroupMatcher,
        storages: Vec<Box<dyn AnyStorage>>,
    ) -> Self {
        debug_assert_eq!(matcher.len(), storages.len());
        ComponentGroup {
            handle,
            matcher,
            storages,
            added: Listeners::new(),
            removing: ScopedEvent::new(),
            removed: ScopedEvent::new(),
        }
    }

    /// Handle of this group in its entity manager
    pub fn handle(&self) -> GroupHandle {
        self.handle
    }

    /// The query this group answers
    pub fn matcher(&self) -> &GroupMatcher {
        &self.matcher
    }

    /// Number of member entities
    pub fn len(&self) -> usize {
        self.storages.first().map_or(0, |storage| storage.len())
    }

    /// Check if the group has no members
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the entity is a member
    pub fn contains(&self, entity: Entity) -> bool {
        self.storages
            .first()
            .map_or(false, |storage| storage.contains(entity))
    }

    /// Members in the order they joined
    pub fn entities(&self) -> &[Entity] {
        self.storages
            .first()
            .map_or(&[] as &[Entity], |storage| storage.entity_list())
    }

    /// Member at a position
    pub fn entity_at(&self, index: usize) -> Option<Entity> {
        self.entities().get(index).copied()
    }

    /// Local storage of the group for component type `T`
    pub fn storage<T: Component>(&self) -> Option<&ComponentArray<T>> {
        self.storage_of(TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Local storage of the group by type identifier
    pub fn storage_of(&self, type_id: TypeId) -> Option<&dyn AnyStorage> {
        self.position_of(type_id)
            .map(|position| self.storages[position].as_ref())
    }

    fn position_of(&self, type_id: TypeId) -> Option<usize> {
        self.matcher
            .types()
            .iter()
            .position(|info| info.type_id() == type_id)
    }

    /// Subscribe to entities joining the group
    ///
    /// Returns `false` when the listener is already subscribed.
    pub fn subscribe_added(&mut self, listener: Rc<dyn GroupListener>) -> bool {
        let accepted = self.added.subscribe_unique(listener);
        if !accepted {
            tracing::warn!(group = %self.matcher, "rejected duplicate entity-added subscription");
        }
        accepted
    }

    /// Stop listening to entities joining the group
    pub fn unsubscribe_added(&mut self, listener: &Rc<dyn GroupListener>) -> bool {
        self.added.unsubscribe(listener)
    }

    /// Event raised before a member leaves
    pub fn removing_event(&mut self) -> &mut ScopedEvent<dyn GroupListener> {
        &mut self.removing
    }

    /// Event raised after a member has left
    pub fn removed_event(&mut self) -> &mut ScopedEvent<dyn GroupListener> {
        &mut self.removed
    }

    /// Re-evaluate membership of one entity
    ///
    /// Idempotent: with no change in between, a second call is a no-op.
    /// Entities that never owned any of the group's types are ignored.
    pub(crate) fn inspect(&mut self, entity: Entity, registry: &ComponentRegistry) -> Membership {
        for info in self.matcher.types() {
            if !registry.has_component(entity, info.type_id()) {
                if self.contains(entity) {
                    self.remove_entity(entity);
                    return Membership::Removed;
                }
                return Membership::Unchanged;
            }
        }
        self.add_entity(entity, registry)
    }

    /// Forward a changed value into the group's local storage
    ///
    /// Only members are updated; membership never changes here.
    pub(crate) fn update<T: Component>(&mut self, entity: Entity, component: &T) -> bool {
        let Some(position) = self.position_of(TypeId::of::<T>()) else {
            return false;
        };
        match self.storages[position].downcast_mut::<T>() {
            Some(storage) => storage.update(entity, component.clone()),
            None => false,
        }
    }

    fn add_entity(&mut self, entity: Entity, registry: &ComponentRegistry) -> Membership {
        let mut added = false;
        for (info, storage) in self.matcher.types.iter().zip(self.storages.iter_mut()) {
            if let Some(source) = registry.get(info.type_id()) {
                added |= storage.add_from(entity, source);
            }
        }
        if !added {
            return Membership::Unchanged;
        }

        tracing::trace!(group = %self.matcher, %entity, "entity joined group");
        for listener in self.added.snapshot() {
            listener.on_group_event(self, entity);
        }
        Membership::Added
    }

    fn remove_entity(&mut self, entity: Entity) {
        for listener in self.removing.snapshot(entity) {
            listener.on_group_event(self, entity);
        }

        let mut removed = false;
        for storage in &mut self.storages {
            removed |= storage.remove_entity(entity);
        }

        if removed {
            tracing::trace!(group = %self.matcher, %entity, "entity left group");
            for listener in self.removed.snapshot(entity) {
                listener.on_group_event(self, entity);
            }
        }
    }

    pub(crate) fn release_entity(&mut self, entity: Entity) {
        self.removing.release_entity(entity);
        self.removed.release_entity(entity);
    }
}

impl fmt::Debug for ComponentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentGroup")
            .field("handle", &self.handle)
            .field("matcher", &self.matcher)
            .field("members", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    struct Position(f32);
    impl Component for Position {}

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity(f32);
    impl Component for Velocity {}

    fn group_of<S: ComponentSet>(registry: &mut ComponentRegistry) -> ComponentGroup {
        S::register(registry);
        ComponentGroup::of::<S>(GroupHandle(0))
    }

    #[test]
    fn test_matcher_structural_equality() {
        let a = GroupMatcher::of::<(Position, Velocity)>();
        let b = GroupMatcher::of::<(Position, Velocity)>();
        let reversed = GroupMatcher::of::<(Velocity, Position)>();

        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
        assert_ne!(a, reversed);
        assert!(a.contains(TypeId::of::<Velocity>()));
    }

    #[test]
    fn test_matcher_hash_formula() {
        assert_eq!(GroupMatcher::generate_hash(&[]), 5381);

        let info = ComponentInfo::of::<Position>();
        let mut hasher = DefaultHasher::new();
        info.type_id().hash(&mut hasher);
        let expected = 5381u64.wrapping_mul(33).wrapping_add(hasher.finish());
        assert_eq!(GroupMatcher::generate_hash(&[info]), expected);
    }

    #[test]
    fn test_matcher_drops_repeated_types() {
        let matcher = GroupMatcher::new(vec![
            ComponentInfo::of::<Position>(),
            ComponentInfo::of::<Position>(),
            ComponentInfo::of::<Velocity>(),
        ]);
        assert_eq!(matcher.len(), 2);
        assert_eq!(matcher, GroupMatcher::of::<(Position, Velocity)>());
    }

    #[test]
    fn test_repeated_type_gets_one_storage() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position, Velocity, Position)>(&mut registry);
        assert_eq!(group.matcher(), &GroupMatcher::of::<(Position, Velocity)>());
        assert_eq!(group.storages.len(), 2);

        let entity = Entity::new(3);
        registry.register::<Position>().add(entity, Position(1.5));
        registry.register::<Velocity>().add(entity, Velocity(0.5));
        assert_eq!(group.inspect(entity, &registry), Membership::Added);
        assert_eq!(group.len(), 1);
        assert_eq!(group.storage::<Position>().unwrap().get(entity), Some(&Position(1.5)));

        registry.storage_mut::<Position>().unwrap().remove(entity);
        assert_eq!(group.inspect(entity, &registry), Membership::Removed);
        assert!(group.is_empty());
    }

    #[test]
    fn test_inspect_adds_and_removes() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position, Velocity)>(&mut registry);
        let entity = Entity::new(1);

        registry.register::<Position>().add(entity, Position(1.0));
        assert_eq!(group.inspect(entity, &registry), Membership::Unchanged);
        assert!(!group.contains(entity));

        registry.register::<Velocity>().add(entity, Velocity(2.0));
        assert_eq!(group.inspect(entity, &registry), Membership::Added);
        assert_eq!(group.storage::<Velocity>().unwrap().get(entity), Some(&Velocity(2.0)));

        registry.storage_mut::<Position>().unwrap().remove(entity);
        assert_eq!(group.inspect(entity, &registry), Membership::Removed);
        assert!(group.is_empty());
        assert!(group.storage::<Velocity>().unwrap().is_empty());
    }

    #[test]
    fn test_inspect_is_idempotent() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position,)>(&mut registry);
        let entity = Entity::new(4);
        let joins = Rc::new(RefCell::new(0));
        let counter = joins.clone();
        group.subscribe_added(Rc::new(move |_: &ComponentGroup, _: Entity| {
            *counter.borrow_mut() += 1;
        }));

        registry.register::<Position>().add(entity, Position(0.0));
        assert_eq!(group.inspect(entity, &registry), Membership::Added);
        assert_eq!(group.inspect(entity, &registry), Membership::Unchanged);
        assert_eq!(group.inspect(entity, &registry), Membership::Unchanged);
        assert_eq!(*joins.borrow(), 1);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_inspect_untracked_entity_is_noop() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position,)>(&mut registry);
        assert_eq!(group.inspect(Entity::new(99), &registry), Membership::Unchanged);
    }

    #[test]
    fn test_reinspect_refreshes_data() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position,)>(&mut registry);
        let entity = Entity::new(0);

        registry.register::<Position>().add(entity, Position(1.0));
        group.inspect(entity, &registry);
        registry.register::<Position>().update(entity, Position(5.0));
        group.inspect(entity, &registry);

        assert_eq!(group.storage::<Position>().unwrap()[0], Position(5.0));
    }

    #[test]
    fn test_update_only_touches_members() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position,)>(&mut registry);
        let member = Entity::new(0);

        registry.register::<Position>().add(member, Position(1.0));
        group.inspect(member, &registry);

        assert!(group.update(member, &Position(3.0)));
        assert!(!group.update(Entity::new(1), &Position(3.0)));
        assert!(!group.update(member, &Velocity(3.0)));
        assert_eq!(group.storage::<Position>().unwrap().get(member), Some(&Position(3.0)));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_removing_sees_member_removed_does_not() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position,)>(&mut registry);
        let entity = Entity::new(2);
        let log = Rc::new(RefCell::new(Vec::new()));

        let removing_log = log.clone();
        group.removing_event().subscribe(Rc::new(move |g: &ComponentGroup, e: Entity| {
            let value = g.storage::<Position>().and_then(|s| s.get(e)).cloned();
            removing_log.borrow_mut().push(format!("removing {:?} {}", value, g.contains(e)));
        }));
        let removed_log = log.clone();
        group.removed_event().subscribe(Rc::new(move |g: &ComponentGroup, e: Entity| {
            removed_log.borrow_mut().push(format!("removed {}", g.contains(e)));
        }));

        registry.register::<Position>().add(entity, Position(7.0));
        group.inspect(entity, &registry);
        registry.storage_mut::<Position>().unwrap().remove(entity);
        group.inspect(entity, &registry);
        group.inspect(entity, &registry);

        assert_eq!(
            *log.borrow(),
            vec!["removing Some(Position(7.0)) true", "removed false"]
        );
    }

    #[test]
    fn test_duplicate_added_subscription_rejected() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position,)>(&mut registry);
        let listener: Rc<dyn GroupListener> = Rc::new(|_: &ComponentGroup, _: Entity| {});

        assert!(group.subscribe_added(listener.clone()));
        assert!(!group.subscribe_added(listener.clone()));
        assert!(group.unsubscribe_added(&listener));
        assert!(!group.unsubscribe_added(&listener));
    }

    #[test]
    fn test_storages_stay_aligned() {
        let mut registry = ComponentRegistry::new();
        let mut group = group_of::<(Position, Velocity)>(&mut registry);

        for id in 0..4 {
            let entity = Entity::new(id);
            registry.register::<Position>().add(entity, Position(id as f32));
            registry.register::<Velocity>().add(entity, Velocity(id as f32 * 10.0));
            group.inspect(entity, &registry);
        }
        registry.storage_mut::<Velocity>().unwrap().remove(Entity::new(1));
        group.inspect(Entity::new(1), &registry);

        let positions = group.storage::<Position>().unwrap();
        let velocities = group.storage::<Velocity>().unwrap();
        for i in 0..group.len() {
            assert_eq!(positions.entity_at(i), velocities.entity_at(i));
            assert_eq!(positions[i].0 * 10.0, velocities[i].0);
        }
        assert_eq!(group.entities(), &[Entity::new(0), Entity::new(2), Entity::new(3)]);
    }
}
