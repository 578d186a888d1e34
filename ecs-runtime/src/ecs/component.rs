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
//! Component storage
//!
//! Components are plain data values attached to entities, at most one per
//! type per entity. Each component type is kept in a [`ComponentArray`], a
//! dense array that preserves insertion order so that systems can walk it by
//! position and ask for the entity at any position.
//!
//! [`AnyStorage`] is the object-safe face of a storage. The entity manager's
//! registry and every component group hold storages through it, keyed by
//! [`TypeId`].

use crate::ecs::Entity;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// Trait that all components must implement
///
/// Components should be plain data without behavior. They are cloned into
/// the local storages of the groups that match them, so keep them small.
pub trait Component: 'static + Clone + Send + Sync {}

/// Runtime identity of a component type
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentInfo {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentInfo {
    /// Identity of the component type `T`
    pub fn of<T: Component>() -> Self {
        ComponentInfo {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The [`TypeId`] of the component type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type name of the component type
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Type-erased capability interface over a [`ComponentArray`]
pub trait AnyStorage: Any {
    /// Identity of the stored component type
    fn info(&self) -> ComponentInfo;

    /// Check if the entity has a value in this storage
    fn contains(&self, entity: Entity) -> bool;

    /// Copy the entity's value out of `source`, a storage of the same type
    ///
    /// Returns `true` only for a genuinely new entry. An entity that is
    /// already stored has its value refreshed and yields `false`, as does an
    /// entity that `source` does not hold.
    fn add_from(&mut self, entity: Entity, source: &dyn AnyStorage) -> bool;

    /// Remove the entity's value; returns whether anything was removed
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Borrow the entity's value as `Any`
    fn get_any(&self, entity: Entity) -> Option<&dyn Any>;

    /// Number of stored values
    fn len(&self) -> usize;

    /// Check if the storage is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored entities in insertion order
    fn entity_list(&self) -> &[Entity];

    /// A new, empty storage for the same component type
    fn empty_like(&self) -> Box<dyn AnyStorage>;

    /// Upcast for downcasting to the concrete storage
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete storage
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<'a> dyn AnyStorage + 'a {
    /// Downcast to the typed storage
    pub fn downcast_ref<T: Component>(&self) -> Option<&ComponentArray<T>> {
        self.as_any().downcast_ref::<ComponentArray<T>>()
    }

    /// Mutably downcast to the typed storage
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut ComponentArray<T>> {
        self.as_any_mut().downcast_mut::<ComponentArray<T>>()
    }
}

/// Dense, insertion-ordered component storage
///
/// A sparse map from [`Entity`] to position sits beside two parallel arrays
/// (entities and values). Removal shifts later entries down so positions
/// keep insertion order; group storages rely on that to stay aligned with
/// each other.
///
/// # Example
///
/// ```
/// use ecs_runtime::ecs::{Component, ComponentArray, Entity};
///
/// #[derive(Clone)]
/// struct Health(u32);
/// impl Component for Health {}
///
/// let mut storage = ComponentArray::<Health>::new();
/// let entity = Entity::new(1);
///
/// assert!(storage.add(entity, Health(10)));
/// assert_eq!(storage.get(entity).unwrap().0, 10);
/// assert_eq!(storage.entity_at(0), Some(entity));
/// ```
pub struct ComponentArray<T: Component> {
    /// Mapping from entity to dense position
    entity_to_index: HashMap<Entity, usize>,
    /// Entity stored at each position
    entities: Vec<Entity>,
    /// Values stored at each position
    components: Vec<T>,
}

impl<T: Component> ComponentArray<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new storage with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ComponentArray {
            entity_to_index: HashMap::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            components: Vec::with_capacity(capacity),
        }
    }

    /// Get the number of stored values
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the storage is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Check if an entity has a value in this storage
    pub fn contains(&self, entity: Entity) -> bool {
        self.entity_to_index.contains_key(&entity)
    }

    /// Store a value for the entity
    ///
    /// Returns `true` when the entity was not stored before. An existing
    /// entry is overwritten in place and keeps its position.
    pub fn add(&mut self, entity: Entity, component: T) -> bool {
        if let Some(&index) = self.entity_to_index.get(&entity) {
            self.components[index] = component;
            false
        } else {
            self.entity_to_index.insert(entity, self.components.len());
            self.entities.push(entity);
            self.components.push(component);

            debug_assert_eq!(self.entity_to_index.len(), self.entities.len());
            debug_assert_eq!(self.entity_to_index.len(), self.components.len());
            true
        }
    }

    /// Overwrite the value of an entity that is already stored
    ///
    /// Returns `false` and stores nothing if the entity is absent.
    pub fn update(&mut self, entity: Entity, component: T) -> bool {
        match self.entity_to_index.get(&entity) {
            Some(&index) => {
                self.components[index] = component;
                true
            }
            None => false,
        }
    }

    /// Remove the entity's value, keeping the order of the others
    ///
    /// Insertion order is part of the contract, so this is O(n) in the
    /// number of entries after the removed one rather than a swap-remove.
    /// Draining a storage front to back is therefore quadratic.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.entity_to_index.remove(&entity)?;
        self.entities.remove(index);
        let component = self.components.remove(index);

        // Everything after the hole moved down by one
        for (offset, shifted) in self.entities[index..].iter().enumerate() {
            self.entity_to_index.insert(*shifted, index + offset);
        }

        debug_assert_eq!(self.entity_to_index.len(), self.entities.len());
        debug_assert_eq!(self.entity_to_index.len(), self.components.len());

        Some(component)
    }

    /// Get a reference to the entity's value
    pub fn get(&self, entity: Entity) -> Option<&T> {
        let index = self.entity_to_index.get(&entity)?;
        Some(&self.components[*index])
    }

    /// Get the position of an entity, if it is stored
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        self.entity_to_index.get(&entity).copied()
    }

    /// Get the entity stored at a position
    pub fn entity_at(&self, index: usize) -> Option<Entity> {
        self.entities.get(index).copied()
    }

    /// Get the value stored at a position
    pub fn at(&self, index: usize) -> Option<&T> {
        self.components.get(index)
    }

    /// Stored entities in insertion order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Stored values in insertion order
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Iterate over `(entity, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.entities.iter().copied().zip(self.components.iter())
    }
}

impl<T: Component> Default for ComponentArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> Index<usize> for ComponentArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.components[index]
    }
}

impl<T: Component> AnyStorage for ComponentArray<T> {
    fn info(&self) -> ComponentInfo {
        ComponentInfo::of::<T>()
    }

    fn contains(&self, entity: Entity) -> bool {
        ComponentArray::contains(self, entity)
    }

    fn add_from(&mut self, entity: Entity, source: &dyn AnyStorage) -> bool {
        let value = source
            .as_any()
            .downcast_ref::<ComponentArray<T>>()
            .and_then(|typed| typed.get(entity));
        match value {
            Some(value) => self.add(entity, value.clone()),
            None => false,
        }
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn get_any(&self, entity: Entity) -> Option<&dyn Any> {
        self.get(entity).map(|value| value as &dyn Any)
    }

    fn len(&self) -> usize {
        ComponentArray::len(self)
    }

    fn entity_list(&self) -> &[Entity] {
        &self.entities
    }

    fn empty_like(&self) -> Box<dyn AnyStorage> {
        Box::new(ComponentArray::<T>::new())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
