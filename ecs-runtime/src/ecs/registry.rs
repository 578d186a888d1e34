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
//! Type-keyed storage registry
//!
//! One boxed [`ComponentArray`] per component type, created the first time
//! the type is needed. Storages are kept in registration order so that
//! whole-entity operations (destroying an entity) visit them
//! deterministically.

use crate::ecs::component::{AnyStorage, Component, ComponentArray, ComponentInfo};
use crate::ecs::Entity;
use std::any::TypeId;
use std::collections::HashMap;

/// Arena of erased component storages keyed by component type
pub struct ComponentRegistry {
    storages: Vec<Box<dyn AnyStorage>>,
    index: HashMap<TypeId, usize>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        ComponentRegistry {
            storages: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Get the storage for `T`, creating it if this is the first use
    pub fn register<T: Component>(&mut self) -> &mut ComponentArray<T> {
        let type_id = TypeId::of::<T>();
        let slot = match self.index.get(&type_id) {
            Some(&slot) => slot,
            None => {
                tracing::trace!(component = std::any::type_name::<T>(), "registering component storage");
                self.storages.push(Box::new(ComponentArray::<T>::new()));
                self.index.insert(type_id, self.storages.len() - 1);
                self.storages.len() - 1
            }
        };
        self.storages[slot]
            .downcast_mut::<T>()
            .expect("storage slot keyed by its own TypeId")
    }

    /// Check if a storage exists for the type
    pub fn is_registered(&self, type_id: TypeId) -> bool {
        self.index.contains_key(&type_id)
    }

    /// Typed access to the storage for `T`
    pub fn storage<T: Component>(&self) -> Option<&ComponentArray<T>> {
        self.get(TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Mutable typed access to the storage for `T`
    pub fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentArray<T>> {
        self.get_mut(TypeId::of::<T>())?.downcast_mut::<T>()
    }

    /// Erased access by type identifier
    pub fn get(&self, type_id: TypeId) -> Option<&dyn AnyStorage> {
        let slot = *self.index.get(&type_id)?;
        Some(self.storages[slot].as_ref())
    }

    /// Mutable erased access by type identifier
    pub fn get_mut(&mut self, type_id: TypeId) -> Option<&mut dyn AnyStorage> {
        let slot = *self.index.get(&type_id)?;
        Some(self.storages[slot].as_mut())
    }

    /// Check if the entity owns a component of the given type
    pub fn has_component(&self, entity: Entity, type_id: TypeId) -> bool {
        self.get(type_id).map_or(false, |storage| storage.contains(entity))
    }

    /// Types of every component the entity owns, in registration order
    pub fn components_of(&self, entity: Entity) -> Vec<ComponentInfo> {
        self.storages
            .iter()
            .filter(|storage| storage.contains(entity))
            .map(|storage| storage.info())
            .collect()
    }

    /// Number of registered component types
    pub fn len(&self) -> usize {
        self.storages.len()
    }

    /// Check if no component type has been registered
    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
