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
//! Field injection
//!
//! An already constructed object declares the slots it wants filled by
//! implementing [`InjectFields`]. Service slots are [`Inject<T>`], group
//! query slots are [`Query<S>`]. Slots that already hold a value are left
//! untouched, so injecting twice is harmless.
//!
//! ```
//! use ecs_runtime::ecs::{Component, EntityManager};
//! use ecs_runtime::injection::{Container, InjectFields, Injector, Query, TupleKey};
//! use ecs_runtime::InjectionError;
//!
//! #[derive(Clone)]
//! struct Health(u32);
//! impl Component for Health {}
//!
//! #[derive(Default)]
//! struct Regeneration {
//!     living: Query<(Health,)>,
//! }
//!
//! impl InjectFields for Regeneration {
//!     fn inject_fields(&mut self, injector: &mut Injector<'_>) -> Result<(), InjectionError> {
//!         injector.tuple(&mut self.living, TupleKey::Named("living"))
//!     }
//! }
//!
//! let mut container = Container::new();
//! let mut manager = EntityManager::new();
//! let mut system = Regeneration::default();
//! system.inject_fields(&mut Injector::new(&mut container, &mut manager)).unwrap();
//! assert!(system.living.is_set());
//! ```

use crate::ecs::{Component, ComponentArray, ComponentGroup, ComponentSet, Entity, EntityManager, GroupHandle};
use crate::error::InjectionError;
use crate::injection::container::Container;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Slot for a service resolved from the container
pub struct Inject<T: ?Sized> {
    value: Option<Rc<T>>,
}

impl<T: ?Sized> Inject<T> {
    /// An unset slot
    pub fn new() -> Self {
        Inject { value: None }
    }

    /// A slot that already holds a value and will not be injected
    pub fn with(value: Rc<T>) -> Self {
        Inject { value: Some(value) }
    }

    /// Check if the slot holds a value
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// The injected value
    pub fn get(&self) -> Option<&T> {
        self.value.as_deref()
    }

    /// The injected handle
    pub fn rc(&self) -> Option<&Rc<T>> {
        self.value.as_ref()
    }

    fn fill(&mut self, value: Rc<T>) {
        self.value = Some(value);
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Inject {
            value: self.value.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("type", &std::any::type_name::<T>())
            .field("set", &self.is_set())
            .finish()
    }
}

/// How a query slot is matched to a shared group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TupleKey {
    /// Share by component set alone
    Shape,
    /// Share under a logical name
    Named(&'static str),
    /// Share under a numeric identifier
    Id(i32),
}

impl TupleKey {
    fn label(&self) -> Option<String> {
        match self {
            TupleKey::Shape => None,
            TupleKey::Named(name) => Some((*name).to_string()),
            TupleKey::Id(id) => Some(id.to_string()),
        }
    }
}

impl fmt::Display for TupleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleKey::Shape => f.write_str("<shape>"),
            TupleKey::Named(name) => write!(f, "'{}'", name),
            TupleKey::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// Slot for a shared group over component set `S`
pub struct Query<S: ComponentSet> {
    handle: Option<GroupHandle>,
    _marker: PhantomData<fn() -> S>,
}

impl<S: ComponentSet> Query<S> {
    /// An unset slot
    pub fn new() -> Self {
        Query {
            handle: None,
            _marker: PhantomData,
        }
    }

    /// Check if the slot is bound to a group
    pub fn is_set(&self) -> bool {
        self.handle.is_some()
    }

    /// Handle of the bound group
    pub fn handle(&self) -> Option<GroupHandle> {
        self.handle
    }

    /// The bound group
    pub fn group<'m>(&self, manager: &'m EntityManager) -> Option<&'m ComponentGroup> {
        manager.get_group(self.handle?)
    }

    /// The group's local storage for one of the set's types
    pub fn storage<'m, T: Component>(&self, manager: &'m EntityManager) -> Option<&'m ComponentArray<T>> {
        self.group(manager)?.storage::<T>()
    }

    /// Members of the bound group; empty while unset
    pub fn entities<'m>(&self, manager: &'m EntityManager) -> &'m [Entity] {
        self.group(manager).map_or(&[] as &[Entity], |group| group.entities())
    }
}

impl<S: ComponentSet> Default for Query<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ComponentSet> Clone for Query<S> {
    fn clone(&self) -> Self {
        Query {
            handle: self.handle,
            _marker: PhantomData,
        }
    }
}

impl<S: ComponentSet> fmt::Debug for Query<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query").field("handle", &self.handle).finish()
    }
}

/// Objects whose fields are filled after construction
pub trait InjectFields {
    /// Fill every unset slot through the injector
    fn inject_fields(&mut self, injector: &mut Injector<'_>) -> Result<(), InjectionError> {
        let _ = injector;
        Ok(())
    }
}

/// Fills [`Inject`] and [`Query`] slots
pub struct Injector<'a> {
    container: &'a mut Container,
    manager: &'a mut EntityManager,
}

impl<'a> Injector<'a> {
    /// Create an injector over a container and an entity manager
    pub fn new(container: &'a mut Container, manager: &'a mut EntityManager) -> Self {
        Injector { container, manager }
    }

    /// Resolve a service into the slot unless it is already set
    pub fn inject<T: ?Sized + 'static>(&mut self, slot: &mut Inject<T>) -> Result<(), InjectionError> {
        if slot.is_set() {
            return Ok(());
        }
        slot.fill(self.container.resolve::<T>()?);
        Ok(())
    }

    /// Bind the slot to the shared group for `S` unless it is already set
    ///
    /// A named or numeric key is recorded on first use; reusing it for a
    /// different component set is a [`InjectionError::TupleKeyConflict`].
    pub fn tuple<S: ComponentSet>(&mut self, query: &mut Query<S>, key: TupleKey) -> Result<(), InjectionError> {
        if query.is_set() {
            return Ok(());
        }

        let handle = self.manager.group::<S>();
        if let Some(label) = key.label() {
            self.manager.bind_group_key(&label, handle)?;
        }

        tracing::trace!(%key, group = handle.index(), "tuple injected");
        query.handle = Some(handle);
        Ok(())
    }

    /// Group previously bound under a key
    pub fn keyed_group(&self, key: TupleKey) -> Result<GroupHandle, InjectionError> {
        let label = key.label().ok_or_else(|| InjectionError::UnknownTupleKey {
            key: key.to_string(),
        })?;
        self.manager
            .group_by_key(&label)
            .ok_or(InjectionError::UnknownTupleKey { key: label })
    }
}
