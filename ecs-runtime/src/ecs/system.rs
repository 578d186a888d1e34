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
//! System execution framework
//!
//! Systems contain the logic that operates on entities and components.
//! They are wired once through the injection container when added to the
//! [`SystemRoot`], then driven once per tick through their start, update
//! and fixed-update hooks in the order they were added.

use crate::ecs::EntityManager;
use crate::error::EcsError;
use crate::injection::{Container, InjectFields, Injectable, Injector};

/// Trait for systems driven by a [`SystemRoot`]
///
/// Every hook defaults to a no-op. Fields are injected through the
/// [`InjectFields`] supertrait before the first hook runs.
pub trait System: InjectFields {
    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Diagnostic label used to list related systems together
    fn debug_group(&self) -> Option<&str> {
        None
    }

    /// Called once by [`SystemRoot::start`]
    fn on_start(&mut self, _manager: &mut EntityManager) -> Result<(), EcsError> {
        Ok(())
    }

    /// Called every frame
    fn on_update(&mut self, _manager: &mut EntityManager) -> Result<(), EcsError> {
        Ok(())
    }

    /// Called every fixed simulation step
    fn on_fixed_update(&mut self, _manager: &mut EntityManager) -> Result<(), EcsError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    Start,
    Update,
    FixedUpdate,
}

impl Hook {
    fn label(self) -> &'static str {
        match self {
            Hook::Start => "start",
            Hook::Update => "update",
            Hook::FixedUpdate => "fixed_update",
        }
    }
}

/// Ordered collection of systems
///
/// A failing hook is logged and reported, and the remaining systems still
/// run.
pub struct SystemRoot {
    systems: Vec<Box<dyn System>>,
}

impl SystemRoot {
    /// Create an empty root
    pub fn new() -> Self {
        SystemRoot {
            systems: Vec::new(),
        }
    }

    /// Inject a system's fields and append it
    pub fn add_system<S: System + 'static>(
        &mut self,
        system: S,
        container: &mut Container,
        manager: &mut EntityManager,
    ) -> Result<(), EcsError> {
        self.add_boxed(Box::new(system), container, manager)
    }

    /// Inject a boxed system's fields and append it
    pub fn add_boxed(
        &mut self,
        mut system: Box<dyn System>,
        container: &mut Container,
        manager: &mut EntityManager,
    ) -> Result<(), EcsError> {
        system.inject_fields(&mut Injector::new(container, manager))?;
        tracing::debug!(system = system.name(), group = ?system.debug_group(), "system added");
        self.systems.push(system);
        Ok(())
    }

    /// Construct a system through the container and append it
    pub fn create_system<S: System + Injectable>(
        &mut self,
        container: &mut Container,
        manager: &mut EntityManager,
    ) -> Result<(), EcsError> {
        let system = container.create_object::<S>(manager)?;
        tracing::debug!(system = system.name(), "system created");
        self.systems.push(Box::new(system));
        Ok(())
    }

    /// Remove the first system with the given name
    pub fn remove_system(&mut self, name: &str) -> bool {
        match self.systems.iter().position(|s| s.name() == name) {
            Some(index) => {
                self.systems.remove(index);
                tracing::debug!(system = name, "system removed");
                true
            }
            None => false,
        }
    }

    /// Get the number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// System names in execution order
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Names of the systems carrying a debug group label
    pub fn systems_in_group(&self, group: &str) -> Vec<&str> {
        self.systems
            .iter()
            .filter(|s| s.debug_group() == Some(group))
            .map(|s| s.name())
            .collect()
    }

    /// Run every start hook
    pub fn start(&mut self, manager: &mut EntityManager) -> Vec<EcsError> {
        self.run(Hook::Start, manager)
    }

    /// Run every update hook
    pub fn update(&mut self, manager: &mut EntityManager) -> Vec<EcsError> {
        self.run(Hook::Update, manager)
    }

    /// Run every fixed-update hook
    pub fn fixed_update(&mut self, manager: &mut EntityManager) -> Vec<EcsError> {
        self.run(Hook::FixedUpdate, manager)
    }

    fn run(&mut self, hook: Hook, manager: &mut EntityManager) -> Vec<EcsError> {
        let mut errors = Vec::new();
        for system in &mut self.systems {
            let result = match hook {
                Hook::Start => system.on_start(manager),
                Hook::Update => system.on_update(manager),
                Hook::FixedUpdate => system.on_fixed_update(manager),
            };
            if let Err(err) = result {
                tracing::error!(system = system.name(), hook = hook.label(), error = %err, "system hook failed");
                errors.push(err);
            }
        }
        errors
    }
}

impl Default for SystemRoot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InjectionError;
    use crate::injection::Resolver;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        fail_update: bool,
    }

    impl InjectFields for Recorder {}

    impl System for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        fn debug_group(&self) -> Option<&str> {
            Some("recorders")
        }

        fn on_start(&mut self, _manager: &mut EntityManager) -> Result<(), EcsError> {
            self.log.borrow_mut().push(format!("{} start", self.label));
            Ok(())
        }

        fn on_update(&mut self, _manager: &mut EntityManager) -> Result<(), EcsError> {
            if self.fail_update {
                return Err(EcsError::System {
                    system: self.label.to_string(),
                    message: "boom".to_string(),
                });
            }
            self.log.borrow_mut().push(format!("{} update", self.label));
            Ok(())
        }
    }

    fn recorder(label: &'static str, log: &Rc<RefCell<Vec<String>>>, fail_update: bool) -> Recorder {
        Recorder {
            label,
            log: log.clone(),
            fail_update,
        }
    }

    #[derive(Default)]
    struct Spawner;

    impl InjectFields for Spawner {}

    impl Injectable for Spawner {
        fn construct(_: &mut Resolver<'_>) -> Result<Self, InjectionError> {
            Ok(Spawner)
        }
    }

    impl System for Spawner {
        fn on_fixed_update(&mut self, manager: &mut EntityManager) -> Result<(), EcsError> {
            manager.create_entity();
            Ok(())
        }
    }

    #[test]
    fn test_hooks_run_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut container = Container::new();
        let mut manager = EntityManager::new();
        let mut root = SystemRoot::new();

        root.add_system(recorder("b", &log, false), &mut container, &mut manager).unwrap();
        root.add_system(recorder("a", &log, false), &mut container, &mut manager).unwrap();
        assert_eq!(root.system_names(), vec!["b", "a"]);

        assert!(root.start(&mut manager).is_empty());
        assert!(root.update(&mut manager).is_empty());
        assert_eq!(*log.borrow(), vec!["b start", "a start", "b update", "a update"]);
    }

    #[test]
    fn test_failing_hook_does_not_stop_others() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut container = Container::new();
        let mut manager = EntityManager::new();
        let mut root = SystemRoot::new();

        root.add_system(recorder("bad", &log, true), &mut container, &mut manager).unwrap();
        root.add_system(recorder("good", &log, false), &mut container, &mut manager).unwrap();

        let errors = root.update(&mut manager);
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], EcsError::System { system, .. } if system == "bad"));
        assert_eq!(*log.borrow(), vec!["good update"]);
    }

    #[test]
    fn test_remove_and_groups() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut container = Container::new();
        let mut manager = EntityManager::new();
        let mut root = SystemRoot::new();

        root.add_system(recorder("x", &log, false), &mut container, &mut manager).unwrap();
        root.add_system(recorder("y", &log, false), &mut container, &mut manager).unwrap();
        assert_eq!(root.systems_in_group("recorders"), vec!["x", "y"]);

        assert!(root.remove_system("x"));
        assert!(!root.remove_system("x"));
        assert_eq!(root.system_count(), 1);
    }

    #[test]
    fn test_create_system_through_container() {
        let mut container = Container::new();
        let mut manager = EntityManager::new();
        let mut root = SystemRoot::new();

        root.create_system::<Spawner>(&mut container, &mut manager).unwrap();
        assert!(container.is_registered::<Spawner>());

        root.fixed_update(&mut manager);
        root.fixed_update(&mut manager);
        assert_eq!(manager.entity_count(), 2);
        assert!(root.system_names()[0].ends_with("Spawner"));
    }
}
