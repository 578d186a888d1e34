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
//! Error types
//!
//! Entity and component operations report [`EcsError`]; the injection
//! container and module bootstrap report [`InjectionError`]. Neither is
//! retried internally.

use crate::ecs::{Entity, GroupHandle};
use thiserror::Error;

/// Errors raised by the entity manager and the system root
#[derive(Debug, Error)]
pub enum EcsError {
    /// The entity was never created or has been destroyed
    #[error("{0} is not alive")]
    EntityNotAlive(Entity),

    /// The entity does not own a component of the requested type
    #[error("{entity} has no component of type {component}")]
    MissingComponent {
        /// Entity that was queried
        entity: Entity,
        /// Requested component type name
        component: &'static str,
    },

    /// The handle does not name a group of this manager
    #[error("group handle {0:?} is not valid for this entity manager")]
    InvalidGroupHandle(GroupHandle),

    /// A system hook reported a failure
    #[error("system '{system}' failed: {message}")]
    System {
        /// Name of the failing system
        system: String,
        /// Failure description
        message: String,
    },

    /// Wiring a system through the container failed
    #[error(transparent)]
    Injection(#[from] InjectionError),
}

/// Errors raised while registering or resolving dependencies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    /// The requested type has no registration
    #[error("the type {type_name} has not been registered")]
    TypeNotRegistered {
        /// Requested type name
        type_name: &'static str,
    },

    /// The type already has a registration
    #[error("the type {type_name} is already registered")]
    AlreadyRegistered {
        /// Registered type name
        type_name: &'static str,
    },

    /// An owned object was requested for a type that resolves to a shared instance
    #[error("the type {type_name} resolves to a shared instance and cannot be created as an owned object")]
    SharedInstance {
        /// Requested type name
        type_name: &'static str,
    },

    /// Constructor dependencies revisit a type before it completes
    #[error("dependency cycle detected: {}", path.join(" -> "))]
    DependencyCycle {
        /// Resolution chain, ending with the revisited type
        path: Vec<&'static str>,
    },

    /// No system declared a tuple under this key
    #[error("no tuple group is registered under key {key}")]
    UnknownTupleKey {
        /// Requested key
        key: String,
    },

    /// A tuple key is already bound to a different component set
    #[error("tuple key {key} is bound to {existing}, cannot rebind to {requested}")]
    TupleKeyConflict {
        /// Conflicting key
        key: String,
        /// Matcher the key is bound to
        existing: String,
        /// Matcher that was requested
        requested: String,
    },

    /// A module with this name was already added
    #[error("module '{name}' is already registered")]
    ModuleAlreadyRegistered {
        /// Module name
        name: String,
    },

    /// A module depends on a module that was not supplied
    #[error("module '{module}' depends on '{dependency}' which is not registered")]
    MissingModuleDependency {
        /// Dependent module
        module: String,
        /// Missing dependency
        dependency: String,
    },

    /// Module dependencies form a cycle
    #[error("circular dependency detected in module dependencies")]
    ModuleCycle,

    /// Module API version cannot be used with this runtime
    #[error("module '{module}' API version {version} is incompatible with runtime API version {expected}")]
    IncompatibleModuleVersion {
        /// Module name
        module: String,
        /// Declared version
        version: String,
        /// Runtime version
        expected: &'static str,
    },

    /// A factory failed to build its instance
    #[error("failed to construct {type_name}: {message}")]
    Construction {
        /// Type being constructed
        type_name: &'static str,
        /// Failure description
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = InjectionError::DependencyCycle {
            path: vec!["A", "B", "A"],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: A -> B -> A");
    }

    #[test]
    fn test_injection_error_converts() {
        let err: EcsError = InjectionError::TypeNotRegistered { type_name: "Foo" }.into();
        assert!(matches!(err, EcsError::Injection(_)));
        assert!(err.to_string().contains("not been registered"));
    }
}
