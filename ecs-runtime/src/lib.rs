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
//! # ECS Runtime
//!
//! An Entity Component System runtime with component groups, lifecycle
//! events and a dependency injection container for wiring systems.
//!
//! ## Features
//!
//! - **Component storage**: one insertion-ordered storage per component type
//! - **Component groups**: shared, incrementally maintained queries over
//!   component sets
//! - **Lifecycle events**: added, removing, removed and changed events,
//!   global or scoped to one entity
//! - **Dependency injection**: constructor and field injection, singleton
//!   and per-instance lifetimes, cycle detection
//! - **Systems**: start, update and fixed-update hooks driven in order
//!
//! ## Example
//!
//! ```rust
//! use ecs_runtime::ecs::{Component, EntityManager};
//!
//! #[derive(Clone)]
//! struct Position(f32, f32);
//! impl Component for Position {}
//!
//! #[derive(Clone)]
//! struct Velocity(f32, f32);
//! impl Component for Velocity {}
//!
//! let mut manager = EntityManager::new();
//! let movers = manager.group::<(Position, Velocity)>();
//!
//! let entity = manager.create_entity();
//! manager.add_component(entity, Position(0.0, 0.0)).unwrap();
//! manager.add_component(entity, Velocity(1.0, 0.0)).unwrap();
//!
//! assert!(manager.get_group(movers).unwrap().contains(entity));
//! ```
//!
//! Everything runs on the calling thread; the runtime takes no locks.

#![warn(missing_docs)]

/// Runtime configuration
pub mod config;

/// Entity Component System implementation
pub mod ecs;

/// Error types
pub mod error;

/// Dependency injection container
pub mod injection;

pub use config::{ConfigError, InspectMode, RuntimeConfig};
pub use error::{EcsError, InjectionError};
