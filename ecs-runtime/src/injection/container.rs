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
//! Dependency injection container
//!
//! The container has two phases. During registration each type is bound to
//! a factory and a [`Lifetime`]. During resolution the factory of the
//! requested type runs, resolving its own dependencies through the
//! [`Resolver`] it is handed, so graphs of any depth are built without
//! caring about registration order.
//!
//! The resolver keeps the chain of types under construction. Requesting a
//! type that is already on the chain fails with
//! [`InjectionError::DependencyCycle`] instead of recursing forever.
//!
//! # Example
//!
//! ```
//! use ecs_runtime::injection::{Container, Injectable, Lifetime, Resolver};
//! use ecs_runtime::InjectionError;
//! use std::rc::Rc;
//!
//! struct Clock;
//! impl Injectable for Clock {
//!     fn construct(_: &mut Resolver<'_>) -> Result<Self, InjectionError> {
//!         Ok(Clock)
//!     }
//! }
//!
//! struct Scheduler {
//!     clock: Rc<Clock>,
//! }
//! impl Injectable for Scheduler {
//!     fn construct(resolver: &mut Resolver<'_>) -> Result<Self, InjectionError> {
//!         Ok(Scheduler { clock: resolver.resolve()? })
//!     }
//! }
//!
//! let mut container = Container::new();
//! container.register::<Clock>(Lifetime::Singleton).unwrap();
//! container.register::<Scheduler>(Lifetime::PerInstance).unwrap();
//!
//! let a = container.resolve::<Scheduler>().unwrap();
//! let b = container.resolve::<Scheduler>().unwrap();
//! assert!(!Rc::ptr_eq(&a, &b));
//! assert!(Rc::ptr_eq(&a.clock, &b.clock));
//! ```

use crate::ecs::EntityManager;
use crate::error::InjectionError;
use crate::injection::fields::{InjectFields, Injector};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

/// How instances of a registration are reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One shared instance, created on first resolution
    Singleton,
    /// A fresh instance on every resolution
    PerInstance,
}

/// A type the container can build from its own registrations
pub trait Injectable: Sized + 'static {
    /// Build an instance, resolving constructor dependencies
    fn construct(resolver: &mut Resolver<'_>) -> Result<Self, InjectionError>;
}

type Factory = Rc<dyn Fn(&mut Resolver<'_>) -> Result<Box<dyn Any>, InjectionError>>;

fn factory<F>(build: F) -> Factory
where
    F: Fn(&mut Resolver<'_>) -> Result<Box<dyn Any>, InjectionError> + 'static,
{
    Rc::new(build)
}

struct Registration {
    type_name: &'static str,
    lifetime: Lifetime,
    factory: Factory,
    // Holds an `Rc<T>` once a singleton has been built
    instance: Option<Box<dyn Any>>,
}

/// Registration table and singleton cache
pub struct Container {
    registrations: HashMap<TypeId, Registration>,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Container {
            registrations: HashMap::new(),
        }
    }

    /// Register a constructible type under its own type
    pub fn register<T: Injectable>(&mut self, lifetime: Lifetime) -> Result<(), InjectionError> {
        self.insert::<T>(
            lifetime,
            factory(|resolver| Ok(Box::new(Rc::new(T::construct(resolver)?)))),
            None,
        )
    }

    /// Register a constructible type `C` as the implementation of `I`
    ///
    /// `upcast` converts the concrete handle, usually `|c| c` for a trait
    /// object target.
    pub fn register_as<I, C>(
        &mut self,
        lifetime: Lifetime,
        upcast: fn(Rc<C>) -> Rc<I>,
    ) -> Result<(), InjectionError>
    where
        I: ?Sized + 'static,
        C: Injectable,
    {
        self.insert::<I>(
            lifetime,
            factory(move |resolver| {
                let concrete = Rc::new(C::construct(resolver)?);
                Ok(Box::new(upcast(concrete)))
            }),
            None,
        )
    }

    /// Register a factory closure for `T`
    pub fn register_factory<T, F>(&mut self, lifetime: Lifetime, build: F) -> Result<(), InjectionError>
    where
        T: ?Sized + 'static,
        F: Fn(&mut Resolver<'_>) -> Result<Rc<T>, InjectionError> + 'static,
    {
        self.insert::<T>(
            lifetime,
            self::factory(move |resolver| Ok(Box::new(build(resolver)?))),
            None,
        )
    }

    /// Register an existing instance as a singleton
    pub fn register_instance<T: ?Sized + 'static>(&mut self, instance: Rc<T>) -> Result<(), InjectionError> {
        let shared = instance.clone();
        self.insert::<T>(
            Lifetime::Singleton,
            factory(move |_| Ok(Box::new(shared.clone()))),
            Some(Box::new(instance)),
        )
    }

    fn insert<T: ?Sized + 'static>(
        &mut self,
        lifetime: Lifetime,
        factory: Factory,
        instance: Option<Box<dyn Any>>,
    ) -> Result<(), InjectionError> {
        let type_id = TypeId::of::<T>();
        if self.registrations.contains_key(&type_id) {
            return Err(InjectionError::AlreadyRegistered {
                type_name: type_name::<T>(),
            });
        }

        tracing::debug!(service = type_name::<T>(), ?lifetime, "service registered");
        self.registrations.insert(
            type_id,
            Registration {
                type_name: type_name::<T>(),
                lifetime,
                factory,
                instance,
            },
        );
        Ok(())
    }

    /// Check if `T` has a registration
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.registrations.contains_key(&TypeId::of::<T>())
    }

    /// Lifetime of the registration for `T`
    pub fn lifetime_of<T: ?Sized + 'static>(&self) -> Option<Lifetime> {
        self.registrations
            .get(&TypeId::of::<T>())
            .map(|registration| registration.lifetime)
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Names of the registered types, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .registrations
            .values()
            .map(|registration| registration.type_name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Resolve an instance of `T`
    ///
    /// Fails with [`InjectionError::TypeNotRegistered`] when `T` or any of
    /// its transitive dependencies has no registration.
    pub fn resolve<T: ?Sized + 'static>(&mut self) -> Result<Rc<T>, InjectionError> {
        Resolver::new(self).resolve::<T>()
    }

    /// Build a fresh `T` through its registration and fill its injectable fields
    ///
    /// `T` is registered as [`Lifetime::PerInstance`] if it has no
    /// registration yet; a registered factory is used as is. The value is
    /// returned by ownership, so a Singleton registration, or a factory that
    /// hands out an instance it keeps a handle to, fails with
    /// [`InjectionError::SharedInstance`].
    pub fn create_object<T>(&mut self, manager: &mut EntityManager) -> Result<T, InjectionError>
    where
        T: Injectable + InjectFields,
    {
        let shared = InjectionError::SharedInstance {
            type_name: type_name::<T>(),
        };
        match self.lifetime_of::<T>() {
            None => self.register::<T>(Lifetime::PerInstance)?,
            Some(Lifetime::PerInstance) => {}
            Some(Lifetime::Singleton) => return Err(shared),
        }

        let mut object = Rc::try_unwrap(self.resolve::<T>()?).map_err(|_| shared)?;

        object.inject_fields(&mut Injector::new(self, manager))?;
        tracing::trace!(object = type_name::<T>(), "object created");
        Ok(object)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolution context handed to factories and constructors
pub struct Resolver<'c> {
    container: &'c mut Container,
    stack: Vec<(TypeId, &'static str)>,
}

impl<'c> Resolver<'c> {
    fn new(container: &'c mut Container) -> Self {
        Resolver {
            container,
            stack: Vec::new(),
        }
    }

    /// Resolve a dependency of the type currently being built
    pub fn resolve<T: ?Sized + 'static>(&mut self) -> Result<Rc<T>, InjectionError> {
        let type_id = TypeId::of::<T>();
        let registration = self
            .container
            .registrations
            .get(&type_id)
            .ok_or(InjectionError::TypeNotRegistered {
                type_name: type_name::<T>(),
            })?;

        if let Some(cached) = &registration.instance {
            if let Some(instance) = cached.downcast_ref::<Rc<T>>() {
                return Ok(instance.clone());
            }
        }

        let factory = registration.factory.clone();
        let lifetime = registration.lifetime;

        self.enter::<T>()?;
        let built = factory(self);
        self.leave();

        let instance = *built?
            .downcast::<Rc<T>>()
            .map_err(|_| InjectionError::Construction {
                type_name: type_name::<T>(),
                message: "factory produced a value of another type".to_string(),
            })?;

        if lifetime == Lifetime::Singleton {
            if let Some(registration) = self.container.registrations.get_mut(&type_id) {
                registration.instance = Some(Box::new(instance.clone()));
            }
            tracing::debug!(service = type_name::<T>(), "singleton instantiated");
        }
        Ok(instance)
    }

    fn enter<T: ?Sized + 'static>(&mut self) -> Result<(), InjectionError> {
        let type_id = TypeId::of::<T>();
        if let Some(start) = self.stack.iter().position(|(id, _)| *id == type_id) {
            let mut path: Vec<&'static str> = self.stack[start..].iter().map(|(_, name)| *name).collect();
            path.push(type_name::<T>());
            let err = InjectionError::DependencyCycle { path };
            tracing::error!(%err, "dependency resolution aborted");
            return Err(err);
        }
        self.stack.push((type_id, type_name::<T>()));
        Ok(())
    }

    fn leave(&mut self) {
        self.stack.pop();
    }
}
