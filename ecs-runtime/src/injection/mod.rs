//! Dependency injection
//!
//! - [`Container`]: constructor injection with singleton and per-instance
//!   lifetimes
//! - [`InjectFields`] and [`Injector`]: field injection of services and
//!   shared group queries into already built objects
//! - [`Module`] and [`bootstrap`]: explicit container setup from a list of
//!   modules

mod container;
mod fields;
mod module;

pub use container::{Container, Injectable, Lifetime, Resolver};
pub use fields::{Inject, InjectFields, Injector, Query, TupleKey};
pub use module::{bootstrap, FnModule, Module, ModuleRegistry, MODULE_API_VERSION};
