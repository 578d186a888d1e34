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
//! Container bootstrap from modules
//!
//! A [`Module`] groups the registrations of one feature. The bootstrap takes
//! an exhaustive list of modules and installs them into a fresh container:
//!
//! - duplicate module names are rejected
//! - each module's API version must be compatible with [`MODULE_API_VERSION`]
//! - every declared dependency must be in the list
//! - modules are installed after their dependencies; ties keep list order
//! - circular dependencies are rejected
//!
//! # Example
//!
//! ```
//! use ecs_runtime::injection::{bootstrap, Container, FnModule, Lifetime};
//! use ecs_runtime::injection::{Injectable, Module, Resolver};
//! use ecs_runtime::InjectionError;
//!
//! struct Clock;
//! impl Injectable for Clock {
//!     fn construct(_: &mut Resolver<'_>) -> Result<Self, InjectionError> {
//!         Ok(Clock)
//!     }
//! }
//!
//! let modules: Vec<Box<dyn Module>> = vec![Box::new(FnModule::new("time", |container: &mut Container| {
//!     container.register::<Clock>(Lifetime::Singleton)
//! }))];
//!
//! let mut container = bootstrap(modules).unwrap();
//! assert!(container.resolve::<Clock>().is_ok());
//! ```

use crate::error::InjectionError;
use crate::injection::container::Container;
use semver::Version;
use std::collections::{HashMap, VecDeque};

/// Module API version supported by this runtime
pub const MODULE_API_VERSION: &str = "0.2.0";

/// A named bundle of container registrations
pub trait Module {
    /// Unique module name
    fn name(&self) -> &str;

    /// Module API version the module was written against
    fn api_version(&self) -> &str {
        MODULE_API_VERSION
    }

    /// Names of modules that must be installed first
    fn dependencies(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Add this module's registrations
    fn register(&self, container: &mut Container) -> Result<(), InjectionError>;
}

/// Module built from a closure
pub struct FnModule<F> {
    name: String,
    dependencies: Vec<String>,
    register: F,
}

impl<F> FnModule<F>
where
    F: Fn(&mut Container) -> Result<(), InjectionError>,
{
    /// Create a module without dependencies
    pub fn new(name: &str, register: F) -> Self {
        FnModule {
            name: name.to_string(),
            dependencies: Vec::new(),
            register,
        }
    }

    /// Declare a dependency on another module
    pub fn depends_on(mut self, module: &str) -> Self {
        self.dependencies.push(module.to_string());
        self
    }
}

impl<F> Module for FnModule<F>
where
    F: Fn(&mut Container) -> Result<(), InjectionError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<&str> {
        self.dependencies.iter().map(|s| s.as_str()).collect()
    }

    fn register(&self, container: &mut Container) -> Result<(), InjectionError> {
        (self.register)(container)
    }
}

/// Ordered collection of modules awaiting installation
pub struct ModuleRegistry {
    modules: Vec<Box<dyn Module>>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        ModuleRegistry {
            modules: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a module
    ///
    /// Fails if a module with the same name was already added or the module
    /// API version is incompatible.
    pub fn add(&mut self, module: Box<dyn Module>) -> Result<(), InjectionError> {
        let name = module.name().to_string();
        if self.index.contains_key(&name) {
            return Err(InjectionError::ModuleAlreadyRegistered { name });
        }

        let version = module.api_version();
        if !is_version_compatible(version, MODULE_API_VERSION) {
            return Err(InjectionError::IncompatibleModuleVersion {
                module: name,
                version: version.to_string(),
                expected: MODULE_API_VERSION,
            });
        }

        self.index.insert(name, self.modules.len());
        self.modules.push(module);
        Ok(())
    }

    /// Number of modules
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Module names in installation order
    pub fn load_order(&self) -> Result<Vec<&str>, InjectionError> {
        let order = self.sorted_indices()?;
        Ok(order.into_iter().map(|i| self.modules[i].name()).collect())
    }

    /// Install every module into the container, dependencies first
    pub fn install(&self, container: &mut Container) -> Result<(), InjectionError> {
        for index in self.sorted_indices()? {
            let module = &self.modules[index];
            module.register(container)?;
            tracing::debug!(module = module.name(), "module installed");
        }
        Ok(())
    }

    fn sorted_indices(&self) -> Result<Vec<usize>, InjectionError> {
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.modules.len()];
        let mut in_degree: Vec<usize> = vec![0; self.modules.len()];

        for (index, module) in self.modules.iter().enumerate() {
            for dependency in module.dependencies() {
                let Some(&target) = self.index.get(dependency) else {
                    return Err(InjectionError::MissingModuleDependency {
                        module: module.name().to_string(),
                        dependency: dependency.to_string(),
                    });
                };
                dependents[target].push(index);
                in_degree[index] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..self.modules.len())
            .filter(|&index| in_degree[index] == 0)
            .collect();
        let mut sorted = Vec::with_capacity(self.modules.len());

        while let Some(index) = queue.pop_front() {
            sorted.push(index);
            for &dependent in &dependents[index] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if sorted.len() != self.modules.len() {
            return Err(InjectionError::ModuleCycle);
        }
        Ok(sorted)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a container from an exhaustive list of modules
pub fn bootstrap<I>(modules: I) -> Result<Container, InjectionError>
where
    I: IntoIterator<Item = Box<dyn Module>>,
{
    let mut registry = ModuleRegistry::new();
    for module in modules {
        registry.add(module)?;
    }

    let mut container = Container::new();
    registry.install(&mut container)?;
    tracing::info!(
        modules = registry.module_count(),
        services = container.len(),
        "container bootstrapped"
    );
    Ok(container)
}

/// Check if a module API version is compatible with the runtime
///
/// - Major version must match
/// - For 0.x.y, minor versions must match
/// - For 1.0.0 and later, the module minor version must not exceed the runtime's
/// - Patch version is ignored
fn is_version_compatible(module_version: &str, runtime_version: &str) -> bool {
    let (Ok(module), Ok(runtime)) = (Version::parse(module_version), Version::parse(runtime_version)) else {
        return false;
    };

    if module.major != runtime.major {
        return false;
    }
    if module.major != 0 {
        module.minor <= runtime.minor
    } else {
        module.minor == runtime.minor
    }
}
