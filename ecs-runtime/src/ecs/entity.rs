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
//! Entity identity
//!
//! Entities are opaque handles. They carry no data of their own and are
//! only meaningful as keys into component storages.

use std::fmt;

/// Unique identifier for an entity
///
/// Two entities are equal exactly when their identifiers are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u32);

impl Entity {
    /// Create an entity handle from a raw identifier
    pub fn new(id: u32) -> Self {
        Entity(id)
    }

    /// Get the raw identifier
    pub fn id(&self) -> u32 {
        self.0
    }

    /// Identifier as a dense slot index
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
