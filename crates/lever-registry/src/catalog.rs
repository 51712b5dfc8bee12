// Copyright 2025 eraflo
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

//! The table of binding kinds a process knows how to construct.

use crate::binding::Binding;
use indexmap::IndexMap;
use lever_core::{BindingId, LeverError, LeverResult};
use std::fmt;

type Factory = Box<dyn Fn() -> LeverResult<Binding> + Send + Sync>;

struct CatalogEntry {
    always_required: bool,
    factory: Factory,
}

/// Maps binding identities to the factories that build them.
///
/// The catalog is filled once at process-configured points. Registry startup
/// builds every always-required kind from it, and snapshot loading rebuilds
/// each persisted record through it.
#[derive(Default)]
pub struct BindingCatalog {
    entries: IndexMap<BindingId, CatalogEntry>,
}

impl BindingCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a binding kind.
    pub fn insert<F>(&mut self, id: &str, factory: F) -> LeverResult<()>
    where
        F: Fn() -> LeverResult<Binding> + Send + Sync + 'static,
    {
        self.insert_entry(id, false, Box::new(factory))
    }

    /// Declares a binding kind that belongs to the fixed startup set.
    ///
    /// Bindings built from this entry are always marked as always required.
    pub fn insert_always_required<F>(&mut self, id: &str, factory: F) -> LeverResult<()>
    where
        F: Fn() -> LeverResult<Binding> + Send + Sync + 'static,
    {
        self.insert_entry(id, true, Box::new(factory))
    }

    /// Builds a fresh, restored binding of the given kind.
    pub fn create(&self, id: &str) -> LeverResult<Binding> {
        let Some((key, entry)) = self.entries.get_key_value(id) else {
            return Err(LeverError::UnknownIdentity { id: id.to_string() });
        };

        let binding = (entry.factory)()?;
        if binding.id() != key {
            return Err(LeverError::InvalidArgument(format!(
                "factory for '{key}' built a binding identified as '{}'",
                binding.id()
            )));
        }

        Ok(if entry.always_required {
            binding.always_required()
        } else {
            binding
        })
    }

    /// Returns `true` if the kind is known.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns `true` if the kind belongs to the fixed startup set.
    pub fn is_always_required(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .is_some_and(|entry| entry.always_required)
    }

    /// Iterates over the always-required identities in declaration order.
    pub fn always_required_ids(&self) -> impl Iterator<Item = &BindingId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.always_required)
            .map(|(id, _)| id)
    }

    /// Iterates over every known identity in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &BindingId> {
        self.entries.keys()
    }

    /// Returns the number of known kinds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no kind is known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert_entry(
        &mut self,
        id: &str,
        always_required: bool,
        factory: Factory,
    ) -> LeverResult<()> {
        let id = BindingId::new(id)?;
        if self.entries.contains_key(&id) {
            return Err(LeverError::AlreadyRegistered { id });
        }
        self.entries.insert(
            id,
            CatalogEntry {
                always_required,
                factory,
            },
        );
        Ok(())
    }
}

impl fmt::Debug for BindingCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
