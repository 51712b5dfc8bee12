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

use crate::binding::Binding;
use lever_core::{BindingId, HostProbe, Verdict};
use serde::Serialize;

/// A toggle-list row describing one live binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingSummary {
    /// The binding's identity.
    pub id: BindingId,
    /// The binding's display name.
    pub name: String,
    /// Whether the binding is currently applied.
    pub is_applied: bool,
    /// Whether the binding can never be deregistered.
    pub always_required: bool,
    /// Whether applying should be offered, and why not.
    pub can_apply: Verdict,
    /// Whether restoring should be offered, and why not.
    pub can_restore: Verdict,
}

impl BindingSummary {
    /// Describes `binding` against the current host state.
    pub fn describe(binding: &Binding, probe: &dyn HostProbe) -> Self {
        Self {
            id: binding.id().clone(),
            name: binding.name().to_string(),
            is_applied: binding.is_applied(),
            always_required: binding.is_always_required(),
            can_apply: binding.can_be_applied(probe),
            can_restore: binding.can_be_restored(probe),
        }
    }
}
