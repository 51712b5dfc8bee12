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

//! The persisted shape of the registry.

use crate::codec::SnapshotEncoding;
use lever_core::{SlotId, SubState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which snapshot a read or write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotScope {
    /// Process-wide settings shared by every save slot.
    Global,
    /// State tied to one save slot.
    Slot(SlotId),
}

impl SnapshotScope {
    /// Returns the store key of this scope's snapshot.
    pub fn path(&self, mod_id: &str, encoding: SnapshotEncoding) -> String {
        let ext = encoding.extension();
        match self {
            SnapshotScope::Global => format!("{mod_id}/global.{ext}"),
            SnapshotScope::Slot(slot) => format!("{mod_id}/slot-{}.{ext}", slot.0),
        }
    }
}

impl fmt::Display for SnapshotScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotScope::Global => write!(f, "global"),
            SnapshotScope::Slot(slot) => write!(f, "slot {slot}"),
        }
    }
}

/// One registered binding at snapshot time.
///
/// The identity is kept as a raw string so a record naming an unknown or
/// malformed identity can be skipped on its own without failing the decode
/// of the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRecord {
    /// The binding's identity.
    pub id: String,
    /// The binding's own sub-state, if it persists any.
    pub state: Option<SubState>,
    /// Whether the binding was applied when the snapshot was taken.
    pub was_applied: bool,
}

/// The per-slot snapshot: one record per registered binding, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlotSnapshot {
    /// The records, in registration order.
    pub records: Vec<BindingRecord>,
}

impl SlotSnapshot {
    /// Returns the record for `id`, if any.
    pub fn record(&self, id: &str) -> Option<&BindingRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the snapshot holds no record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
