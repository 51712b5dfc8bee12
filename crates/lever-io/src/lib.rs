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

//! # Lever IO
//!
//! Persists binding state across the host's save boundary.
//!
//! Snapshots are stored in a small container format ([`SnapshotFile`]) whose
//! payload is encoded with RON or bincode ([`SnapshotEncoding`]). They live in
//! a [`KeyValueStore`](lever_core::KeyValueStore), either on disk
//! ([`FileStore`]) or in memory ([`MemoryStore`]).
//!
//! [`SettingsPersistence`] drives the protocol: it captures the registry into
//! a per-slot snapshot before the host writes its save, and replays a loaded
//! snapshot through the binding scheduler once the host is ready.

pub mod codec;
pub mod error;
pub mod format;
pub mod persistence;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use codec::SnapshotEncoding;
pub use error::{PersistError, PersistResult};
pub use format::{SnapshotFile, SnapshotHeader};
pub use persistence::{
    restore_snapshot, LoadReport, SettingsPersistence, SkippedRecord, REPLAY_TASK,
};
pub use settings::GlobalSettings;
pub use snapshot::{BindingRecord, SlotSnapshot, SnapshotScope};
pub use store::{FileStore, MemoryStore};
