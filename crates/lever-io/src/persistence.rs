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

//! The save/load protocol that carries binding state across the host's save boundary.
//!
//! Saving walks the registry in order, mirrors each binding's applied flag into
//! its persisted copy and writes one record per binding. Loading walks the
//! records in order, replaces live bindings with freshly built ones and queues
//! a single replay task that re-applies the previously applied bindings once
//! the host reports that its primary actor exists.

use crate::codec::SnapshotEncoding;
use crate::error::PersistResult;
use crate::format::SnapshotFile;
use crate::settings::GlobalSettings;
use crate::snapshot::{BindingRecord, SlotSnapshot, SnapshotScope};
use lever_core::{BindingId, HostProbe, KeyValueStore, SlotId};
use lever_registry::{BindingCatalog, BindingManager, BindingTask};
use lever_scheduler::{Task, TaskHandle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The name the load-time replay task runs under.
///
/// A second load while a replay is still waiting replaces it.
pub const REPLAY_TASK: &str = "lever.replay";

/// A snapshot record that was not loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// The raw identity of the record.
    pub id: String,
    /// Why the record was skipped.
    pub reason: String,
}

/// The outcome of loading a per-slot snapshot.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Identities registered from the snapshot, in record order.
    pub registered: Vec<BindingId>,
    /// Records that were skipped.
    pub skipped: Vec<SkippedRecord>,
    /// Identities queued for re-apply, in record order.
    pub queued: Vec<BindingId>,
    /// The replay task, if anything was queued.
    pub replay: Option<TaskHandle>,
}

impl LoadReport {
    /// Returns `true` if the load registered nothing and skipped nothing.
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty() && self.skipped.is_empty()
    }

    fn skip(&mut self, record: &BindingRecord, reason: String) {
        self.skipped.push(SkippedRecord {
            id: record.id.clone(),
            reason,
        });
    }
}

/// Reads and writes the global and per-slot snapshots of one mod.
pub struct SettingsPersistence {
    store: Box<dyn KeyValueStore>,
    mod_id: String,
    encoding: SnapshotEncoding,
}

impl SettingsPersistence {
    /// Creates the protocol over a store, namespacing every path with `mod_id`.
    pub fn new<S>(store: S, mod_id: impl Into<String>, encoding: SnapshotEncoding) -> Self
    where
        S: KeyValueStore + 'static,
    {
        Self {
            store: Box::new(store),
            mod_id: mod_id.into(),
            encoding,
        }
    }

    /// Returns the namespace of persisted paths.
    pub fn mod_id(&self) -> &str {
        &self.mod_id
    }

    /// Returns the encoding new snapshots are written with.
    pub fn encoding(&self) -> SnapshotEncoding {
        self.encoding
    }

    /// Returns the store key of a scope.
    pub fn path(&self, scope: SnapshotScope) -> String {
        scope.path(&self.mod_id, self.encoding)
    }

    /// Encodes `value` and writes it as the snapshot of `scope`.
    pub fn write_scope<T: Serialize>(&self, scope: SnapshotScope, value: &T) -> PersistResult<()> {
        let payload = self.encoding.encode(value)?;
        let file = SnapshotFile::new(self.encoding, payload);
        self.store.write(&self.path(scope), &file.to_bytes())?;
        Ok(())
    }

    /// Reads and decodes the snapshot of `scope`.
    ///
    /// Returns `Ok(None)` if the scope was never written. The payload is
    /// decoded with the encoding recorded in its header.
    pub fn read_scope<T: DeserializeOwned>(
        &self,
        scope: SnapshotScope,
    ) -> PersistResult<Option<T>> {
        let path = self.path(scope);
        if !self.store.exists(&path) {
            return Ok(None);
        }
        let bytes = self.store.read(&path)?;
        let file = SnapshotFile::from_bytes(&bytes)?;
        file.header.encoding.decode(&file.payload).map(Some)
    }

    /// Writes the global settings.
    pub fn save_global(&self, settings: &GlobalSettings) -> PersistResult<()> {
        self.write_scope(SnapshotScope::Global, settings)?;
        log::info!("Saved global settings to '{}'.", self.path(SnapshotScope::Global));
        Ok(())
    }

    /// Loads the global settings, falling back to defaults on any failure.
    pub fn load_global(&self) -> GlobalSettings {
        match self.read_scope(SnapshotScope::Global) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                log::debug!("No global settings persisted yet; using defaults.");
                GlobalSettings::default()
            }
            Err(err) => {
                log::warn!("Ignoring unreadable global settings: {}", err);
                GlobalSettings::default()
            }
        }
    }

    /// Captures the registry into a snapshot, in registration order.
    ///
    /// Runs every binding's pre-serialization step first. A binding whose
    /// sub-state fails to export is recorded without it.
    pub fn capture(&self, manager: &mut BindingManager) -> SlotSnapshot {
        let records = manager
            .iter_mut()
            .map(|binding| {
                binding.prepare_for_save();
                let state = binding.export_state().unwrap_or_else(|err| {
                    log::warn!("Binding '{}' failed to export its state: {}", binding.id(), err);
                    None
                });
                BindingRecord {
                    id: binding.id().to_string(),
                    state,
                    was_applied: binding.was_applied(),
                }
            })
            .collect();
        SlotSnapshot { records }
    }

    /// Captures the registry and writes it as the snapshot of `slot`.
    pub fn try_save_slot(
        &self,
        slot: SlotId,
        manager: &mut BindingManager,
    ) -> PersistResult<SlotSnapshot> {
        let snapshot = self.capture(manager);
        self.write_scope(SnapshotScope::Slot(slot), &snapshot)?;
        log::info!("Saved {} binding record(s) for slot {}.", snapshot.len(), slot);
        Ok(snapshot)
    }

    /// Like [`try_save_slot`](Self::try_save_slot), but never fails.
    ///
    /// Errors are logged and the save step is abandoned, so a persistence
    /// failure never propagates into the host's own save pipeline.
    pub fn save_slot(&self, slot: SlotId, manager: &mut BindingManager) -> bool {
        match self.try_save_slot(slot, manager) {
            Ok(_) => true,
            Err(err) => {
                log::error!(
                    "Abandoning binding save for slot {} ({}): {}",
                    slot,
                    err.as_label(),
                    err
                );
                false
            }
        }
    }

    /// Reads the snapshot of `slot`.
    pub fn read_slot(&self, slot: SlotId) -> PersistResult<Option<SlotSnapshot>> {
        self.read_scope(SnapshotScope::Slot(slot))
    }

    /// Loads the snapshot of `slot` into the registry.
    ///
    /// An unreadable snapshot is logged and treated as empty.
    pub fn load_slot(
        &self,
        slot: SlotId,
        manager: &mut BindingManager,
        catalog: &BindingCatalog,
        settings: &GlobalSettings,
        probe: Arc<dyn HostProbe>,
    ) -> LoadReport {
        let snapshot = match self.read_slot(slot) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                log::debug!("Slot {} has no binding snapshot.", slot);
                return LoadReport::default();
            }
            Err(err) => {
                log::warn!("Ignoring unreadable binding snapshot of slot {}: {}", slot, err);
                return LoadReport::default();
            }
        };

        let report =
            restore_snapshot(&snapshot, manager, catalog, settings.replay_on_load, probe);
        log::info!(
            "Loaded slot {}: {} registered, {} skipped, {} queued for replay.",
            slot,
            report.registered.len(),
            report.skipped.len(),
            report.queued.len()
        );
        report
    }
}

impl fmt::Debug for SettingsPersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsPersistence")
            .field("mod_id", &self.mod_id)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

/// Replaces live bindings with the ones described by `snapshot`.
///
/// Records are processed in order. Each one is rebuilt through the catalog and
/// given its sub-state; a live binding with the same identity is then evicted
/// without being restored, since the host state it acted on has just been
/// replaced. Records that cannot be rebuilt are skipped individually.
///
/// When `replay` is set, previously applied bindings are re-applied, in record
/// order, by a task named [`REPLAY_TASK`] that waits until `probe` reports
/// that the primary actor exists.
pub fn restore_snapshot(
    snapshot: &SlotSnapshot,
    manager: &mut BindingManager,
    catalog: &BindingCatalog,
    replay: bool,
    probe: Arc<dyn HostProbe>,
) -> LoadReport {
    let mut report = LoadReport::default();

    for record in &snapshot.records {
        let mut binding = match catalog.create(&record.id) {
            Ok(binding) => binding,
            Err(err) => {
                log::warn!("Skipping binding record '{}': {}", record.id, err);
                report.skip(record, err.to_string());
                continue;
            }
        };

        if let Some(state) = &record.state {
            if let Err(err) = binding.import_state(state) {
                log::warn!("Skipping binding record '{}': malformed state: {}", record.id, err);
                report.skip(record, format!("malformed state: {err}"));
                continue;
            }
        }

        let id = binding.id().clone();
        let queue = replay && record.was_applied;
        if queue {
            binding.latch(true);
        }

        manager.evict(id.as_str());
        report.registered.retain(|known| *known != id);
        report.queued.retain(|known| *known != id);

        if let Err(err) = manager.register(binding) {
            log::warn!("Skipping binding record '{}': {}", record.id, err);
            report.skip(record, err.to_string());
            continue;
        }

        report.registered.push(id.clone());
        if queue {
            report.queued.push(id);
        }
    }

    if !report.queued.is_empty() {
        let task = replay_task(report.queued.clone(), probe);
        report.replay = Some(manager.spawner().spawn_named(task, REPLAY_TASK));
    }
    report
}

fn replay_task(ids: Vec<BindingId>, probe: Arc<dyn HostProbe>) -> BindingTask {
    Task::builder()
        .label("binding replay")
        .wait_until(move |_: &BindingManager| probe.is_actor_ready())
        .run(move |manager: &mut BindingManager| {
            for id in &ids {
                match manager.apply(id.as_str()) {
                    Ok(_) => log::debug!("Replayed binding '{}'.", id),
                    Err(err) => log::warn!("Failed to replay binding '{}': {}", id, err),
                }
            }
        })
        .build()
}
