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

use lever_core::{
    BindingEvent, BindingId, HookError, KeyValueStore, ManualProbe, SlotId, SubState,
};
use lever_io::{
    BindingRecord, FileStore, GlobalSettings, MemoryStore, PersistError, SettingsPersistence,
    SlotSnapshot, SnapshotEncoding, SnapshotScope, REPLAY_TASK,
};
use lever_registry::{Binding, BindingCatalog, BindingHooks, BindingManager, HookContext, Unhook};
use lever_scheduler::Scheduler;
use std::io;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);
const SLOT: SlotId = SlotId(1);

/// A binding with a persisted level and an observable effect.
struct Speed {
    level: u8,
    effect: Arc<AtomicI32>,
}

impl BindingHooks for Speed {
    fn install(&mut self, cx: &mut HookContext<'_>) -> Result<(), HookError> {
        self.effect.fetch_add(i32::from(self.level), Ordering::SeqCst);
        let effect = self.effect.clone();
        let level = i32::from(self.level);
        cx.track(Unhook::new("speed", move || {
            effect.fetch_sub(level, Ordering::SeqCst);
        }));
        Ok(())
    }

    fn export_state(&self) -> Result<Option<SubState>, HookError> {
        SubState::encode(&self.level).map(Some)
    }

    fn import_state(&mut self, state: &SubState) -> Result<(), HookError> {
        self.level = state.decode()?;
        Ok(())
    }
}

struct Plain;

impl BindingHooks for Plain {
    fn install(&mut self, _cx: &mut HookContext<'_>) -> Result<(), HookError> {
        Ok(())
    }
}

/// Everything a host integration owns, minus the host.
struct Harness {
    scheduler: Scheduler<BindingManager>,
    manager: BindingManager,
    catalog: BindingCatalog,
    probe: Arc<ManualProbe>,
    speed: Arc<AtomicI32>,
}

impl Harness {
    fn new() -> Self {
        let scheduler = Scheduler::new();
        let manager = BindingManager::new(scheduler.spawner());
        let speed = Arc::new(AtomicI32::new(0));
        let mut catalog = BindingCatalog::new();
        let effect = speed.clone();
        catalog
            .insert("assist.speed", move || {
                let hooks = Speed {
                    level: 1,
                    effect: effect.clone(),
                };
                Binding::new("assist.speed", "Speed", hooks)
            })
            .unwrap();
        catalog
            .insert("assist.map", || Binding::new("assist.map", "Map", Plain))
            .unwrap();
        catalog
            .insert_always_required("core.menu", || Binding::new("core.menu", "Menu", Plain))
            .unwrap();

        Self {
            scheduler,
            manager,
            catalog,
            probe: Arc::new(ManualProbe::new()),
            speed,
        }
    }

    fn register(&mut self, id: &str) {
        let binding = self.catalog.create(id).unwrap();
        self.manager.register(binding).unwrap();
    }

    fn load(&mut self, persistence: &SettingsPersistence) -> lever_io::LoadReport {
        let settings = GlobalSettings::default();
        persistence.load_slot(
            SLOT,
            &mut self.manager,
            &self.catalog,
            &settings,
            self.probe.clone(),
        )
    }

    fn run_ticks(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.scheduler.tick(&mut self.manager, FRAME);
        }
    }

    fn is_applied(&self, id: &str) -> bool {
        self.manager.get(id).unwrap().is_applied()
    }
}

fn id(raw: &str) -> BindingId {
    BindingId::new(raw).unwrap()
}

fn round_trip(persistence: SettingsPersistence) {
    let mut host = Harness::new();
    host.register("assist.speed");
    host.register("assist.map");
    host.manager.apply("assist.speed").unwrap();
    assert!(persistence.save_slot(SLOT, &mut host.manager));

    host.manager.clear();
    assert_eq!(host.speed.load(Ordering::SeqCst), 0);

    let report = host.load(&persistence);
    assert_eq!(report.registered, [id("assist.speed"), id("assist.map")]);
    assert_eq!(report.queued, [id("assist.speed")]);

    // Replay waits for the actor.
    host.run_ticks(3);
    assert!(!host.is_applied("assist.speed"));

    host.probe.set_actor_ready(true);
    host.run_ticks(1);

    assert!(host.is_applied("assist.speed"));
    assert!(!host.is_applied("assist.map"));
    assert_eq!(host.speed.load(Ordering::SeqCst), 1);
    assert!(report.replay.unwrap().is_finished());
}

#[test]
fn test_round_trip_in_memory_ron() {
    round_trip(SettingsPersistence::new(
        MemoryStore::new(),
        "assists",
        SnapshotEncoding::Ron,
    ));
}

#[test]
fn test_round_trip_on_disk_bincode() {
    let dir = tempfile::tempdir().unwrap();
    round_trip(SettingsPersistence::new(
        FileStore::new(dir.path()),
        "assists",
        SnapshotEncoding::Bincode,
    ));
    assert!(dir.path().join("assists/slot-1.bin").is_file());
}

#[test]
fn test_sub_state_survives_reload() {
    let store = MemoryStore::new();
    let persistence = SettingsPersistence::new(store.clone(), "assists", SnapshotEncoding::Ron);
    let mut host = Harness::new();
    let effect = host.speed.clone();
    host.manager
        .register(
            Binding::new(
                "assist.speed",
                "Speed",
                Speed {
                    level: 4,
                    effect,
                },
            )
            .unwrap(),
        )
        .unwrap();
    host.manager.apply("assist.speed").unwrap();
    persistence.save_slot(SLOT, &mut host.manager);
    host.manager.clear();

    host.probe.set_actor_ready(true);
    host.load(&persistence);
    host.run_ticks(1);

    assert_eq!(host.speed.load(Ordering::SeqCst), 4);
    let snapshot = persistence.read_slot(SLOT).unwrap().unwrap();
    assert_eq!(
        snapshot.record("assist.speed").unwrap().state,
        Some(SubState::from_raw("4"))
    );
}

#[test]
fn test_unknown_identity_is_skipped() {
    let persistence = SettingsPersistence::new(MemoryStore::new(), "assists", SnapshotEncoding::Ron);
    let snapshot = SlotSnapshot {
        records: vec![
            BindingRecord {
                id: "assist.removed".to_string(),
                state: None,
                was_applied: true,
            },
            BindingRecord {
                id: "assist.map".to_string(),
                state: None,
                was_applied: true,
            },
            BindingRecord {
                id: "".to_string(),
                state: None,
                was_applied: false,
            },
        ],
    };
    persistence
        .write_scope(SnapshotScope::Slot(SLOT), &snapshot)
        .unwrap();
    let mut host = Harness::new();
    host.probe.set_actor_ready(true);

    let report = host.load(&persistence);
    host.run_ticks(1);

    assert_eq!(report.registered, [id("assist.map")]);
    let skipped: Vec<_> = report.skipped.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(skipped, ["assist.removed", ""]);
    assert!(host.is_applied("assist.map"));
}

#[test]
fn test_replay_follows_record_order() {
    let persistence = SettingsPersistence::new(MemoryStore::new(), "assists", SnapshotEncoding::Ron);
    let snapshot = SlotSnapshot {
        records: vec![
            BindingRecord {
                id: "assist.map".to_string(),
                state: None,
                was_applied: true,
            },
            BindingRecord {
                id: "assist.speed".to_string(),
                state: None,
                was_applied: true,
            },
        ],
    };
    persistence
        .write_scope(SnapshotScope::Slot(SLOT), &snapshot)
        .unwrap();
    let mut host = Harness::new();
    host.register("assist.speed");
    host.register("assist.map");
    let events = host.manager.subscribe();

    let report = host.load(&persistence);
    host.probe.set_actor_ready(true);
    host.run_ticks(1);

    assert_eq!(report.queued, [id("assist.map"), id("assist.speed")]);
    let applied: Vec<_> = events
        .try_iter()
        .filter_map(|event| match event {
            BindingEvent::Applied(id) => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(applied, [id("assist.map"), id("assist.speed")]);
}

#[test]
fn test_malformed_state_is_skipped() {
    let persistence = SettingsPersistence::new(MemoryStore::new(), "assists", SnapshotEncoding::Ron);
    let snapshot = SlotSnapshot {
        records: vec![
            BindingRecord {
                id: "assist.speed".to_string(),
                state: Some(SubState::from_raw("\"fast\"")),
                was_applied: true,
            },
            BindingRecord {
                id: "assist.map".to_string(),
                state: None,
                was_applied: false,
            },
        ],
    };
    persistence
        .write_scope(SnapshotScope::Slot(SLOT), &snapshot)
        .unwrap();
    let mut host = Harness::new();

    let report = host.load(&persistence);

    assert_eq!(report.registered, [id("assist.map")]);
    assert!(report.skipped[0].reason.starts_with("malformed state"));
    assert!(report.replay.is_none());
}

#[test]
fn test_load_evicts_live_binding_without_restoring() {
    let store = MemoryStore::new();
    let persistence = SettingsPersistence::new(store, "assists", SnapshotEncoding::Ron);
    let mut host = Harness::new();
    host.register("assist.speed");
    persistence.save_slot(SLOT, &mut host.manager);
    host.manager.apply("assist.speed").unwrap();

    let report = host.load(&persistence);

    assert_eq!(report.registered, [id("assist.speed")]);
    assert!(!host.is_applied("assist.speed"));
    // The evicted instance was dropped without running its unhook.
    assert_eq!(host.speed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_replay_disabled_registers_only() {
    let persistence = SettingsPersistence::new(MemoryStore::new(), "assists", SnapshotEncoding::Ron);
    let mut host = Harness::new();
    host.register("assist.map");
    host.manager.apply("assist.map").unwrap();
    persistence.save_slot(SLOT, &mut host.manager);
    host.manager.clear();
    host.probe.set_actor_ready(true);

    let settings = GlobalSettings {
        replay_on_load: false,
        ..GlobalSettings::default()
    };
    let report = persistence.load_slot(
        SLOT,
        &mut host.manager,
        &host.catalog,
        &settings,
        host.probe.clone(),
    );
    host.run_ticks(2);

    assert_eq!(report.registered, [id("assist.map")]);
    assert!(report.queued.is_empty());
    assert!(!host.is_applied("assist.map"));
}

#[test]
fn test_second_load_replaces_pending_replay() {
    let persistence = SettingsPersistence::new(MemoryStore::new(), "assists", SnapshotEncoding::Ron);
    let mut host = Harness::new();
    host.register("assist.map");
    host.manager.apply("assist.map").unwrap();
    persistence.save_slot(SLOT, &mut host.manager);
    host.manager.clear();

    let first = host.load(&persistence).replay.unwrap();
    host.run_ticks(1);
    let second = host.load(&persistence).replay.unwrap();

    assert!(first.is_cancelled());
    assert!(second.is_alive());
    assert_eq!(second.name(), Some(REPLAY_TASK));
}

#[test]
fn test_saving_before_replay_keeps_applied_flag() {
    let persistence = SettingsPersistence::new(MemoryStore::new(), "assists", SnapshotEncoding::Ron);
    let mut host = Harness::new();
    host.register("assist.map");
    host.manager.apply("assist.map").unwrap();
    persistence.save_slot(SLOT, &mut host.manager);
    host.manager.clear();
    host.load(&persistence);

    let snapshot = persistence
        .try_save_slot(SLOT, &mut host.manager)
        .unwrap();

    assert!(snapshot.record("assist.map").unwrap().was_applied);
}

#[test]
fn test_teardown_snapshot_records_pre_teardown_state() {
    let persistence = SettingsPersistence::new(MemoryStore::new(), "assists", SnapshotEncoding::Ron);
    let mut host = Harness::new();
    host.manager.startup(&host.catalog).unwrap();
    host.register("assist.speed");
    host.register("assist.map");
    host.manager.apply("assist.speed").unwrap();

    host.manager.begin_teardown();
    let snapshot = persistence
        .try_save_slot(SLOT, &mut host.manager)
        .unwrap();
    host.manager.finish_teardown();

    let flags: Vec<_> = snapshot
        .records
        .iter()
        .map(|r| (r.id.as_str(), r.was_applied))
        .collect();
    assert_eq!(
        flags,
        [("core.menu", false), ("assist.speed", true), ("assist.map", false)]
    );
    assert_eq!(host.speed.load(Ordering::SeqCst), 0);
    assert!(host.manager.is_empty());
}

#[test]
fn test_global_settings_round_trip_and_fallback() {
    let store = MemoryStore::new();
    let persistence = SettingsPersistence::new(store.clone(), "assists", SnapshotEncoding::Ron);
    assert_eq!(persistence.load_global(), GlobalSettings::default());

    let settings = GlobalSettings {
        replay_on_load: false,
        announce_toggles: true,
    };
    persistence.save_global(&settings).unwrap();
    assert_eq!(persistence.load_global(), settings);

    store.write("assists/global.ron", b"garbage").unwrap();
    assert_eq!(persistence.load_global(), GlobalSettings::default());
}

#[test]
fn test_corrupt_slot_loads_as_empty() {
    let store = MemoryStore::new();
    store.write("assists/slot-1.ron", b"LEVERSNP\x01").unwrap();
    let persistence = SettingsPersistence::new(store, "assists", SnapshotEncoding::Ron);
    let mut host = Harness::new();

    let report = host.load(&persistence);

    assert!(report.is_empty());
    assert!(matches!(
        persistence.read_slot(SLOT),
        Err(PersistError::InvalidHeader(_))
    ));
}

/// A store whose disk is always full.
struct FullDisk;

impl KeyValueStore for FullDisk {
    fn write(&self, _key: &str, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::other("no space left on device"))
    }

    fn read(&self, _key: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::from(io::ErrorKind::NotFound))
    }

    fn exists(&self, _key: &str) -> bool {
        false
    }
}

#[test]
fn test_failed_save_is_abandoned_quietly() {
    let persistence = SettingsPersistence::new(FullDisk, "assists", SnapshotEncoding::Ron);
    let mut host = Harness::new();
    host.register("assist.map");

    assert!(!persistence.save_slot(SLOT, &mut host.manager));
    assert!(matches!(
        persistence.try_save_slot(SLOT, &mut host.manager),
        Err(PersistError::Io(_))
    ));
    assert!(host.manager.contains("assist.map"));
}
