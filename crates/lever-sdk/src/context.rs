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

//! The explicit context object a host integration owns.

use crate::config::LeverConfig;
use crate::signals::{HookId, SignalHooks};
use anyhow::{Context, Result};
use flume::Receiver;
use lever_core::{
    BindingEvent, HostProbe, HostSignal, KeyValueStore, LeverResult, SignalKind, SlotId,
};
use lever_io::{
    FileStore, GlobalSettings, LoadReport, PersistResult, SettingsPersistence, REPLAY_TASK,
};
use lever_registry::{Binding, BindingCatalog, BindingManager, BindingSummary};
use lever_scheduler::Scheduler;
use std::sync::Arc;
use std::time::Duration;

/// Holds the registry, the binding scheduler and the persistence state of one
/// mod, with an explicit init/teardown lifecycle.
///
/// All methods run on the host's update thread.
pub struct LeverContext {
    config: LeverConfig,
    catalog: BindingCatalog,
    scheduler: Scheduler<BindingManager>,
    manager: BindingManager,
    persistence: SettingsPersistence,
    settings: GlobalSettings,
    probe: Arc<dyn HostProbe>,
    signal_hooks: SignalHooks<BindingManager>,
    teardown_hook: Option<HookId>,
    announcements: Receiver<BindingEvent>,
    last_load: Option<LoadReport>,
}

impl LeverContext {
    /// Creates a context over an arbitrary store.
    ///
    /// Loads the global settings (falling back to defaults) and registers the
    /// catalog's always-required bindings.
    pub fn new<S>(
        config: LeverConfig,
        catalog: BindingCatalog,
        store: S,
        probe: Arc<dyn HostProbe>,
    ) -> Result<Self>
    where
        S: KeyValueStore + 'static,
    {
        let persistence = SettingsPersistence::new(store, config.mod_id.clone(), config.encoding);
        let settings = persistence.load_global();

        let scheduler = Scheduler::new();
        let mut manager = BindingManager::new(scheduler.spawner());
        let announcements = manager.subscribe();
        manager
            .startup(&catalog)
            .context("Failed to register the always-required bindings")?;

        log::info!(
            "Lever context '{}' ready with {} binding kind(s).",
            config.mod_id,
            catalog.len()
        );

        Ok(Self {
            config,
            catalog,
            scheduler,
            manager,
            persistence,
            settings,
            probe,
            signal_hooks: SignalHooks::new(),
            teardown_hook: None,
            announcements,
            last_load: None,
        })
    }

    /// Creates a context persisting below `config.data_dir`.
    pub fn with_file_store(
        config: LeverConfig,
        catalog: BindingCatalog,
        probe: Arc<dyn HostProbe>,
    ) -> Result<Self> {
        let store = FileStore::new(config.data_dir.clone());
        Self::new(config, catalog, store, probe)
    }

    /// Reacts to a host lifecycle signal.
    ///
    /// Built-in handling runs first, then every one-shot hook waiting for
    /// the signal's kind.
    pub fn on_signal(&mut self, signal: HostSignal) {
        log::debug!("Host signal: {:?}", signal);
        match signal {
            HostSignal::ReturningToMenuOrQuitting => self.begin_teardown(),
            HostSignal::SettingsAboutToBeSaved(slot) => {
                self.persistence.save_slot(slot, &mut self.manager);
            }
            HostSignal::SettingsSaved(_) => {}
            HostSignal::SaveSlotLoaded(slot) => {
                self.load_slot(slot);
            }
            HostSignal::ApplicationQuitting => {
                if let Err(err) = self.save_global() {
                    log::error!("Failed to save global settings: {}", err);
                }
            }
        }
        self.signal_hooks.fire(&signal, &mut self.manager);
    }

    /// Runs `action` against the registry on the next signal of `kind`.
    pub fn once<F>(&mut self, kind: SignalKind, action: F) -> HookId
    where
        F: FnOnce(&mut BindingManager, &HostSignal) + Send + 'static,
    {
        self.signal_hooks.once(kind, action)
    }

    /// Returns the number of one-shot hooks waiting for `kind`.
    pub fn pending_hooks(&self, kind: SignalKind) -> usize {
        self.signal_hooks.pending(kind)
    }

    /// Advances deferred binding work by one host tick.
    ///
    /// Returns the number of tasks that completed.
    pub fn tick(&mut self, dt: Duration) -> usize {
        let completed = self.scheduler.tick(&mut self.manager, dt);
        self.manager.flush_events();

        for event in self.announcements.try_iter() {
            if self.settings.announce_toggles {
                log::info!("{:?}", event);
            }
        }
        completed
    }

    /// Loads the snapshot of `slot`, re-registering the always-required set
    /// first if a teardown removed it.
    ///
    /// A teardown still waiting for its settings save is abandoned, so the
    /// next save of the loaded session does not clear it.
    pub fn load_slot(&mut self, slot: SlotId) -> &LoadReport {
        if let Some(hook) = self.teardown_hook.take() {
            self.signal_hooks.cancel(hook);
        }
        self.manager.cancel_teardown();
        if let Err(err) = self.manager.startup(&self.catalog) {
            log::error!("Failed to re-register the always-required bindings: {}", err);
        }
        let report = self.persistence.load_slot(
            slot,
            &mut self.manager,
            &self.catalog,
            &self.settings,
            self.probe.clone(),
        );
        self.last_load.insert(report)
    }

    /// Returns the outcome of the most recent slot load.
    pub fn last_load(&self) -> Option<&LoadReport> {
        self.last_load.as_ref()
    }

    /// Writes the global settings.
    pub fn save_global(&self) -> PersistResult<()> {
        self.persistence.save_global(&self.settings)
    }

    /// Describes every live binding for a toggle list, in registration order.
    pub fn list_registered(&self) -> Vec<BindingSummary> {
        self.manager.summaries(&*self.probe)
    }

    /// Applies the binding with the given display name.
    pub fn apply_by_name(&mut self, name: &str) -> LeverResult<bool> {
        self.manager.apply_by_name(name)
    }

    /// Restores the binding with the given display name.
    pub fn restore_by_name(&mut self, name: &str) -> LeverResult<bool> {
        self.manager.restore_by_name(name)
    }

    /// Registers a binding built outside the catalog.
    pub fn register(&mut self, binding: Binding) -> LeverResult<()> {
        self.manager.register(binding)
    }

    /// Subscribes to every registry event.
    pub fn subscribe(&mut self) -> Receiver<BindingEvent> {
        self.manager.subscribe()
    }

    /// Restores everything, drops pending work and clears the registry.
    pub fn shutdown(&mut self) {
        log::info!("Shutting down Lever context '{}'.", self.config.mod_id);
        self.scheduler.cancel_all();
        self.signal_hooks = SignalHooks::new();
        self.teardown_hook = None;
        self.manager.clear();
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LeverConfig {
        &self.config
    }

    /// Returns the catalog of known binding kinds.
    pub fn catalog(&self) -> &BindingCatalog {
        &self.catalog
    }

    /// Returns the registry.
    pub fn manager(&self) -> &BindingManager {
        &self.manager
    }

    /// Returns the registry, mutably.
    pub fn manager_mut(&mut self) -> &mut BindingManager {
        &mut self.manager
    }

    /// Returns the binding scheduler.
    pub fn scheduler(&self) -> &Scheduler<BindingManager> {
        &self.scheduler
    }

    /// Returns the persistence protocol.
    pub fn persistence(&self) -> &SettingsPersistence {
        &self.persistence
    }

    /// Returns the global settings.
    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Returns the global settings, mutably. Changes persist on quit.
    pub fn settings_mut(&mut self) -> &mut GlobalSettings {
        &mut self.settings
    }

    fn begin_teardown(&mut self) {
        if self.manager.is_teardown_pending() {
            log::debug!("Teardown already pending; ignoring repeated signal.");
            return;
        }
        self.scheduler.cancel_named(REPLAY_TASK);
        self.manager.begin_teardown();
        let hook = self.signal_hooks.once(SignalKind::SettingsSaved, |manager, _| {
            manager.finish_teardown();
        });
        self.teardown_hook = Some(hook);
    }
}

impl std::fmt::Debug for LeverContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeverContext")
            .field("config", &self.config)
            .field("manager", &self.manager)
            .field("pending_tasks", &self.scheduler.len())
            .field("signal_hooks", &self.signal_hooks)
            .finish_non_exhaustive()
    }
}
