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

//! The registry holding at most one live binding per identity.

use crate::binding::Binding;
use crate::catalog::BindingCatalog;
use crate::summary::BindingSummary;
use flume::{Receiver, Sender};
use indexmap::IndexMap;
use lever_core::{
    BindingEvent, BindingId, EventFanout, HostProbe, LeverError, LeverResult, SubscriptionId,
};
use lever_scheduler::Spawner;

struct Entry {
    binding: Binding,
    subscription: SubscriptionId,
}

/// Owns every live binding and mediates their lifecycle.
///
/// Each registered binding is subscribed exactly once; its `Applied` and
/// `Restored` events are relayed, together with the registry's own
/// `Registered` and `Deregistered` events, to every registry subscriber.
/// Iteration follows registration order.
///
/// The manager is also the world the binding scheduler runs its tasks
/// against, so deferred steps receive `&mut BindingManager`.
pub struct BindingManager {
    entries: IndexMap<BindingId, Entry>,
    relay_tx: Sender<BindingEvent>,
    relay_rx: Receiver<BindingEvent>,
    events: EventFanout<BindingEvent>,
    spawner: Spawner<BindingManager>,
    teardown_pending: bool,
}

impl BindingManager {
    /// Creates an empty registry whose hooks defer work through `spawner`.
    pub fn new(spawner: Spawner<BindingManager>) -> Self {
        let (relay_tx, relay_rx) = flume::unbounded();
        Self {
            entries: IndexMap::new(),
            relay_tx,
            relay_rx,
            events: EventFanout::new(),
            spawner,
            teardown_pending: false,
        }
    }

    /// Returns the spawner feeding the binding scheduler.
    pub fn spawner(&self) -> &Spawner<BindingManager> {
        &self.spawner
    }

    /// Registers every always-required kind of the catalog that is not live yet.
    ///
    /// Returns the number of bindings registered.
    pub fn startup(&mut self, catalog: &BindingCatalog) -> LeverResult<usize> {
        let mut registered = 0;
        for id in catalog.always_required_ids() {
            if self.entries.contains_key(id) {
                continue;
            }
            self.register(catalog.create(id.as_str())?)?;
            registered += 1;
        }
        log::info!("Registry started with {} always-required binding(s).", registered);
        Ok(registered)
    }

    /// Adds a binding to the registry.
    ///
    /// Fails with [`LeverError::AlreadyRegistered`] if a binding with the same
    /// identity is live; the existing binding is left untouched.
    ///
    /// A binding that is already applied, such as one evicted earlier, is
    /// announced with `Applied` right after `Registered`.
    pub fn register(&mut self, mut binding: Binding) -> LeverResult<()> {
        if self.entries.contains_key(binding.id()) {
            return Err(LeverError::AlreadyRegistered {
                id: binding.id().clone(),
            });
        }

        let id = binding.id().clone();
        let applied = binding.is_applied();
        let subscription = binding.subscribe(self.relay_tx.clone());
        self.entries.insert(
            id.clone(),
            Entry {
                binding,
                subscription,
            },
        );
        log::info!("Registered binding '{}'.", id);

        self.flush_events();
        self.events.publish(BindingEvent::Registered(id.clone()));
        if applied {
            self.events.publish(BindingEvent::Applied(id));
        }
        Ok(())
    }

    /// Restores and removes a binding.
    ///
    /// Returns `Ok(None)` if nothing is registered under `id`. Fails with
    /// [`LeverError::Protected`] for always-required bindings, and with the
    /// hook's error if restoring fails, leaving the binding registered.
    pub fn deregister(&mut self, id: &str) -> LeverResult<Option<Binding>> {
        let Some(entry) = self.entries.get_mut(id) else {
            return Ok(None);
        };
        if entry.binding.is_always_required() {
            return Err(LeverError::Protected {
                id: entry.binding.id().clone(),
            });
        }

        let restored = entry.binding.restore(&self.spawner);
        if let Err(err) = restored {
            self.flush_events();
            return Err(err);
        }

        let binding = self.detach(id);
        if let Some(binding) = &binding {
            log::info!("Deregistered binding '{}'.", binding.id());
        }
        Ok(binding)
    }

    /// Removes a binding without restoring it.
    ///
    /// Used when the host state the binding acted upon has been replaced
    /// wholesale, so there is nothing live left to undo. Always-required
    /// bindings can be evicted.
    pub fn evict(&mut self, id: &str) -> Option<Binding> {
        let binding = self.detach(id);
        if let Some(binding) = &binding {
            log::debug!("Evicted binding '{}' without restoring it.", binding.id());
        }
        binding
    }

    /// Applies the binding registered under `id`.
    ///
    /// Returns `Ok(false)` if it was already applied.
    pub fn apply(&mut self, id: &str) -> LeverResult<bool> {
        let entry = self.entries.get_mut(id).ok_or_else(|| not_registered(id))?;
        let result = entry.binding.apply(&self.spawner);
        self.flush_events();
        result
    }

    /// Restores the binding registered under `id`.
    ///
    /// Returns `Ok(false)` if it was not applied.
    pub fn restore(&mut self, id: &str) -> LeverResult<bool> {
        let entry = self.entries.get_mut(id).ok_or_else(|| not_registered(id))?;
        let result = entry.binding.restore(&self.spawner);
        self.flush_events();
        result
    }

    /// Applies the binding with the given display name.
    pub fn apply_by_name(&mut self, name: &str) -> LeverResult<bool> {
        let id = self.id_of(name)?;
        self.apply(id.as_str())
    }

    /// Restores the binding with the given display name.
    pub fn restore_by_name(&mut self, name: &str) -> LeverResult<bool> {
        let id = self.id_of(name)?;
        self.restore(id.as_str())
    }

    /// Restores every applied binding, in registration order.
    ///
    /// Failures are logged and do not stop the sweep. Returns the number of
    /// bindings that were restored.
    pub fn restore_all(&mut self) -> usize {
        let mut restored = 0;
        for entry in self.entries.values_mut() {
            match entry.binding.restore(&self.spawner) {
                Ok(true) => restored += 1,
                Ok(false) => {}
                Err(err) => log::warn!("Failed to restore during sweep: {}", err),
            }
        }
        self.flush_events();
        restored
    }

    /// Starts the save-boundary teardown.
    ///
    /// Every binding is restored immediately, latching its pre-teardown
    /// applied state for the upcoming settings save. The bindings stay
    /// registered until [`finish_teardown`](BindingManager::finish_teardown).
    pub fn begin_teardown(&mut self) {
        log::info!(
            "Beginning teardown of {} binding(s); clearing is deferred until settings are saved.",
            self.entries.len()
        );
        for entry in self.entries.values_mut() {
            if let Err(err) = entry.binding.suspend(&self.spawner) {
                log::warn!("Failed to restore during teardown: {}", err);
            }
        }
        self.teardown_pending = true;
        self.flush_events();
    }

    /// Completes a pending teardown by clearing the registry.
    ///
    /// Returns `false` if no teardown was pending.
    pub fn finish_teardown(&mut self) -> bool {
        if !self.teardown_pending {
            return false;
        }
        self.clear();
        log::info!("Teardown finished.");
        true
    }

    /// Abandons a pending teardown without clearing the registry.
    ///
    /// Bindings stay restored and their persisted flags follow their applied
    /// state again. Returns `false` if no teardown was pending.
    pub fn cancel_teardown(&mut self) -> bool {
        if !self.teardown_pending {
            return false;
        }
        for entry in self.entries.values_mut() {
            entry.binding.release_latch();
        }
        self.teardown_pending = false;
        log::info!("Teardown abandoned; {} binding(s) kept.", self.entries.len());
        true
    }

    /// Returns `true` between `begin_teardown` and `finish_teardown`.
    pub fn is_teardown_pending(&self) -> bool {
        self.teardown_pending
    }

    /// Restores, unsubscribes and removes every binding, protected ones included.
    pub fn clear(&mut self) {
        self.restore_all();
        let ids: Vec<BindingId> = self.entries.keys().cloned().collect();
        for id in ids {
            self.detach(id.as_str());
        }
        self.teardown_pending = false;
    }

    /// Returns the live binding registered under `id`.
    pub fn get(&self, id: &str) -> Option<&Binding> {
        self.entries.get(id).map(|entry| &entry.binding)
    }

    /// Returns the live binding registered under `id`, mutably.
    ///
    /// Lifecycle calls made through this reference are relayed on the next
    /// [`flush_events`](BindingManager::flush_events).
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Binding> {
        self.entries.get_mut(id).map(|entry| &mut entry.binding)
    }

    /// Finds a live binding by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Binding> {
        self.iter().find(|binding| binding.name() == name)
    }

    /// Returns `true` if a binding is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Returns the number of live bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no binding is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over live bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.entries.values().map(|entry| &entry.binding)
    }

    /// Iterates mutably over live bindings in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Binding> {
        self.entries.values_mut().map(|entry| &mut entry.binding)
    }

    /// Returns the live identities in registration order.
    pub fn ids(&self) -> Vec<BindingId> {
        self.entries.keys().cloned().collect()
    }

    /// Describes every live binding for a toggle list, in registration order.
    pub fn summaries(&self, probe: &dyn HostProbe) -> Vec<BindingSummary> {
        self.iter()
            .map(|binding| BindingSummary::describe(binding, probe))
            .collect()
    }

    /// Subscribes to every registry event.
    ///
    /// Dropping the receiver detaches the subscriber on the next event.
    pub fn subscribe(&mut self) -> Receiver<BindingEvent> {
        let (_, receiver) = self.events.subscribe();
        receiver
    }

    /// Forwards every registry event to an existing sender.
    pub fn subscribe_with(&mut self, sender: Sender<BindingEvent>) -> SubscriptionId {
        self.events.attach(sender)
    }

    /// Detaches a subscriber added with `subscribe_with`.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.events.detach(subscription)
    }

    /// Relays pending binding events to registry subscribers.
    ///
    /// Returns the number of events relayed.
    pub fn flush_events(&mut self) -> usize {
        let mut relayed = 0;
        while let Ok(event) = self.relay_rx.try_recv() {
            self.events.publish(event);
            relayed += 1;
        }
        relayed
    }

    fn detach(&mut self, id: &str) -> Option<Binding> {
        let Entry {
            mut binding,
            subscription,
        } = self.entries.shift_remove(id)?;
        binding.unsubscribe(subscription);
        self.flush_events();
        self.events
            .publish(BindingEvent::Deregistered(binding.id().clone()));
        Some(binding)
    }

    fn id_of(&self, name: &str) -> LeverResult<BindingId> {
        self.find_by_name(name)
            .map(|binding| binding.id().clone())
            .ok_or_else(|| not_registered(name))
    }
}

impl std::fmt::Debug for BindingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingManager")
            .field("bindings", &self.entries.keys().collect::<Vec<_>>())
            .field("subscribers", &self.events.len())
            .field("teardown_pending", &self.teardown_pending)
            .finish()
    }
}

fn not_registered(key: &str) -> LeverError {
    LeverError::NotRegistered {
        key: key.to_string(),
    }
}
