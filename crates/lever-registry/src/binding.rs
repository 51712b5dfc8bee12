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

//! The on/off state machine of a single binding.

use crate::hooks::{BindingHooks, HookContext, Unhook};
use crate::manager::BindingManager;
use flume::Sender;
use lever_core::{
    BindingEvent, BindingId, EventFanout, HookError, HookPhase, HostProbe, LeverError,
    LeverResult, Requirement, SubState, SubscriptionId, Verdict,
};
use lever_scheduler::Spawner;
use std::fmt;

/// A named unit of toggleable behaviour with paired install/uninstall effects.
///
/// `apply` and `restore` are idempotent: applying an applied binding or
/// restoring a restored one does nothing. The applied flag is flipped before
/// the hook runs and before the event fires, so hook code observes the new
/// state. If the hook fails the flag is rolled back and no event fires.
pub struct Binding {
    id: BindingId,
    name: String,
    always_required: bool,
    requirements: Vec<Requirement>,
    is_applied: bool,
    was_applied: bool,
    latched: bool,
    hooks: Box<dyn BindingHooks>,
    unhooks: Vec<Unhook>,
    observers: EventFanout<BindingEvent>,
}

impl Binding {
    /// Creates a restored binding.
    ///
    /// Fails with [`LeverError::InvalidArgument`] if the identity or the
    /// display name is empty.
    pub fn new<H>(id: &str, name: &str, hooks: H) -> LeverResult<Self>
    where
        H: BindingHooks + 'static,
    {
        let id = BindingId::new(id)?;
        Self::from_id(id, name, hooks)
    }

    /// Creates a restored binding under an already validated identity.
    pub fn from_id<H>(id: BindingId, name: &str, hooks: H) -> LeverResult<Self>
    where
        H: BindingHooks + 'static,
    {
        if name.trim().is_empty() {
            return Err(LeverError::InvalidArgument(format!(
                "binding '{id}' needs a non-empty display name"
            )));
        }

        Ok(Self {
            id,
            name: name.to_string(),
            always_required: false,
            requirements: Vec::new(),
            is_applied: false,
            was_applied: false,
            latched: false,
            hooks: Box::new(hooks),
            unhooks: Vec::new(),
            observers: EventFanout::new(),
        })
    }

    /// Marks the binding as always required: it can never be deregistered.
    pub fn always_required(mut self) -> Self {
        self.always_required = true;
        self
    }

    /// Declares a host precondition checked by the advisory verdicts.
    pub fn requires(mut self, requirement: Requirement) -> Self {
        if !self.requirements.contains(&requirement) {
            self.requirements.push(requirement);
        }
        self
    }

    /// Returns the binding's identity.
    pub fn id(&self) -> &BindingId {
        &self.id
    }

    /// Returns the human-readable display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the binding can never be deregistered.
    pub fn is_always_required(&self) -> bool {
        self.always_required
    }

    /// Returns the declared host preconditions.
    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Returns `true` while the binding's effects are installed.
    pub fn is_applied(&self) -> bool {
        self.is_applied
    }

    /// Returns the persisted mirror of the applied flag.
    pub fn was_applied(&self) -> bool {
        self.was_applied
    }

    /// Returns the number of undo tokens that will fire on restore.
    pub fn pending_unhooks(&self) -> usize {
        self.unhooks.len()
    }

    /// Installs the binding's effects.
    ///
    /// Returns `Ok(false)` without side effects if the binding was already
    /// applied. Tasks deferred by the install hook are not awaited.
    pub fn apply(&mut self, spawner: &Spawner<BindingManager>) -> LeverResult<bool> {
        if self.is_applied {
            return Ok(false);
        }
        self.is_applied = true;

        let mut installed = Vec::new();
        let result = {
            let mut cx = HookContext::new(&self.id, true, spawner, &mut installed);
            self.hooks.install(&mut cx)
        };

        match result {
            Ok(()) => {
                log::debug!("Applied binding '{}'.", self.id);
                self.unhooks.extend(installed);
                self.latched = false;
                self.observers.publish(BindingEvent::Applied(self.id.clone()));
                Ok(true)
            }
            Err(err) => {
                log::warn!(
                    "Install hook of '{}' failed, undoing {} partial effect(s): {}",
                    self.id,
                    installed.len(),
                    err
                );
                self.is_applied = false;
                for unhook in installed.into_iter().rev() {
                    unhook.fire();
                }
                Err(self.hook_failed(HookPhase::Install, err))
            }
        }
    }

    /// Removes the binding's effects.
    ///
    /// Runs the uninstall hook, then fires every tracked [`Unhook`] in reverse
    /// registration order. Returns `Ok(false)` if the binding was not applied.
    pub fn restore(&mut self, spawner: &Spawner<BindingManager>) -> LeverResult<bool> {
        if !self.is_applied {
            return Ok(false);
        }
        self.is_applied = false;

        let mut late = Vec::new();
        let result = {
            let mut cx = HookContext::new(&self.id, false, spawner, &mut late);
            self.hooks.uninstall(&mut cx)
        };
        self.unhooks.extend(late);

        match result {
            Ok(()) => {
                for unhook in std::mem::take(&mut self.unhooks).into_iter().rev() {
                    unhook.fire();
                }
                log::debug!("Restored binding '{}'.", self.id);
                self.latched = false;
                self.observers.publish(BindingEvent::Restored(self.id.clone()));
                Ok(true)
            }
            Err(err) => {
                log::warn!("Uninstall hook of '{}' failed: {}", self.id, err);
                self.is_applied = true;
                Err(self.hook_failed(HookPhase::Uninstall, err))
            }
        }
    }

    /// Restores the binding while remembering whether it was applied.
    ///
    /// The remembered value survives the next [`prepare_for_save`] so a
    /// snapshot taken after teardown still records the pre-teardown state.
    /// An existing latch is kept as is.
    ///
    /// [`prepare_for_save`]: Binding::prepare_for_save
    pub fn suspend(&mut self, spawner: &Spawner<BindingManager>) -> LeverResult<bool> {
        let was = if self.latched {
            self.was_applied
        } else {
            self.is_applied
        };
        let result = self.restore(spawner);
        self.latch(was);
        result
    }

    /// Pins the persisted flag until the next successful apply or restore.
    pub fn latch(&mut self, was_applied: bool) {
        self.was_applied = was_applied;
        self.latched = true;
    }

    /// Unpins the persisted flag and mirrors the applied flag into it.
    pub fn release_latch(&mut self) {
        self.latched = false;
        self.was_applied = self.is_applied;
    }

    /// Returns `true` while the persisted flag is pinned.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Copies the applied flag into its persisted mirror, unless it is latched.
    pub fn prepare_for_save(&mut self) {
        if !self.latched {
            self.was_applied = self.is_applied;
        }
    }

    /// Advisory check for offering the apply action.
    pub fn can_be_applied(&self, probe: &dyn HostProbe) -> Verdict {
        if self.is_applied {
            return Verdict::deny("Already applied");
        }
        self.check_requirements(probe)
            .and_then(|| self.hooks.can_be_applied(probe))
    }

    /// Advisory check for offering the restore action.
    pub fn can_be_restored(&self, probe: &dyn HostProbe) -> Verdict {
        if !self.is_applied {
            return Verdict::deny("Not applied");
        }
        self.check_requirements(probe)
            .and_then(|| self.hooks.can_be_restored(probe))
    }

    /// Captures the hooks' own persisted sub-state.
    pub fn export_state(&self) -> Result<Option<SubState>, HookError> {
        self.hooks.export_state()
    }

    /// Populates the hooks from a persisted sub-state.
    pub fn import_state(&mut self, state: &SubState) -> Result<(), HookError> {
        self.hooks.import_state(state)
    }

    /// Forwards this binding's `Applied` / `Restored` events to `sender`.
    pub fn subscribe(&mut self, sender: Sender<BindingEvent>) -> SubscriptionId {
        self.observers.attach(sender)
    }

    /// Stops forwarding events to a subscriber.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.observers.detach(subscription)
    }

    /// Returns the number of event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    fn check_requirements(&self, probe: &dyn HostProbe) -> Verdict {
        self.requirements
            .iter()
            .map(|requirement| requirement.check(probe))
            .find(|verdict| !verdict.is_allowed())
            .unwrap_or_default()
    }

    fn hook_failed(&self, phase: HookPhase, err: HookError) -> LeverError {
        LeverError::HookFailed {
            id: self.id.clone(),
            phase,
            message: err.message().to_string(),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("always_required", &self.always_required)
            .field("is_applied", &self.is_applied)
            .field("was_applied", &self.was_applied)
            .field("pending_unhooks", &self.unhooks.len())
            .finish_non_exhaustive()
    }
}
