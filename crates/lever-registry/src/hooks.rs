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

//! The contract concrete bindings implement, and the context their hooks run in.

use crate::manager::BindingManager;
use lever_core::{BindingId, HookError, HostProbe, SubState, Verdict};
use lever_scheduler::{Spawner, Task, TaskHandle};
use std::fmt;

/// A task operating on the registry, as deferred by binding hooks.
pub type BindingTask = Task<BindingManager>;

/// An undo action registered while a binding installs its effects.
///
/// Each token is fired exactly once, in reverse registration order, when the
/// binding is restored, or immediately when the install that registered it
/// fails part-way.
pub struct Unhook {
    label: String,
    undo: Box<dyn FnOnce() + Send>,
}

impl Unhook {
    /// Creates a token running `undo` when fired.
    pub fn new<F>(label: impl Into<String>, undo: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            label: label.into(),
            undo: Box::new(undo),
        }
    }

    /// Returns the label shown in log output.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn fire(self) {
        log::trace!("Firing unhook '{}'.", self.label);
        (self.undo)();
    }
}

impl fmt::Debug for Unhook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unhook").field("label", &self.label).finish()
    }
}

/// What an install or uninstall hook can see and do.
pub struct HookContext<'a> {
    id: &'a BindingId,
    applied: bool,
    spawner: &'a Spawner<BindingManager>,
    unhooks: &'a mut Vec<Unhook>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(
        id: &'a BindingId,
        applied: bool,
        spawner: &'a Spawner<BindingManager>,
        unhooks: &'a mut Vec<Unhook>,
    ) -> Self {
        Self {
            id,
            applied,
            spawner,
            unhooks,
        }
    }

    /// Returns the identity of the binding running the hook.
    pub fn id(&self) -> &BindingId {
        self.id
    }

    /// Returns the binding's applied flag, already flipped to its new value.
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Registers an undo action fired when the binding is restored.
    ///
    /// Tokens registered from an uninstall hook fire as soon as that hook
    /// returns successfully.
    pub fn track(&mut self, unhook: Unhook) {
        self.unhooks.push(unhook);
    }

    /// Enqueues a deferred task. The hook does not wait for it.
    pub fn defer(&self, task: BindingTask) -> TaskHandle {
        self.spawner.spawn(task)
    }

    /// Enqueues a deferred task under `name`, replacing any task already
    /// running under that name.
    pub fn defer_named(&self, task: BindingTask, name: &str) -> TaskHandle {
        self.spawner.spawn_named(task, name)
    }

    /// Returns the spawner feeding the registry's scheduler.
    pub fn spawner(&self) -> &Spawner<BindingManager> {
        self.spawner
    }
}

/// The concrete behaviour behind a binding.
///
/// Only [`install`](BindingHooks::install) is required. Everything installed
/// through [`HookContext::track`] is undone automatically on restore, so many
/// bindings never need a custom [`uninstall`](BindingHooks::uninstall).
pub trait BindingHooks: Send {
    /// Installs the binding's effects.
    fn install(&mut self, cx: &mut HookContext<'_>) -> Result<(), HookError>;

    /// Removes effects that were not registered as [`Unhook`] tokens.
    ///
    /// Runs before the tracked tokens fire.
    fn uninstall(&mut self, _cx: &mut HookContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// Binding-specific advice on whether applying should be offered.
    fn can_be_applied(&self, _probe: &dyn HostProbe) -> Verdict {
        Verdict::allow()
    }

    /// Binding-specific advice on whether restoring should be offered.
    fn can_be_restored(&self, _probe: &dyn HostProbe) -> Verdict {
        Verdict::allow()
    }

    /// Captures the binding's own persisted sub-state, if it has one.
    fn export_state(&self) -> Result<Option<SubState>, HookError> {
        Ok(None)
    }

    /// Populates the binding from a persisted sub-state.
    fn import_state(&mut self, _state: &SubState) -> Result<(), HookError> {
        Ok(())
    }
}

/// Closures install bindings whose whole effect is described by tracked tokens.
impl<F> BindingHooks for F
where
    F: FnMut(&mut HookContext<'_>) -> Result<(), HookError> + Send,
{
    fn install(&mut self, cx: &mut HookContext<'_>) -> Result<(), HookError> {
        self(cx)
    }
}
