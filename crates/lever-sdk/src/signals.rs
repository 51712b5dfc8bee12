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

//! One-shot subscriptions to host lifecycle signals.

use lever_core::{HostSignal, SignalKind};
use std::fmt;

/// Identifies a pending one-shot hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

type Action<W> = Box<dyn FnOnce(&mut W, &HostSignal) + Send>;

struct PendingHook<W> {
    id: HookId,
    kind: SignalKind,
    action: Action<W>,
}

/// Actions waiting for the next host signal of a given kind.
///
/// Each hook runs at most once: firing a signal removes every hook waiting for
/// its kind before running them, in the order they were added.
pub struct SignalHooks<W> {
    pending: Vec<PendingHook<W>>,
    next_id: u64,
}

impl<W> SignalHooks<W> {
    /// Creates an empty set of hooks.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Runs `action` on the next signal of `kind`.
    pub fn once<F>(&mut self, kind: SignalKind, action: F) -> HookId
    where
        F: FnOnce(&mut W, &HostSignal) + Send + 'static,
    {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingHook {
            id,
            kind,
            action: Box::new(action),
        });
        id
    }

    /// Drops a pending hook. Returns `false` if it already fired.
    pub fn cancel(&mut self, id: HookId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|hook| hook.id != id);
        self.pending.len() != before
    }

    /// Runs and removes every hook waiting for this signal's kind.
    ///
    /// Returns the number of hooks that ran.
    pub fn fire(&mut self, signal: &HostSignal, world: &mut W) -> usize {
        let kind = signal.kind();
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|hook| hook.kind == kind);
        self.pending = waiting;

        let fired = due.len();
        for hook in due {
            log::trace!("Firing one-shot hook {:?} on {:?}.", hook.id, kind);
            (hook.action)(world, signal);
        }
        fired
    }

    /// Returns the number of hooks waiting for `kind`.
    pub fn pending(&self, kind: SignalKind) -> usize {
        self.pending.iter().filter(|hook| hook.kind == kind).count()
    }

    /// Returns `true` if no hook is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<W> Default for SignalHooks<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> fmt::Debug for SignalHooks<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.pending.iter().map(|hook| (hook.id, hook.kind)))
            .finish()
    }
}
