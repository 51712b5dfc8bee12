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

//! Advisory answers to "may this binding be toggled right now?".

use crate::host::HostProbe;
use serde::Serialize;

/// The answer to a `can_be_applied` / `can_be_restored` query.
///
/// Verdicts are advisory: the binding state machine never consults them.
/// Callers such as a toggle menu use them to decide whether to offer an
/// action, and show [`reason`](Verdict::reason) when they don't.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the action should be offered.
    pub allowed: bool,
    /// A human-readable explanation; empty when the action is allowed.
    pub reason: String,
}

impl Verdict {
    /// A verdict allowing the action.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
        }
    }

    /// A verdict refusing the action for the given reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }

    /// Returns `true` if the action is allowed.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Evaluates `next` only if this verdict allows the action.
    pub fn and_then(self, next: impl FnOnce() -> Verdict) -> Verdict {
        if self.allowed {
            next()
        } else {
            self
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::allow()
    }
}

/// A host precondition a binding declares at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// The player must stand at a safe checkpoint.
    SafeCheckpoint,
    /// The primary actor must exist.
    ActorReady,
}

impl Requirement {
    /// Checks the requirement against the host.
    pub fn check(&self, probe: &dyn HostProbe) -> Verdict {
        match self {
            Requirement::SafeCheckpoint if !probe.at_safe_checkpoint() => {
                Verdict::deny("Must be at a safe checkpoint")
            }
            Requirement::ActorReady if !probe.is_actor_ready() => {
                Verdict::deny("The player is not in the world yet")
            }
            _ => Verdict::allow(),
        }
    }
}
