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

//! Contracts consumed from the host application.
//!
//! The host owns the frame loop, the player object and its own save
//! pipeline. Lever only needs to observe a handful of lifecycle signals and
//! to ask whether the primary actor exists yet; how those are hooked into the
//! host is outside this crate.

use crate::identity::SlotId;
use std::sync::atomic::{AtomicBool, Ordering};

/// A lifecycle signal raised by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSignal {
    /// The player is returning to the main menu or quitting the session.
    ReturningToMenuOrQuitting,
    /// The host is about to persist the settings of a save slot.
    SettingsAboutToBeSaved(SlotId),
    /// The host has finished writing the settings of a save slot.
    SettingsSaved(SlotId),
    /// A save slot became active and its data has been loaded.
    SaveSlotLoaded(SlotId),
    /// The application process is about to exit.
    ApplicationQuitting,
}

/// The payload-free discriminant of a [`HostSignal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// See [`HostSignal::ReturningToMenuOrQuitting`].
    ReturningToMenuOrQuitting,
    /// See [`HostSignal::SettingsAboutToBeSaved`].
    SettingsAboutToBeSaved,
    /// See [`HostSignal::SettingsSaved`].
    SettingsSaved,
    /// See [`HostSignal::SaveSlotLoaded`].
    SaveSlotLoaded,
    /// See [`HostSignal::ApplicationQuitting`].
    ApplicationQuitting,
}

impl HostSignal {
    /// Returns the kind of this signal, without its payload.
    pub fn kind(&self) -> SignalKind {
        match self {
            HostSignal::ReturningToMenuOrQuitting => SignalKind::ReturningToMenuOrQuitting,
            HostSignal::SettingsAboutToBeSaved(_) => SignalKind::SettingsAboutToBeSaved,
            HostSignal::SettingsSaved(_) => SignalKind::SettingsSaved,
            HostSignal::SaveSlotLoaded(_) => SignalKind::SaveSlotLoaded,
            HostSignal::ApplicationQuitting => SignalKind::ApplicationQuitting,
        }
    }

    /// Returns the save slot the signal refers to, if any.
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            HostSignal::SettingsAboutToBeSaved(slot)
            | HostSignal::SettingsSaved(slot)
            | HostSignal::SaveSlotLoaded(slot) => Some(*slot),
            HostSignal::ReturningToMenuOrQuitting | HostSignal::ApplicationQuitting => None,
        }
    }
}

/// Answers readiness questions about the host's world.
pub trait HostProbe: Send + Sync {
    /// Returns `true` once the primary actor (player/controller object) exists.
    fn is_actor_ready(&self) -> bool;

    /// Returns `true` while the player stands at a safe checkpoint.
    fn at_safe_checkpoint(&self) -> bool {
        true
    }
}

/// A [`HostProbe`] whose answers are set by hand.
///
/// Headless hosts, tools and tests use it to simulate the moment the player
/// object comes into existence.
#[derive(Debug, Default)]
pub struct ManualProbe {
    actor_ready: AtomicBool,
    at_checkpoint: AtomicBool,
}

impl ManualProbe {
    /// Creates a probe reporting no actor and no checkpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the primary actor exists.
    pub fn set_actor_ready(&self, ready: bool) {
        self.actor_ready.store(ready, Ordering::SeqCst);
    }

    /// Sets whether the player stands at a safe checkpoint.
    pub fn set_at_checkpoint(&self, at_checkpoint: bool) {
        self.at_checkpoint.store(at_checkpoint, Ordering::SeqCst);
    }
}

impl HostProbe for ManualProbe {
    fn is_actor_ready(&self) -> bool {
        self.actor_ready.load(Ordering::SeqCst)
    }

    fn at_safe_checkpoint(&self) -> bool {
        self.at_checkpoint.load(Ordering::SeqCst)
    }
}
