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

//! A scripted play session exercising the host signal sequence.

use crate::bindings::GameWorld;
use anyhow::Result;
use lever_sdk::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

/// Drives a context through load, play, menu round-trip and quit.
pub struct Session<'a> {
    context: &'a mut LeverContext,
    probe: Arc<ManualProbe>,
    world: GameWorld,
    slot: SlotId,
    ticks: usize,
}

impl<'a> Session<'a> {
    pub fn new(
        context: &'a mut LeverContext,
        probe: Arc<ManualProbe>,
        world: GameWorld,
        slot: SlotId,
        ticks: usize,
    ) -> Self {
        Self {
            context,
            probe,
            world,
            slot,
            ticks,
        }
    }

    pub fn run(&mut self, toggle: &[String]) -> Result<()> {
        self.enter_world();
        self.print_bindings("After loading");

        for name in toggle {
            self.toggle(name)?;
        }
        self.advance(self.ticks);
        self.print_bindings("After toggling");

        self.leave_world();
        log::info!(
            "Back at the menu with {} live binding(s).",
            self.context.manager().len()
        );

        self.enter_world();
        self.print_bindings("After reloading");

        self.context.on_signal(HostSignal::ApplicationQuitting);
        self.context.shutdown();
        Ok(())
    }

    fn enter_world(&mut self) {
        log::info!("Loading slot {}.", self.slot);
        self.context.on_signal(HostSignal::SaveSlotLoaded(self.slot));
        if let Some(report) = self.context.last_load() {
            for skipped in &report.skipped {
                log::warn!("Skipped '{}': {}", skipped.id, skipped.reason);
            }
        }

        // The actor spawns a few frames after the slot is loaded.
        self.advance(self.ticks);
        self.probe.set_actor_ready(true);
        self.probe.set_at_checkpoint(true);
        self.advance(self.ticks);
    }

    fn leave_world(&mut self) {
        log::info!("Returning to the main menu.");
        self.context.on_signal(HostSignal::ReturningToMenuOrQuitting);
        self.probe.set_actor_ready(false);
        self.probe.set_at_checkpoint(false);
        self.context
            .on_signal(HostSignal::SettingsAboutToBeSaved(self.slot));
        self.context.on_signal(HostSignal::SettingsSaved(self.slot));
    }

    fn toggle(&mut self, name: &str) -> Result<()> {
        let Some(summary) = self
            .context
            .list_registered()
            .into_iter()
            .find(|summary| summary.name == name)
        else {
            let binding = self.context.catalog().ids().find_map(|id| {
                self.context
                    .catalog()
                    .create(id.as_str())
                    .ok()
                    .filter(|binding| binding.name() == name)
            });
            match binding {
                Some(binding) => {
                    self.context.register(binding)?;
                    self.context.apply_by_name(name)?;
                }
                None => log::warn!("No binding named '{}'.", name),
            }
            return Ok(());
        };

        let verdict = if summary.is_applied {
            summary.can_restore
        } else {
            summary.can_apply
        };
        if !verdict.is_allowed() {
            log::warn!("Not toggling '{}': {}", name, verdict.reason);
            return Ok(());
        }

        if summary.is_applied {
            self.context.restore_by_name(name)?;
        } else {
            self.context.apply_by_name(name)?;
        }
        Ok(())
    }

    fn advance(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.context.tick(FRAME);
        }
    }

    fn print_bindings(&self, title: &str) {
        println!("== {title} ==");
        for summary in self.context.list_registered() {
            let state = if summary.is_applied { "on " } else { "off" };
            let hint = if summary.is_applied {
                &summary.can_restore
            } else {
                &summary.can_apply
            };
            if hint.is_allowed() {
                println!("  [{state}] {}", summary.name);
            } else {
                println!("  [{state}] {} ({})", summary.name, hint.reason);
            }
        }
        println!("  world: {:?}", self.world.snapshot());
    }
}
