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

//! Simulated game state the demo bindings act upon.

use anyhow::Result;
use lever_sdk::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// What a player would notice in the simulated game.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    pub stamina_drain: f32,
    pub map_revealed: bool,
    pub travel_speed: f32,
    pub menu_hotkey: bool,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            stamina_drain: 1.0,
            map_revealed: false,
            travel_speed: 1.0,
            menu_hotkey: false,
        }
    }
}

/// Shared handle to the simulated game state.
#[derive(Debug, Clone, Default)]
pub struct GameWorld(Arc<Mutex<WorldState>>);

impl GameWorld {
    pub fn state(&self) -> MutexGuard<'_, WorldState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> WorldState {
        self.state().clone()
    }
}

/// Binds the toggle menu hotkey. Always present.
struct MenuHotkey(GameWorld);

impl BindingHooks for MenuHotkey {
    fn install(&mut self, cx: &mut HookContext<'_>) -> Result<(), HookError> {
        self.0.state().menu_hotkey = true;
        let world = self.0.clone();
        cx.track(Unhook::new("menu hotkey", move || {
            world.state().menu_hotkey = false;
        }));
        Ok(())
    }
}

/// Stops stamina from draining.
struct InfiniteStamina(GameWorld);

impl BindingHooks for InfiniteStamina {
    fn install(&mut self, cx: &mut HookContext<'_>) -> Result<(), HookError> {
        let previous = std::mem::replace(&mut self.0.state().stamina_drain, 0.0);
        let world = self.0.clone();
        cx.track(Unhook::new("stamina drain", move || {
            world.state().stamina_drain = previous;
        }));
        Ok(())
    }
}

/// Reveals the map once the map screen exists.
struct RevealMap(GameWorld);

impl BindingHooks for RevealMap {
    fn install(&mut self, cx: &mut HookContext<'_>) -> Result<(), HookError> {
        let world = self.0.clone();
        let task = Task::builder()
            .label("reveal map")
            .wait_for(Duration::from_millis(50))
            .run(move |manager: &mut BindingManager| {
                if manager.get("assist.reveal_map").is_some_and(Binding::is_applied) {
                    world.state().map_revealed = true;
                    log::info!("Map revealed.");
                }
            })
            .build();
        cx.defer_named(task, "assist.reveal_map.install");
        Ok(())
    }

    fn uninstall(&mut self, cx: &mut HookContext<'_>) -> Result<(), HookError> {
        cx.spawner().cancel_named("assist.reveal_map.install");
        self.0.state().map_revealed = false;
        Ok(())
    }

    fn can_be_restored(&self, probe: &dyn HostProbe) -> Verdict {
        if probe.is_actor_ready() {
            Verdict::allow()
        } else {
            Verdict::deny("The map cannot be hidden from the title screen")
        }
    }
}

/// Multiplies travel speed by a persisted factor.
struct FastTravel {
    world: GameWorld,
    factor: f32,
}

impl BindingHooks for FastTravel {
    fn install(&mut self, cx: &mut HookContext<'_>) -> Result<(), HookError> {
        if self.factor <= 0.0 {
            return Err(HookError::new(format!(
                "travel factor must be positive, got {}",
                self.factor
            )));
        }
        self.world.state().travel_speed *= self.factor;
        let world = self.world.clone();
        let factor = self.factor;
        cx.track(Unhook::new("travel speed", move || {
            world.state().travel_speed /= factor;
        }));
        Ok(())
    }

    fn export_state(&self) -> Result<Option<SubState>, HookError> {
        SubState::encode(&self.factor).map(Some)
    }

    fn import_state(&mut self, state: &SubState) -> Result<(), HookError> {
        self.factor = state.decode()?;
        Ok(())
    }
}

/// Declares every binding kind the sandbox knows.
pub fn catalog(world: &GameWorld) -> Result<BindingCatalog> {
    let mut catalog = BindingCatalog::new();

    let w = world.clone();
    catalog.insert_always_required("core.menu_hotkey", move || {
        Binding::new("core.menu_hotkey", "Menu hotkey", MenuHotkey(w.clone()))
    })?;

    let w = world.clone();
    catalog.insert("assist.infinite_stamina", move || {
        Binding::new(
            "assist.infinite_stamina",
            "Infinite stamina",
            InfiniteStamina(w.clone()),
        )
        .map(|binding| binding.requires(Requirement::ActorReady))
    })?;

    let w = world.clone();
    catalog.insert("assist.reveal_map", move || {
        Binding::new("assist.reveal_map", "Reveal map", RevealMap(w.clone()))
            .map(|binding| binding.requires(Requirement::SafeCheckpoint))
    })?;

    let w = world.clone();
    catalog.insert("assist.fast_travel", move || {
        let hooks = FastTravel {
            world: w.clone(),
            factor: 2.0,
        };
        Binding::new("assist.fast_travel", "Fast travel", hooks)
    })?;

    Ok(catalog)
}
