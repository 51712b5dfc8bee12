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

//! The public-facing SDK of Lever.
//!
//! A host integration builds one [`LeverContext`] at startup, forwards its
//! per-tick callback to [`LeverContext::tick`] and its lifecycle signals to
//! [`LeverContext::on_signal`]. Everything else (registry, scheduler,
//! persistence) is owned by the context.

mod config;
mod context;
mod signals;

pub use config::LeverConfig;
pub use context::LeverContext;
pub use signals::{HookId, SignalHooks};

pub mod prelude {
    //! The types most host integrations and binding authors need.
    pub use crate::{LeverConfig, LeverContext};
    pub use lever_core::{
        BindingEvent, BindingId, HookError, HostProbe, HostSignal, KeyValueStore, LeverError,
        LeverResult, ManualProbe, Requirement, SignalKind, SlotId, SubState, Verdict,
    };
    pub use lever_io::{FileStore, GlobalSettings, MemoryStore, SnapshotEncoding};
    pub use lever_registry::{
        Binding, BindingCatalog, BindingHooks, BindingManager, BindingSummary, BindingTask,
        HookContext, Unhook,
    };
    pub use lever_scheduler::{Task, TaskHandle};
}
