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

//! # Lever Core
//!
//! Foundational crate containing the identities, error kinds, events and host
//! contracts shared by every other Lever crate.
//!
//! Nothing in here knows how a binding is applied or how a snapshot is
//! written; it only defines the vocabulary those layers speak.

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod host;
pub mod identity;
pub mod state;
pub mod store;
pub mod verdict;

pub use error::{HookError, HookPhase, LeverError, LeverResult};
pub use event::{BindingEvent, EventFanout, SubscriptionId};
pub use host::{HostProbe, HostSignal, ManualProbe, SignalKind};
pub use identity::{BindingId, SlotId};
pub use state::SubState;
pub use store::KeyValueStore;
pub use verdict::{Requirement, Verdict};
