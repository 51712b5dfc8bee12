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

//! Lifecycle events and the primitives used to deliver them.
//!
//! A [`BindingEvent`] is emitted whenever a binding is applied, restored,
//! registered or deregistered. Events travel over [`EventFanout`], a small
//! publisher that clones each event into every attached `flume` channel.

mod fanout;

pub use self::fanout::{EventFanout, SubscriptionId};

use crate::identity::BindingId;

/// A lifecycle event emitted by a binding or by the registry that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingEvent {
    /// The binding's install hook completed and the binding is now applied.
    Applied(BindingId),
    /// The binding's uninstall hook completed and the binding is now restored.
    Restored(BindingId),
    /// The binding was added to a registry.
    Registered(BindingId),
    /// The binding was removed from a registry.
    Deregistered(BindingId),
}

impl BindingEvent {
    /// Returns the identity of the binding this event is about.
    pub fn id(&self) -> &BindingId {
        match self {
            BindingEvent::Applied(id)
            | BindingEvent::Restored(id)
            | BindingEvent::Registered(id)
            | BindingEvent::Deregistered(id) => id,
        }
    }
}
