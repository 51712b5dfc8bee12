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

//! # Lever Registry
//!
//! The binding state machine and the registry that owns live bindings.
//!
//! A [`Binding`] is a named unit of toggleable behaviour. Its concrete effect
//! lives in a [`BindingHooks`] implementation whose `install` and `uninstall`
//! hooks are guaranteed to be paired: a binding is installed at most once
//! until it is restored, and every [`Unhook`] token registered during
//! install fires when it is restored.
//!
//! The [`BindingManager`] keeps at most one live binding per identity,
//! mediates every lifecycle call and re-broadcasts all binding events on a
//! single subscription point. The [`BindingCatalog`] lists the binding kinds
//! a process knows how to construct.

mod binding;
mod catalog;
mod hooks;
mod manager;
mod summary;

pub use binding::Binding;
pub use catalog::BindingCatalog;
pub use hooks::{BindingHooks, BindingTask, HookContext, Unhook};
pub use manager::BindingManager;
pub use summary::BindingSummary;
