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

//! Defines the error kinds surfaced by the binding lifecycle.
//!
//! Registration, deregistration, apply and restore report caller mistakes
//! synchronously through [`LeverError`]. Failures raised by the body of a
//! concrete install/uninstall hook travel as a [`HookError`] and are wrapped
//! into [`LeverError::HookFailed`] by the binding that ran the hook.

use crate::identity::BindingId;
use std::fmt;

/// A specialized `Result` type for binding lifecycle operations.
pub type LeverResult<T> = Result<T, LeverError>;

/// The phase of a binding's lifecycle during which a hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    /// The install hook, run by `apply`.
    Install,
    /// The uninstall hook, run by `restore`.
    Uninstall,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Install => write!(f, "install"),
            HookPhase::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// An error related to the registration or the on/off lifecycle of a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeverError {
    /// A live binding with the same identity is already registered.
    AlreadyRegistered {
        /// The identity that is already taken.
        id: BindingId,
    },
    /// No live binding matches the requested identity or display name.
    NotRegistered {
        /// The identity or display name that was looked up.
        key: String,
    },
    /// The binding is always required and cannot be deregistered.
    Protected {
        /// The identity of the protected binding.
        id: BindingId,
    },
    /// An argument was rejected, such as an empty identity or display name.
    InvalidArgument(String),
    /// No binding kind with this identity is known to the catalog.
    UnknownIdentity {
        /// The raw identity that could not be resolved.
        id: String,
    },
    /// A concrete install or uninstall hook reported a failure.
    ///
    /// The binding's applied flag has already been rolled back when this is
    /// returned.
    HookFailed {
        /// The identity of the binding whose hook failed.
        id: BindingId,
        /// Which hook failed.
        phase: HookPhase,
        /// The message reported by the hook.
        message: String,
    },
}

impl fmt::Display for LeverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeverError::AlreadyRegistered { id } => {
                write!(f, "Binding '{id}' is already registered")
            }
            LeverError::NotRegistered { key } => write!(f, "Binding '{key}' is not registered"),
            LeverError::Protected { id } => {
                write!(f, "Binding '{id}' is always required and cannot be deregistered")
            }
            LeverError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            LeverError::UnknownIdentity { id } => {
                write!(f, "No binding kind is known under identity '{id}'")
            }
            LeverError::HookFailed { id, phase, message } => {
                write!(f, "The {phase} hook of binding '{id}' failed: {message}")
            }
        }
    }
}

impl std::error::Error for LeverError {}

/// An error reported by the body of a concrete install or uninstall hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookError {
    message: String,
}

impl HookError {
    /// Creates a new hook error carrying a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the message reported by the hook.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HookError {}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
