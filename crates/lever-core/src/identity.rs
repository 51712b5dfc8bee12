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

//! Stable identities for binding kinds and host save slots.

use crate::error::{LeverError, LeverResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// The structural identity of a binding kind.
///
/// A registry holds at most one live binding per identity. Identities are
/// assigned explicitly when a binding is constructed and are never empty.
///
/// # Example
///
/// ```rust
/// use lever_core::BindingId;
///
/// let id = BindingId::new("assist.stamina").unwrap();
/// assert_eq!(id.as_str(), "assist.stamina");
/// assert!(BindingId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BindingId(String);

impl BindingId {
    /// Creates a new identity, rejecting empty or whitespace-only strings.
    pub fn new(id: impl Into<String>) -> LeverResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(LeverError::InvalidArgument(
                "binding identity must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BindingId {
    type Error = LeverError;

    fn try_from(value: String) -> LeverResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for BindingId {
    type Error = LeverError;

    fn try_from(value: &str) -> LeverResult<Self> {
        Self::new(value)
    }
}

impl From<BindingId> for String {
    fn from(id: BindingId) -> Self {
        id.0
    }
}

impl Borrow<str> for BindingId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one save slot of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
