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

//! The per-binding state carried inside a snapshot record.

use crate::error::HookError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A binding's own persisted sub-state, stored as RON text.
///
/// Keeping the sub-state as text lets the outer snapshot use any encoding
/// (including self-describing-less ones such as bincode) while each binding
/// kind chooses its own shape.
///
/// # Example
///
/// ```rust
/// use lever_core::SubState;
///
/// let state = SubState::encode(&(3u8, "fast")).unwrap();
/// let (level, label): (u8, String) = state.decode().unwrap();
/// assert_eq!((level, label.as_str()), (3, "fast"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubState(String);

impl SubState {
    /// Encodes a value into a sub-state.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, HookError> {
        ron::to_string(value)
            .map(Self)
            .map_err(|e| HookError::new(format!("failed to encode binding state: {e}")))
    }

    /// Decodes the sub-state back into a value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, HookError> {
        ron::from_str(&self.0)
            .map_err(|e| HookError::new(format!("failed to decode binding state: {e}")))
    }

    /// Wraps already-encoded RON text.
    pub fn from_raw(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the raw RON text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Speed {
        multiplier: f32,
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        let state = SubState::from_raw("(nope: 1)");
        let result: Result<Speed, _> = state.decode();
        assert!(result.is_err());
    }

    #[test]
    fn test_struct_state() {
        let state = SubState::encode(&Speed { multiplier: 0.5 }).unwrap();
        assert_eq!(state.decode::<Speed>().unwrap(), Speed { multiplier: 0.5 });
    }
}
