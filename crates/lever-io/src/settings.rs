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

use serde::{Deserialize, Serialize};

/// Process-wide settings persisted in the global scope.
///
/// These are not bindings: they load at process start, before any save slot
/// is active, and are written when the application quits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    /// Re-apply bindings that were applied when a slot was saved.
    ///
    /// When disabled, loading a slot still registers its bindings but leaves
    /// them restored.
    pub replay_on_load: bool,
    /// Log every registry event at `info` level.
    pub announce_toggles: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            replay_on_load: true,
            announce_toggles: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: GlobalSettings = ron::from_str("(announce_toggles: true)").unwrap();
        assert!(settings.replay_on_load);
        assert!(settings.announce_toggles);
    }
}
