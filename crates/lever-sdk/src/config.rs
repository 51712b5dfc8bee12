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

//! Process configuration, read from a TOML file.

use anyhow::{bail, Context, Result};
use lever_io::SnapshotEncoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how a Lever context persists its state.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
///
/// ```toml
/// mod_id = "assists"
/// data_dir = "saves"
/// encoding = "bincode"
/// log_filter = "lever=debug"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeverConfig {
    /// Namespace of every persisted path.
    pub mod_id: String,
    /// Root directory of the file store.
    pub data_dir: PathBuf,
    /// Encoding of newly written snapshots.
    pub encoding: SnapshotEncoding,
    /// Default `env_logger` filter used by binaries.
    pub log_filter: String,
}

impl Default for LeverConfig {
    fn default() -> Self {
        Self {
            mod_id: "lever".to_string(),
            data_dir: PathBuf::from("saves"),
            encoding: SnapshotEncoding::Ron,
            log_filter: "info".to_string(),
        }
    }
}

impl LeverConfig {
    /// Reads a config file. Fails if it is missing, unreadable or invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{}'", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("Failed to parse TOML from '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file, or returns the defaults if it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading configuration from '{}'.", path.display());
            Self::load(path)
        } else {
            log::info!("No '{}' found. Using default configuration.", path.display());
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.mod_id.trim().is_empty() {
            bail!("mod_id must not be empty");
        }
        if self.mod_id.contains(['/', '\\']) {
            bail!("mod_id '{}' must not contain path separators", self.mod_id);
        }
        Ok(())
    }
}
