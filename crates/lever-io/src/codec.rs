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

//! Payload encodings a snapshot can be written with.

use crate::error::{PersistError, PersistResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a snapshot payload is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotEncoding {
    /// Pretty-printed RON. Readable and diffable.
    #[default]
    Ron,
    /// Compact bincode.
    Bincode,
}

impl SnapshotEncoding {
    /// Returns the tag stored in the container header.
    pub fn tag(self) -> u8 {
        match self {
            SnapshotEncoding::Ron => 1,
            SnapshotEncoding::Bincode => 2,
        }
    }

    /// Resolves a header tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(SnapshotEncoding::Ron),
            2 => Some(SnapshotEncoding::Bincode),
            _ => None,
        }
    }

    /// Returns the file extension used for snapshots in this encoding.
    pub fn extension(self) -> &'static str {
        match self {
            SnapshotEncoding::Ron => "ron",
            SnapshotEncoding::Bincode => "bin",
        }
    }

    /// Encodes a value into a payload.
    pub fn encode<T: Serialize>(self, value: &T) -> PersistResult<Vec<u8>> {
        match self {
            SnapshotEncoding::Ron => {
                let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
                ron::ser::to_string_pretty(value, pretty_config)
                    .map(|s| s.into_bytes())
                    .map_err(|e| PersistError::Encode(e.to_string()))
            }
            SnapshotEncoding::Bincode => {
                let config = bincode::config::standard();
                bincode::serde::encode_to_vec(value, config)
                    .map_err(|e| PersistError::Encode(e.to_string()))
            }
        }
    }

    /// Decodes a payload back into a value.
    pub fn decode<T: DeserializeOwned>(self, payload: &[u8]) -> PersistResult<T> {
        match self {
            SnapshotEncoding::Ron => {
                ron::de::from_bytes(payload).map_err(|e| PersistError::Decode(e.to_string()))
            }
            SnapshotEncoding::Bincode => {
                let config = bincode::config::standard();
                let (value, _) = bincode::serde::decode_from_slice(payload, config)
                    .map_err(|e| PersistError::Decode(e.to_string()))?;
                Ok(value)
            }
        }
    }
}

impl fmt::Display for SnapshotEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotEncoding::Ron => write!(f, "ron"),
            SnapshotEncoding::Bincode => write!(f, "bincode"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        level: Option<u8>,
    }

    #[test]
    fn test_tags_resolve_back() {
        for encoding in [SnapshotEncoding::Ron, SnapshotEncoding::Bincode] {
            assert_eq!(SnapshotEncoding::from_tag(encoding.tag()), Some(encoding));
        }
        assert_eq!(SnapshotEncoding::from_tag(0), None);
    }

    #[test]
    fn test_ron_payload_is_readable() {
        let sample = Sample {
            name: "fly".to_string(),
            level: Some(2),
        };
        let payload = SnapshotEncoding::Ron.encode(&sample).unwrap();
        let text = String::from_utf8(payload.clone()).unwrap();

        assert!(text.contains("name: \"fly\""));
        assert_eq!(SnapshotEncoding::Ron.decode::<Sample>(&payload).unwrap(), sample);
    }

    #[test]
    fn test_garbage_fails_to_decode() {
        let err = SnapshotEncoding::Ron.decode::<Sample>(b"(((").unwrap_err();
        assert!(matches!(err, PersistError::Decode(_)));
    }
}
