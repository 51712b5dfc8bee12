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

//! Errors raised while reading or writing snapshots.

use lever_core::LeverError;
use thiserror::Error;

/// A specialized `Result` type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// A failure to persist or restore binding state.
#[derive(Error, Debug)]
pub enum PersistError {
    /// The underlying store could not be read or written.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The payload could not be encoded.
    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    /// The payload could not be decoded.
    #[error("failed to decode snapshot: {0}")]
    Decode(String),

    /// The container header is missing, truncated or from an unknown version.
    #[error("invalid snapshot header: {0}")]
    InvalidHeader(&'static str),

    /// A binding could not be rebuilt or registered.
    #[error(transparent)]
    Binding(#[from] LeverError),
}

impl PersistError {
    /// Returns a short stable label for log output.
    pub fn as_label(&self) -> &'static str {
        match self {
            PersistError::Io(_) => "persist_io",
            PersistError::Encode(_) => "persist_encode",
            PersistError::Decode(_) => "persist_decode",
            PersistError::InvalidHeader(_) => "persist_invalid_header",
            PersistError::Binding(_) => "persist_binding",
        }
    }
}
