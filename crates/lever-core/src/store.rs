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

//! The durable key-value store snapshots are written to.

use std::io;

/// A durable store addressed by deterministic, `/`-separated paths.
///
/// Implementations decide where the bytes live (a directory on disk, an
/// in-memory map, a platform cloud-save API). Paths are produced by the
/// persistence layer and are stable per mod and per scope.
pub trait KeyValueStore: Send + Sync {
    /// Writes `bytes` at `path`, replacing any previous value.
    fn write(&self, path: &str, bytes: &[u8]) -> io::Result<()>;

    /// Reads the value stored at `path`.
    ///
    /// # Errors
    /// Returns an error of kind [`io::ErrorKind::NotFound`] when nothing is
    /// stored at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Returns `true` if a value is stored at `path`.
    fn exists(&self, path: &str) -> bool;
}
