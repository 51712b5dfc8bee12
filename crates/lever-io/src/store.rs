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

//! Durable key-value stores snapshots are written to.

use lever_core::KeyValueStore;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Stores each key as a file below a root directory.
///
/// Keys are relative paths such as `my-mod/slot-2.ron`. Parent directories
/// are created on demand, and writes go to a temporary sibling that is then
/// renamed over the target so a crash never leaves a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to its file path.
    pub fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut staging = path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, bytes)?;
        fs::rename(&staging, &path)?;
        log::trace!("Wrote {} byte(s) to {}.", bytes.len(), path.display());
        Ok(())
    }

    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(key))
    }

    fn exists(&self, key: &str) -> bool {
        self.resolve(key).is_file()
    }
}

/// Keeps every key in a shared in-memory map.
///
/// Clones share the same map, so a test can keep one handle while the
/// persistence layer owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Removes a key. Returns `true` if it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn write(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        self.lock().get(key).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no entry under '{key}'"))
        })
    }

    fn exists(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("mod/slot-1.ron", b"()").unwrap();

        assert!(store.exists("mod/slot-1.ron"));
        assert_eq!(store.read("mod/slot-1.ron").unwrap(), b"()");
        assert!(!store.resolve("mod/slot-1.ron.tmp").exists());
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("global.ron", b"first").unwrap();
        store.write("global.ron", b"second").unwrap();

        assert_eq!(store.read("global.ron").unwrap(), b"second");
    }

    #[test]
    fn test_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let file_store = FileStore::new(dir.path());
        let memory_store = MemoryStore::new();

        for store in [&file_store as &dyn KeyValueStore, &memory_store] {
            assert!(!store.exists("nope"));
            assert_eq!(
                store.read("nope").unwrap_err().kind(),
                io::ErrorKind::NotFound
            );
        }
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.write("a", b"1").unwrap();

        assert_eq!(handle.keys(), ["a"]);
        assert!(handle.remove("a"));
        assert!(!store.exists("a"));
    }
}
