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

//! A cloneable handle for starting tasks while the scheduler is busy.

use crate::handle::{TaskHandle, TaskId};
use crate::scheduler::LiveTask;
use crate::task::Task;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Tracks the single live task allowed per name.
#[derive(Debug, Default)]
pub(crate) struct NameTable {
    inner: Mutex<HashMap<Arc<str>, TaskHandle>>,
}

impl NameTable {
    fn lock(&self) -> MutexGuard<'_, HashMap<Arc<str>, TaskHandle>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Records `handle` as the owner of its name and cancels the previous owner.
    pub(crate) fn claim(&self, handle: &TaskHandle) {
        let Some(name) = handle.name() else {
            return;
        };
        if let Some(previous) = self.lock().insert(Arc::from(name), handle.clone()) {
            if previous.is_alive() {
                log::debug!(
                    "Task '{name}' {} replaced by {}.",
                    previous.id(),
                    handle.id()
                );
            }
            previous.cancel();
        }
    }

    /// Forgets `handle` if it still owns its name.
    pub(crate) fn release(&self, handle: &TaskHandle) {
        let Some(name) = handle.name() else {
            return;
        };
        let mut table = self.lock();
        if table.get(name).is_some_and(|owner| owner.same_task(handle)) {
            table.remove(name);
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<TaskHandle> {
        self.lock().get(name).cloned()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }
}

/// Starts and cancels tasks on behalf of a [`Scheduler`](crate::Scheduler).
///
/// A spawner can be cloned freely and moved into task actions or binding
/// hooks. Tasks it starts are admitted at the end of the scheduler's current
/// tick (or at the start of the next one) and first advance on the following
/// tick. Name replacement is immediate: the previous task under the same
/// name never runs another step.
pub struct Spawner<W> {
    sender: flume::Sender<LiveTask<W>>,
    ids: Arc<AtomicU64>,
    names: Arc<NameTable>,
}

impl<W: 'static> Spawner<W> {
    pub(crate) fn new(
        sender: flume::Sender<LiveTask<W>>,
        ids: Arc<AtomicU64>,
        names: Arc<NameTable>,
    ) -> Self {
        Self { sender, ids, names }
    }

    pub(crate) fn allocate(&self, name: Option<&str>) -> TaskHandle {
        let id = TaskId(self.ids.fetch_add(1, Ordering::SeqCst));
        let handle = TaskHandle::new(id, name);
        self.names.claim(&handle);
        handle
    }

    /// Starts an anonymous task.
    pub fn spawn(&self, task: Task<W>) -> TaskHandle {
        self.submit(task, None)
    }

    /// Starts a task under `name`, cancelling any task already running under it.
    pub fn spawn_named(&self, task: Task<W>, name: &str) -> TaskHandle {
        self.submit(task, Some(name))
    }

    /// Cancels the task running under `name`. Returns `false` if there is none.
    pub fn cancel_named(&self, name: &str) -> bool {
        match self.names.lookup(name) {
            Some(handle) => {
                let was_alive = handle.is_alive();
                handle.cancel();
                self.names.release(&handle);
                was_alive
            }
            None => false,
        }
    }

    /// Returns `true` if a live task is registered under `name`.
    pub fn is_running(&self, name: &str) -> bool {
        self.names
            .lookup(name)
            .is_some_and(|handle| handle.is_alive())
    }

    fn submit(&self, task: Task<W>, name: Option<&str>) -> TaskHandle {
        let handle = self.allocate(name);
        log::trace!(
            "Queuing task {} ({}).",
            handle.id(),
            task.label().unwrap_or("unlabelled")
        );

        if self
            .sender
            .send(LiveTask::new(task, handle.clone()))
            .is_err()
        {
            log::warn!(
                "Scheduler is gone; task {} will never run.",
                handle.id()
            );
            handle.cancel();
            self.names.release(&handle);
        }
        handle
    }
}

impl<W> Clone for Spawner<W> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            ids: Arc::clone(&self.ids),
            names: Arc::clone(&self.names),
        }
    }
}

impl<W> fmt::Debug for Spawner<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("queued", &self.sender.len())
            .finish()
    }
}
