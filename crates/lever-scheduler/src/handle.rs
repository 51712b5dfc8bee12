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

//! Handles returned for every started task.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Identifies one started task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct TaskFlags {
    cancelled: AtomicBool,
    finished: AtomicBool,
}

/// A cancellable reference to a started task.
///
/// Handles are cheap to clone; all clones observe the same task. Cancelling
/// takes effect before the task's next step, even when requested from inside
/// one of its own actions.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    name: Option<Arc<str>>,
    flags: Arc<TaskFlags>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, name: Option<&str>) -> Self {
        Self {
            id,
            name: name.map(Arc::from),
            flags: Arc::new(TaskFlags::default()),
        }
    }

    /// Returns the task's id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the name the task was started under, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Stops the task. Does nothing if it already finished or was cancelled.
    pub fn cancel(&self) {
        if !self.is_finished() {
            self.flags.cancelled.store(true, Ordering::SeqCst);
        }
    }

    /// Returns `true` if the task was cancelled before completing.
    pub fn is_cancelled(&self) -> bool {
        self.flags.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `true` if the task ran all of its steps.
    pub fn is_finished(&self) -> bool {
        self.flags.finished.load(Ordering::SeqCst)
    }

    /// Returns `true` while the task is neither finished nor cancelled.
    pub fn is_alive(&self) -> bool {
        !self.is_finished() && !self.is_cancelled()
    }

    pub(crate) fn mark_finished(&self) {
        self.flags.finished.store(true, Ordering::SeqCst);
    }

    pub(crate) fn same_task(&self, other: &TaskHandle) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}
