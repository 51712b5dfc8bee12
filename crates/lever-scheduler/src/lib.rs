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

//! # Lever Scheduler
//!
//! A single-threaded, cooperative task runner driven by the host's per-frame
//! callback.
//!
//! A [`Task`] is an ordered list of steps. Each step either runs an action
//! immediately or suspends the task (for one tick, N ticks, a duration, or
//! until a predicate holds). Every call to [`Scheduler::tick`] advances each
//! live task through its non-suspending steps until it reaches a suspension
//! point or completes. Nothing here ever blocks the thread or spawns one.
//!
//! ```rust
//! use lever_scheduler::{Scheduler, Task};
//! use std::time::Duration;
//!
//! let mut scheduler = Scheduler::<Vec<&'static str>>::new();
//! let task = Task::builder()
//!     .run(|log: &mut Vec<&'static str>| log.push("first"))
//!     .yield_tick()
//!     .run(|log| log.push("second"))
//!     .build();
//! let handle = scheduler.start(task);
//!
//! let mut log = Vec::new();
//! scheduler.tick(&mut log, Duration::from_millis(16));
//! assert_eq!(log, ["first"]);
//! scheduler.tick(&mut log, Duration::from_millis(16));
//! assert_eq!(log, ["first", "second"]);
//! assert!(handle.is_finished());
//! ```

mod handle;
mod scheduler;
mod spawner;
mod step;
mod task;

pub use handle::{TaskHandle, TaskId};
pub use scheduler::Scheduler;
pub use spawner::Spawner;
pub use task::{Task, TaskBuilder};
