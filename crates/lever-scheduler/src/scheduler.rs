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

//! The tick-driven runner itself.

use crate::handle::TaskHandle;
use crate::spawner::{NameTable, Spawner};
use crate::step::{Step, Wait};
use crate::task::Task;
use std::collections::VecDeque;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

/// What happened to a task during one advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    Suspended,
    Finished,
    Cancelled,
}

/// A started task together with its execution state.
pub(crate) struct LiveTask<W> {
    handle: TaskHandle,
    label: Option<String>,
    steps: VecDeque<Step<W>>,
    wait: Option<Wait<W>>,
}

impl<W> LiveTask<W> {
    pub(crate) fn new(task: Task<W>, handle: TaskHandle) -> Self {
        Self {
            handle,
            label: task.label,
            steps: task.steps,
            wait: None,
        }
    }

    /// Runs steps until the task suspends, completes or is cancelled.
    fn advance(&mut self, world: &mut W, dt: Duration) -> Progress {
        if let Some(wait) = self.wait.take() {
            if self.handle.is_cancelled() {
                return Progress::Cancelled;
            }
            if let Some(pending) = wait.poll(&*world, dt) {
                self.wait = Some(pending);
                return Progress::Suspended;
            }
        }

        loop {
            if self.handle.is_cancelled() {
                return Progress::Cancelled;
            }
            let Some(step) = self.steps.pop_front() else {
                return Progress::Finished;
            };

            match step {
                Step::Run(action) => action(world),
                Step::WaitTicks(0) => {}
                Step::WaitTicks(ticks) => {
                    self.wait = Some(Wait::Ticks(ticks));
                    return Progress::Suspended;
                }
                Step::WaitFor(duration) if duration.is_zero() => {}
                Step::WaitFor(duration) => {
                    self.wait = Some(Wait::Elapsed {
                        elapsed: Duration::ZERO,
                        target: duration,
                    });
                    return Progress::Suspended;
                }
                Step::WaitUntil(mut predicate) => {
                    if !predicate(&*world) {
                        self.wait = Some(Wait::Until(predicate));
                        return Progress::Suspended;
                    }
                }
                Step::WaitUntilWithin(mut predicate, limit) => {
                    if !predicate(&*world) && !limit.is_zero() {
                        self.wait = Some(Wait::UntilWithin {
                            predicate,
                            elapsed: Duration::ZERO,
                            limit,
                        });
                        return Progress::Suspended;
                    }
                }
            }
        }
    }

    fn describe(&self) -> &str {
        self.label
            .as_deref()
            .or_else(|| self.handle.name())
            .unwrap_or("unlabelled")
    }
}

/// Runs suspendable tasks to completion across host ticks.
///
/// The scheduler is single-threaded and cooperative: it only does work inside
/// [`tick`](Self::tick), on the thread that calls it. Each tick advances every
/// live task through its non-suspending steps until the task reaches a
/// suspension point or completes.
///
/// Tasks started with [`start`](Self::start) between ticks first advance on
/// the next tick. At most one live task exists per name: starting a task
/// under a name that is already running cancels and discards the old one.
pub struct Scheduler<W> {
    tasks: Vec<LiveTask<W>>,
    incoming: flume::Receiver<LiveTask<W>>,
    spawner: Spawner<W>,
    names: Arc<NameTable>,
    ticks: u64,
}

impl<W: 'static> Scheduler<W> {
    /// Creates an idle scheduler.
    pub fn new() -> Self {
        let (sender, incoming) = flume::unbounded();
        let names = Arc::new(NameTable::default());
        let spawner = Spawner::new(sender, Arc::new(AtomicU64::new(1)), Arc::clone(&names));
        Self {
            tasks: Vec::new(),
            incoming,
            spawner,
            names,
            ticks: 0,
        }
    }

    /// Returns a spawner feeding this scheduler.
    pub fn spawner(&self) -> Spawner<W> {
        self.spawner.clone()
    }

    /// Starts an anonymous task.
    pub fn start(&mut self, task: Task<W>) -> TaskHandle {
        let handle = self.spawner.allocate(None);
        self.admit(LiveTask::new(task, handle.clone()));
        handle
    }

    /// Starts a task under `name`, first cancelling and discarding any task
    /// previously started under the same name.
    pub fn start_named(&mut self, task: Task<W>, name: &str) -> TaskHandle {
        let handle = self.spawner.allocate(Some(name));
        self.admit(LiveTask::new(task, handle.clone()));
        handle
    }

    /// Cancels the task behind `handle`. Idempotent.
    pub fn cancel(&mut self, handle: &TaskHandle) {
        handle.cancel();
        self.names.release(handle);
        self.purge();
    }

    /// Cancels the task running under `name`. Returns `false` if there is none.
    pub fn cancel_named(&mut self, name: &str) -> bool {
        let cancelled = self.spawner.cancel_named(name);
        self.purge();
        cancelled
    }

    /// Cancels every task, including ones queued by spawners.
    pub fn cancel_all(&mut self) {
        self.accept_incoming();
        for task in &self.tasks {
            task.handle.cancel();
        }
        self.tasks.clear();
        self.names.clear();
        log::debug!("Scheduler: all tasks cancelled.");
    }

    /// Returns `true` if a live task is registered under `name`.
    pub fn is_running(&self, name: &str) -> bool {
        self.spawner.is_running(name)
    }

    /// Returns the number of live tasks, including those queued by spawners.
    pub fn len(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| task.handle.is_alive())
            .count()
            + self.incoming.len()
    }

    /// Returns `true` if no task is live.
    pub fn is_idle(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Advances every live task by one tick.
    ///
    /// `dt` is the time elapsed since the previous tick; it drives
    /// duration-based waits. Returns the number of tasks that completed
    /// during this tick.
    pub fn tick(&mut self, world: &mut W, dt: Duration) -> usize {
        self.accept_incoming();
        self.ticks += 1;

        let mut completed = 0;
        let tasks = std::mem::take(&mut self.tasks);
        let mut survivors = Vec::with_capacity(tasks.len());

        for mut task in tasks {
            match task.advance(world, dt) {
                Progress::Suspended => survivors.push(task),
                Progress::Finished => {
                    task.handle.mark_finished();
                    self.names.release(&task.handle);
                    completed += 1;
                    log::trace!("Task {} ({}) completed.", task.handle.id(), task.describe());
                }
                Progress::Cancelled => {
                    self.names.release(&task.handle);
                    log::debug!(
                        "Task {} ({}) abandoned after cancellation.",
                        task.handle.id(),
                        task.describe()
                    );
                }
            }
        }

        self.tasks = survivors;
        self.accept_incoming();
        completed
    }

    fn admit(&mut self, task: LiveTask<W>) {
        log::trace!("Admitting task {} ({}).", task.handle.id(), task.describe());
        self.purge();
        self.tasks.push(task);
    }

    fn accept_incoming(&mut self) {
        while let Ok(task) = self.incoming.try_recv() {
            if task.handle.is_cancelled() {
                continue;
            }
            self.admit(task);
        }
    }

    fn purge(&mut self) {
        self.tasks.retain(|task| !task.handle.is_cancelled());
    }
}

impl<W: 'static> Default for Scheduler<W> {
    fn default() -> Self {
        Self::new()
    }
}
