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

//! Task definitions and the builder used to compose them.

use crate::step::Step;
use std::collections::VecDeque;
use std::time::Duration;

/// An ordered sequence of steps, run by a [`Scheduler`](crate::Scheduler).
///
/// `W` is the world every step operates on; it is handed to actions as
/// `&mut W` and to predicates as `&W` on each tick.
pub struct Task<W> {
    pub(crate) steps: VecDeque<Step<W>>,
    pub(crate) label: Option<String>,
}

impl<W: 'static> Task<W> {
    /// Starts composing a new task.
    pub fn builder() -> TaskBuilder<W> {
        TaskBuilder::new()
    }

    /// A task made of a single action.
    pub fn once<F>(action: F) -> Self
    where
        F: FnOnce(&mut W) + Send + 'static,
    {
        TaskBuilder::new().run(action).build()
    }

    /// Returns the number of steps not yet executed.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if the task has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the label used in log output, if one was set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// Composes a [`Task`] step by step.
pub struct TaskBuilder<W> {
    steps: VecDeque<Step<W>>,
    label: Option<String>,
}

impl<W: 'static> TaskBuilder<W> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            label: None,
        }
    }

    /// Sets a label shown in log output.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Appends an action that runs without suspending.
    pub fn run<F>(mut self, action: F) -> Self
    where
        F: FnOnce(&mut W) + Send + 'static,
    {
        self.steps.push_back(Step::Run(Box::new(action)));
        self
    }

    /// Suspends the task until the next tick.
    pub fn yield_tick(self) -> Self {
        self.wait_ticks(1)
    }

    /// Suspends the task for `ticks` ticks. Zero does not suspend.
    pub fn wait_ticks(mut self, ticks: u32) -> Self {
        self.steps.push_back(Step::WaitTicks(ticks));
        self
    }

    /// Suspends the task until the tick deltas accumulated since this step
    /// was reached add up to `duration`.
    pub fn wait_for(mut self, duration: Duration) -> Self {
        self.steps.push_back(Step::WaitFor(duration));
        self
    }

    /// Suspends the task until `predicate` holds.
    ///
    /// The predicate is checked as soon as the step is reached, then once per
    /// tick. It is never timed out: a predicate that stays `false` parks the
    /// task forever. Use [`wait_until_within`](Self::wait_until_within) for a
    /// bounded wait.
    pub fn wait_until<P>(mut self, predicate: P) -> Self
    where
        P: FnMut(&W) -> bool + Send + 'static,
    {
        self.steps.push_back(Step::WaitUntil(Box::new(predicate)));
        self
    }

    /// Suspends the task until `predicate` holds or `limit` has elapsed,
    /// whichever comes first.
    pub fn wait_until_within<P>(mut self, predicate: P, limit: Duration) -> Self
    where
        P: FnMut(&W) -> bool + Send + 'static,
    {
        self.steps
            .push_back(Step::WaitUntilWithin(Box::new(predicate), limit));
        self
    }

    /// Finishes the task.
    pub fn build(self) -> Task<W> {
        Task {
            steps: self.steps,
            label: self.label,
        }
    }
}

impl<W: 'static> Default for TaskBuilder<W> {
    fn default() -> Self {
        Self::new()
    }
}
