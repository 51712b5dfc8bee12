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

//! The individual steps a task is made of, and the suspension state they
//! turn into once reached.

use std::time::Duration;

pub(crate) type Action<W> = Box<dyn FnOnce(&mut W) + Send>;
pub(crate) type Predicate<W> = Box<dyn FnMut(&W) -> bool + Send>;

/// One instruction of a task.
pub(crate) enum Step<W> {
    /// Runs immediately, without suspending.
    Run(Action<W>),
    /// Suspends for the given number of ticks.
    WaitTicks(u32),
    /// Suspends until the accumulated tick deltas reach the duration.
    WaitFor(Duration),
    /// Suspends until the predicate holds.
    WaitUntil(Predicate<W>),
    /// Suspends until the predicate holds or the limit elapses.
    WaitUntilWithin(Predicate<W>, Duration),
}

/// The suspension a task is currently parked on.
pub(crate) enum Wait<W> {
    Ticks(u32),
    Elapsed {
        elapsed: Duration,
        target: Duration,
    },
    Until(Predicate<W>),
    UntilWithin {
        predicate: Predicate<W>,
        elapsed: Duration,
        limit: Duration,
    },
}

impl<W> Wait<W> {
    /// Accounts for one more tick. Returns the wait if it must go on.
    pub(crate) fn poll(self, world: &W, dt: Duration) -> Option<Self> {
        match self {
            Wait::Ticks(remaining) => (remaining > 1).then(|| Wait::Ticks(remaining - 1)),
            Wait::Elapsed { elapsed, target } => {
                let elapsed = elapsed + dt;
                (elapsed < target).then_some(Wait::Elapsed { elapsed, target })
            }
            Wait::Until(mut predicate) => {
                if predicate(world) {
                    None
                } else {
                    Some(Wait::Until(predicate))
                }
            }
            Wait::UntilWithin {
                mut predicate,
                elapsed,
                limit,
            } => {
                let elapsed = elapsed + dt;
                if predicate(world) || elapsed >= limit {
                    None
                } else {
                    Some(Wait::UntilWithin {
                        predicate,
                        elapsed,
                        limit,
                    })
                }
            }
        }
    }
}
