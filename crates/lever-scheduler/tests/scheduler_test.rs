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

use lever_scheduler::{Scheduler, Spawner, Task};
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

/// The world the test tasks operate on.
#[derive(Default)]
struct Journal {
    entries: Vec<&'static str>,
    ready: bool,
    spawner: Option<Spawner<Journal>>,
}

fn run_ticks(scheduler: &mut Scheduler<Journal>, journal: &mut Journal, ticks: usize) {
    for _ in 0..ticks {
        scheduler.tick(journal, FRAME);
    }
}

#[test]
fn test_started_task_waits_for_first_tick() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let handle = scheduler.start(Task::once(|j: &mut Journal| j.entries.push("ran")));

    assert!(journal.entries.is_empty());
    assert!(handle.is_alive());

    let completed = scheduler.tick(&mut journal, FRAME);

    assert_eq!(completed, 1);
    assert_eq!(journal.entries, ["ran"]);
    assert!(handle.is_finished());
    assert!(scheduler.is_idle());
}

#[test]
fn test_non_suspending_steps_run_in_one_tick() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let task = Task::builder()
        .run(|j: &mut Journal| j.entries.push("a"))
        .wait_ticks(0)
        .wait_for(Duration::ZERO)
        .run(|j: &mut Journal| j.entries.push("b"))
        .build();
    scheduler.start(task);

    scheduler.tick(&mut journal, FRAME);

    assert_eq!(journal.entries, ["a", "b"]);
}

#[test]
fn test_wait_ticks_resumes_after_exact_count() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let task = Task::builder()
        .run(|j: &mut Journal| j.entries.push("before"))
        .wait_ticks(3)
        .run(|j: &mut Journal| j.entries.push("after"))
        .build();
    scheduler.start(task);

    run_ticks(&mut scheduler, &mut journal, 3);
    assert_eq!(journal.entries, ["before"]);

    scheduler.tick(&mut journal, FRAME);
    assert_eq!(journal.entries, ["before", "after"]);
}

#[test]
fn test_wait_for_accumulates_tick_deltas() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let task = Task::builder()
        .wait_for(Duration::from_millis(40))
        .run(|j: &mut Journal| j.entries.push("elapsed"))
        .build();
    scheduler.start(task);

    // The tick that reaches the wait does not count towards it.
    run_ticks(&mut scheduler, &mut journal, 3);
    assert!(journal.entries.is_empty());

    scheduler.tick(&mut journal, FRAME);
    assert_eq!(journal.entries, ["elapsed"]);
}

#[test]
fn test_wait_until_reevaluates_every_tick() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let task = Task::builder()
        .wait_until(|j: &Journal| j.ready)
        .run(|j: &mut Journal| j.entries.push("ready"))
        .build();
    let handle = scheduler.start(task);

    run_ticks(&mut scheduler, &mut journal, 10);
    assert!(journal.entries.is_empty());
    assert!(handle.is_alive());

    journal.ready = true;
    scheduler.tick(&mut journal, FRAME);

    assert_eq!(journal.entries, ["ready"]);
    assert!(handle.is_finished());
}

#[test]
fn test_wait_until_does_not_suspend_when_already_true() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal {
        ready: true,
        ..Default::default()
    };
    let task = Task::builder()
        .wait_until(|j: &Journal| j.ready)
        .run(|j: &mut Journal| j.entries.push("immediate"))
        .build();
    scheduler.start(task);

    scheduler.tick(&mut journal, FRAME);

    assert_eq!(journal.entries, ["immediate"]);
}

#[test]
fn test_bounded_wait_gives_up_after_limit() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let task = Task::builder()
        .wait_until_within(|j: &Journal| j.ready, Duration::from_millis(32))
        .run(|j: &mut Journal| j.entries.push("moved on"))
        .build();
    scheduler.start(task);

    run_ticks(&mut scheduler, &mut journal, 2);
    assert!(journal.entries.is_empty());

    scheduler.tick(&mut journal, FRAME);
    assert_eq!(journal.entries, ["moved on"]);
}

#[test]
fn test_cancelled_task_never_runs_remaining_steps() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let task = Task::builder()
        .run(|j: &mut Journal| j.entries.push("prefix"))
        .yield_tick()
        .run(|j: &mut Journal| j.entries.push("suffix"))
        .build();
    let handle = scheduler.start(task);

    scheduler.tick(&mut journal, FRAME);
    scheduler.cancel(&handle);
    scheduler.cancel(&handle);
    run_ticks(&mut scheduler, &mut journal, 3);

    assert_eq!(journal.entries, ["prefix"]);
    assert!(handle.is_cancelled());
    assert!(!handle.is_finished());
    assert!(scheduler.is_idle());
}

#[test]
fn test_task_can_cancel_itself_mid_sequence() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let own = std::sync::Arc::new(std::sync::Mutex::new(None::<lever_scheduler::TaskHandle>));
    let own_in_task = std::sync::Arc::clone(&own);
    let task = Task::builder()
        .run(move |j: &mut Journal| {
            j.entries.push("first");
            if let Some(handle) = own_in_task.lock().unwrap().as_ref() {
                handle.cancel();
            }
        })
        .run(|j: &mut Journal| j.entries.push("second"))
        .build();
    let handle = scheduler.start(task);
    *own.lock().unwrap() = Some(handle.clone());

    scheduler.tick(&mut journal, FRAME);

    assert_eq!(journal.entries, ["first"]);
    assert!(handle.is_cancelled());
}

#[test]
fn test_named_task_replacement() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let first = Task::builder()
        .run(|j: &mut Journal| j.entries.push("t1 start"))
        .wait_until(|_: &Journal| false)
        .run(|j: &mut Journal| j.entries.push("t1 end"))
        .build();
    let t1 = scheduler.start_named(first, "x");
    scheduler.tick(&mut journal, FRAME);
    assert!(scheduler.is_running("x"));

    let second = Task::builder()
        .run(|j: &mut Journal| j.entries.push("t2 start"))
        .yield_tick()
        .run(|j: &mut Journal| j.entries.push("t2 end"))
        .build();
    let t2 = scheduler.start_named(second, "x");
    run_ticks(&mut scheduler, &mut journal, 5);

    assert_eq!(journal.entries, ["t1 start", "t2 start", "t2 end"]);
    assert!(t1.is_cancelled());
    assert!(t2.is_finished());
    assert!(!scheduler.is_running("x"));
    assert!(scheduler.is_idle());
}

#[test]
fn test_cancel_named_is_idempotent() {
    let mut scheduler = Scheduler::<Journal>::new();
    let handle = scheduler.start_named(Task::builder().yield_tick().build(), "once");

    assert!(scheduler.cancel_named("once"));
    assert!(!scheduler.cancel_named("once"));
    assert!(!scheduler.cancel_named("unknown"));
    assert!(handle.is_cancelled());
}

#[test]
fn test_spawner_from_inside_action_runs_next_tick() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal {
        spawner: Some(scheduler.spawner()),
        ..Default::default()
    };
    let parent = Task::once(|j: &mut Journal| {
        j.entries.push("parent");
        if let Some(spawner) = j.spawner.as_ref() {
            spawner.spawn(Task::once(|j: &mut Journal| j.entries.push("child")));
        }
    });
    scheduler.start(parent);

    scheduler.tick(&mut journal, FRAME);
    assert_eq!(journal.entries, ["parent"]);
    assert_eq!(scheduler.len(), 1);

    scheduler.tick(&mut journal, FRAME);
    assert_eq!(journal.entries, ["parent", "child"]);
}

#[test]
fn test_spawner_named_replacement_is_immediate() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal {
        spawner: Some(scheduler.spawner()),
        ..Default::default()
    };
    let spawner = scheduler.spawner();
    let old = spawner.spawn_named(
        Task::builder()
            .wait_ticks(2)
            .run(|j: &mut Journal| j.entries.push("old"))
            .build(),
        "replay",
    );
    scheduler.tick(&mut journal, FRAME);

    // The replacement lands while the old task is still parked.
    let replacer = Task::once(|j: &mut Journal| {
        if let Some(spawner) = j.spawner.as_ref() {
            spawner.spawn_named(
                Task::once(|j: &mut Journal| j.entries.push("new")),
                "replay",
            );
        }
    });
    scheduler.start(replacer);
    run_ticks(&mut scheduler, &mut journal, 3);

    assert!(old.is_cancelled());
    assert_eq!(journal.entries, ["new"]);
}

#[test]
fn test_spawn_after_scheduler_dropped_is_cancelled() {
    let scheduler = Scheduler::<Journal>::new();
    let spawner = scheduler.spawner();
    drop(scheduler);

    let handle = spawner.spawn(Task::once(|j: &mut Journal| j.entries.push("never")));

    assert!(handle.is_cancelled());
}

#[test]
fn test_cancel_all_clears_queued_tasks() {
    let mut scheduler = Scheduler::new();
    let mut journal = Journal::default();
    let spawner = scheduler.spawner();
    let queued = spawner.spawn(Task::once(|j: &mut Journal| j.entries.push("queued")));
    let started = scheduler.start(Task::once(|j: &mut Journal| j.entries.push("started")));

    scheduler.cancel_all();
    scheduler.tick(&mut journal, FRAME);

    assert!(journal.entries.is_empty());
    assert!(queued.is_cancelled());
    assert!(started.is_cancelled());
}
