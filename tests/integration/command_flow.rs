//! End-to-end command flows through the dispatcher.
//!
//! Drives whole command sequences against one store the way a chat
//! session would, checking that outcomes and list state line up at
//! every step.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use todobot_core::command::{self, Command};
use todobot_core::outcome::{ArgumentError, Failure, Notice, Outcome, Payload};
use todobot_core::snapshot::MemoryStorage;
use todobot_core::store::TaskStore;
use todobot_core::user::UserId;

fn make_store() -> TaskStore {
    TaskStore::open(Box::new(MemoryStorage::new())).unwrap()
}

fn user() -> UserId {
    UserId::new("flow-user")
}

/// Parses and runs one prefixed-style line, e.g. `("add", "Buy milk")`.
fn run(store: &mut TaskStore, name: &str, args: &str) -> Outcome {
    let cmd = Command::parse(name).expect("command name outside the closed set");
    command::dispatch(store, &user(), cmd, args)
}

#[test]
fn add_check_stats_clear_lifecycle() {
    let mut store = make_store();

    let outcome = run(&mut store, "add", "Buy milk");
    assert_eq!(
        outcome,
        Outcome::Success(Payload::Added {
            text: "Buy milk".to_string(),
            ordinal: 1
        })
    );

    let outcome = run(&mut store, "check", "1");
    assert!(matches!(
        outcome,
        Outcome::Success(Payload::Checked { ordinal: 1, ref task }) if task.completed
    ));

    let Outcome::Success(Payload::Stats(stats)) = run(&mut store, "stats", "") else {
        panic!("expected stats payload");
    };
    assert_eq!(stats.total, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.incomplete, 0);
    assert!((stats.completion_rate - 100.0).abs() < f64::EPSILON);

    let outcome = run(&mut store, "clear", "");
    assert_eq!(outcome, Outcome::Success(Payload::Cleared { removed: 1 }));

    // The cleared list behaves like a fresh one.
    assert_eq!(run(&mut store, "stats", ""), Outcome::Failure(Failure::EmptyList));
    assert_eq!(
        run(&mut store, "list", ""),
        Outcome::Success(Payload::Listing { tasks: vec![] })
    );
}

#[test]
fn remove_renumbers_remaining_tasks() {
    let mut store = make_store();
    for text in ["A", "B", "C"] {
        run(&mut store, "add", text);
    }

    let outcome = run(&mut store, "remove", "2");
    assert!(
        matches!(outcome, Outcome::Success(Payload::Removed { ref task }) if task.text == "B")
    );

    let Outcome::Success(Payload::Listing { tasks }) = run(&mut store, "list", "") else {
        panic!("expected listing payload");
    };
    let texts: Vec<_> = tasks.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["A", "C"]);

    // Ordinal 2 now addresses the task that used to be #3.
    let outcome = run(&mut store, "check", "2");
    assert!(matches!(
        outcome,
        Outcome::Success(Payload::Checked { ordinal: 2, ref task }) if task.text == "C"
    ));
}

#[test]
fn check_uncheck_cycle_with_notices() {
    let mut store = make_store();
    run(&mut store, "add", "flip me");

    assert_eq!(
        run(&mut store, "uncheck", "1"),
        Outcome::Unchanged(Notice::AlreadyIncomplete { ordinal: 1 })
    );
    assert!(matches!(
        run(&mut store, "check", "1"),
        Outcome::Success(Payload::Checked { .. })
    ));
    assert_eq!(
        run(&mut store, "check", "1"),
        Outcome::Unchanged(Notice::AlreadyCompleted { ordinal: 1 })
    );
    assert!(matches!(
        run(&mut store, "uncheck", "1"),
        Outcome::Success(Payload::Unchecked { .. })
    ));
    assert!(!store.tasks(&user())[0].completed);
}

#[test]
fn clear_completed_flow() {
    let mut store = make_store();
    for text in ["keep one", "done one", "keep two", "done two"] {
        run(&mut store, "add", text);
    }
    run(&mut store, "check", "2");
    run(&mut store, "check", "4");

    assert_eq!(
        run(&mut store, "clearCompleted", ""),
        Outcome::Success(Payload::CompletedCleared { removed: 2 })
    );
    let texts: Vec<_> = store.tasks(&user()).iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["keep one", "keep two"]);

    // Running it again finds nothing completed.
    assert_eq!(
        run(&mut store, "clearCompleted", ""),
        Outcome::Unchanged(Notice::NoCompletedTasks)
    );
}

#[test]
fn bad_arguments_never_touch_the_list() {
    let mut store = make_store();
    run(&mut store, "add", "only task");

    assert_eq!(
        run(&mut store, "add", "   "),
        Outcome::Failure(Failure::Argument(ArgumentError::MissingText))
    );
    assert_eq!(
        run(&mut store, "check", ""),
        Outcome::Failure(Failure::Argument(ArgumentError::MissingNumber))
    );
    assert_eq!(
        run(&mut store, "remove", "two"),
        Outcome::Failure(Failure::Argument(ArgumentError::InvalidNumber {
            given: "two".to_string()
        }))
    );
    assert_eq!(
        run(&mut store, "check", "-3"),
        Outcome::Failure(Failure::Argument(ArgumentError::InvalidNumber {
            given: "-3".to_string()
        }))
    );

    assert_eq!(store.tasks(&user()).len(), 1);
    assert!(!store.tasks(&user())[0].completed);
}

#[test]
fn empty_list_failures_before_range_checks() {
    let mut store = make_store();
    for name in ["check", "uncheck", "remove"] {
        assert_eq!(
            run(&mut store, name, "1"),
            Outcome::Failure(Failure::EmptyList),
            "{name} on an empty list"
        );
    }
    assert_eq!(run(&mut store, "clear", ""), Outcome::Failure(Failure::EmptyList));
    assert_eq!(
        run(&mut store, "clearCompleted", ""),
        Outcome::Failure(Failure::EmptyList)
    );
}

#[test]
fn out_of_range_reports_the_valid_span() {
    let mut store = make_store();
    run(&mut store, "add", "a");
    run(&mut store, "add", "b");

    assert_eq!(
        run(&mut store, "remove", "0"),
        Outcome::Failure(Failure::OutOfRange { given: 0, len: 2 })
    );
    assert_eq!(
        run(&mut store, "remove", "3"),
        Outcome::Failure(Failure::OutOfRange { given: 3, len: 2 })
    );
    // The failed attempts left both tasks alone.
    assert_eq!(store.tasks(&user()).len(), 2);
}

#[test]
fn users_never_see_each_other() {
    let mut store = make_store();
    let alice = UserId::new("alice");
    let bob = UserId::new("bob");

    command::dispatch(&mut store, &alice, Command::Add, "alice task");
    command::dispatch(&mut store, &bob, Command::Add, "bob task");
    command::dispatch(&mut store, &bob, Command::Check, "1");

    let Outcome::Success(Payload::Listing { tasks }) =
        command::dispatch(&mut store, &alice, Command::List, "")
    else {
        panic!("expected listing payload");
    };
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].text, "alice task");
    assert!(!tasks[0].completed);

    let outcome = command::dispatch(&mut store, &bob, Command::Clear, "");
    assert_eq!(outcome, Outcome::Success(Payload::Cleared { removed: 1 }));
    assert_eq!(store.tasks(&alice).len(), 1);
}
