mod common;

use std::path::PathBuf;

use common::{calc_project, fast_options, runtime, with_timeout, FAILING_CALC, PASSING_CALC};
use testwatch::engine::{ControlEvent, NextStep, RuntimeOptions};
use testwatch::report::{Direction, StatusCategory};
use testwatch_test_utils::builders::{errored, failed, passed};
use testwatch_test_utils::{FakeHarness, RecordingSink, Scripted};

#[tokio::test]
async fn fixing_a_failing_test_emits_one_fixed_notification() {
    common::init_tracing();

    let fs = calc_project(FAILING_CALC);
    let harness = FakeHarness::new();
    harness.push(Scripted::Outcomes(vec![failed(
        "calc::tests::adds",
        "assertion `left == right` failed\n  left: 0\n right: 4",
    )]));
    let sink = RecordingSink::new();
    let (mut rt, _tx) = runtime(&fs, &["proj/src"], harness.clone(), sink.clone(), fast_options());

    // Baseline: one failure recorded, nothing announced.
    let first = rt.run_cycle().await;
    assert!(first.executed);
    assert!(first.transitions.is_empty());
    let last = rt.core().last_report();
    assert_eq!(last.category(StatusCategory::Failure).len(), 1);
    assert!(last.get(StatusCategory::Failure, &"calc::tests::adds".into()).is_some());
    assert_eq!(harness.runs(), vec![vec!["calc::tests::".to_string()]]);

    // Nothing changed: no run.
    let idle = rt.run_cycle().await;
    assert!(!idle.executed);
    assert_eq!(idle.next, NextStep::Sleep(fast_options().delay));

    // Fix the code; the harness now reports everything as passing.
    fs.add_file("proj/src/calc.rs", PASSING_CALC);
    let second = rt.run_cycle().await;
    assert_eq!(second.changed, vec![PathBuf::from("proj/src/calc.rs")]);
    assert!(second.executed);
    assert!(rt.core().last_report().is_empty());

    assert_eq!(second.transitions.len(), 1);
    let fixed = &second.transitions[0];
    assert_eq!(fixed.direction, Direction::Fixed);
    assert_eq!(fixed.category, StatusCategory::Failure);
    assert_eq!(fixed.identity.as_str(), "calc::tests::adds");

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Fixed failure");
    assert_eq!(events[0].body, "adds (calc::tests)");
}

#[tokio::test]
async fn newly_broken_test_is_announced_with_detail() {
    let fs = calc_project(PASSING_CALC);
    let harness = FakeHarness::new();
    let sink = RecordingSink::new();
    let (mut rt, _tx) = runtime(&fs, &["proj/src"], harness.clone(), sink.clone(), fast_options());

    rt.run_cycle().await;
    assert!(sink.events().is_empty());

    fs.add_file("proj/src/calc.rs", FAILING_CALC);
    harness.push(Scripted::Outcomes(vec![failed("calc::tests::adds", "assertion failed: 0 == 4")]));
    let cycle = rt.run_cycle().await;

    assert_eq!(cycle.transitions.len(), 1);
    assert_eq!(cycle.transitions[0].direction, Direction::Broke);
    let events = sink.events();
    assert_eq!(events[0].title, "Test failure");
    assert_eq!(events[0].body, "adds (calc::tests)\n\nassertion failed: 0 == 4");
}

#[tokio::test]
async fn harness_failure_keeps_previous_report() {
    let fs = calc_project(FAILING_CALC);
    let harness = FakeHarness::new();
    harness
        .push(Scripted::Outcomes(vec![failed("calc::tests::adds", "assertion failed")]))
        .push(Scripted::Fail("could not compile `proj`".into()));
    let sink = RecordingSink::new();
    let (mut rt, _tx) = runtime(&fs, &["proj/src"], harness.clone(), sink.clone(), fast_options());

    rt.run_cycle().await;

    // Parses, but would not compile.
    fs.add_file("proj/src/calc.rs", FAILING_CALC.replace("a - b", "a + missing"));
    let broken_build = rt.run_cycle().await;
    assert!(broken_build.executed);
    assert!(broken_build.transitions.is_empty());
    assert_eq!(rt.core().last_report().len(), 1);

    // No re-run until the next change.
    assert!(!rt.run_cycle().await.executed);

    fs.add_file("proj/src/calc.rs", PASSING_CALC);
    let fixed = rt.run_cycle().await;
    assert_eq!(fixed.transitions.len(), 1);
    assert_eq!(fixed.transitions[0].direction, Direction::Fixed);
}

#[tokio::test]
async fn interrupt_aborts_only_the_current_run() {
    let fs = calc_project(FAILING_CALC);
    let harness = FakeHarness::new();
    harness.push(Scripted::Hang);
    let (mut rt, tx) = runtime(&fs, &["proj/src"], harness.clone(), RecordingSink::new(), fast_options());

    tx.send(ControlEvent::Interrupt).await.unwrap();
    let aborted = with_timeout(rt.run_cycle()).await;
    assert!(aborted.executed);
    assert!(matches!(aborted.next, NextStep::Sleep(_)));
    assert!(!rt.core().last_report().is_observed());

    // Loop continues: a later change runs the suite again.
    fs.add_file("proj/src/calc.rs", PASSING_CALC);
    let rerun = with_timeout(rt.run_cycle()).await;
    assert!(rerun.executed);
    assert!(rt.core().last_report().is_observed());
    assert_eq!(harness.runs().len(), 2);
}

#[tokio::test]
async fn no_tests_waits_idle_delay_and_rediscovers() {
    let fs = calc_project("pub fn add(a: i32, b: i32) -> i32 { a + b }\n");
    let harness = FakeHarness::new();
    let (mut rt, _tx) = runtime(&fs, &["proj/src"], harness.clone(), RecordingSink::new(), fast_options());

    let first = rt.run_cycle().await;
    assert!(!first.executed);
    assert_eq!(first.next, NextStep::Sleep(fast_options().idle_delay));
    assert!(rt.core().is_idle());

    // Re-discovers without any file change.
    let second = rt.run_cycle().await;
    assert!(second.changed.is_empty());
    assert_eq!(second.next, NextStep::Sleep(fast_options().idle_delay));

    fs.add_file("proj/src/calc.rs", PASSING_CALC);
    let third = rt.run_cycle().await;
    assert!(third.executed);
    assert_eq!(harness.runs().len(), 1);
}

#[tokio::test]
async fn once_mode_exits_after_first_run() {
    let fs = calc_project(PASSING_CALC);
    let options = RuntimeOptions {
        once: true,
        ..fast_options()
    };
    let (rt, _tx) = runtime(&fs, &["proj/src"], FakeHarness::new(), RecordingSink::new(), options);
    with_timeout(rt.run()).await.unwrap();
}

#[tokio::test]
async fn interrupt_while_sleeping_stops_the_loop() {
    let fs = calc_project("pub fn add(a: i32, b: i32) -> i32 { a + b }\n");
    let (rt, tx) = runtime(&fs, &["proj/src"], FakeHarness::new(), RecordingSink::new(), fast_options());

    // Nothing to execute, so the interrupt is only seen during the sleep.
    tx.send(ControlEvent::Interrupt).await.unwrap();
    with_timeout(rt.run()).await.unwrap();
}

#[tokio::test]
async fn integration_test_file_is_watched_as_its_own_crate() {
    let fs = calc_project(PASSING_CALC);
    fs.add_file(
        "proj/tests/smoke.rs",
        "#[test]\nfn boots() -> Result<(), String> {\n    Err(\"no config\".into())\n}\n",
    );
    let harness = FakeHarness::new();
    harness
        .push(Scripted::Outcomes(vec![errored("boots", "Error: \"no config\"")]))
        .push(Scripted::Outcomes(vec![passed("boots")]));
    let sink = RecordingSink::new();
    let (mut rt, _tx) = runtime(
        &fs,
        &["proj/tests/smoke.rs"],
        harness.clone(),
        sink.clone(),
        fast_options(),
    );

    let first = rt.run_cycle().await;
    assert!(first.executed);
    assert_eq!(harness.runs(), vec![vec!["boots".to_string()]]);
    assert!(rt
        .core()
        .last_report()
        .get(StatusCategory::Error, &"boots".into())
        .is_some());

    fs.add_file(
        "proj/tests/smoke.rs",
        "#[test]\nfn boots() -> Result<(), String> {\n    Ok(())\n}\n",
    );
    let second = rt.run_cycle().await;
    assert_eq!(second.transitions.len(), 1);
    assert_eq!(second.transitions[0].direction, Direction::Fixed);
    assert_eq!(second.transitions[0].category, StatusCategory::Error);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Fixed error");
    assert_eq!(events[0].body, "boots (crate)");
}
