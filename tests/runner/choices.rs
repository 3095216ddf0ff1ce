use skein::evaluator::Value;
use skein::runner::{RunnerError, RunnerState};

use crate::support::{displayed_texts, runner_for, runner_with, HostEvent, ScriptedEvaluator};

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

#[test]
fn a_run_of_choices_collects_into_one_set() {
    let mut runner = runner_for("title: t\n---\nPick one\n-> A\n-> B\n-> C\nafter\n===\n");
    runner.start_dialogue("t", 0).expect("start");
    runner.advance().expect("advance");

    assert_eq!(runner.state(), RunnerState::CollectingChoices);
    let sets: Vec<_> = runner
        .handler()
        .events
        .iter()
        .filter_map(|event| match event {
            HostEvent::ChoicesDisplayed(choices) => Some(choices.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(sets.len(), 1);

    let choices = &sets[0];
    assert_eq!(choices.len(), 3);
    let texts: Vec<&str> = choices.iter().map(|choice| choice.text.as_str()).collect();
    assert_eq!(texts, vec!["A", "B", "C"]);
    let indices: Vec<usize> = choices.iter().map(|choice| choice.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn advance_while_collecting_is_rejected() {
    let mut runner = runner_for("title: t\n---\n-> A\n-> B\n===\n");
    runner.start_dialogue("t", 0).expect("start");

    assert_eq!(runner.advance(), Err(RunnerError::AwaitingSelection));
    assert_eq!(runner.state(), RunnerState::CollectingChoices);
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[test]
fn out_of_range_selection_keeps_the_pending_set() {
    let mut runner = runner_for("title: t\n---\n-> A\n-> B\n-> C\nafter\n===\n");
    runner.start_dialogue("t", 0).expect("start");

    assert_eq!(
        runner.select_choice(7),
        Err(RunnerError::ChoiceOutOfRange {
            index: 7,
            available: 3,
        })
    );
    assert_eq!(runner.state(), RunnerState::CollectingChoices);

    // The set is still selectable afterwards.
    runner.select_choice(1).expect("select");
    let selected: Vec<_> = runner
        .handler()
        .events
        .iter()
        .filter_map(|event| match event {
            HostEvent::OptionSelected(choice) => Some(choice.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].index, 1);
    assert_eq!(selected[0].text, "B");
    assert_eq!(displayed_texts(&runner), vec!["after"]);
}

#[test]
fn selection_without_a_pending_set_is_rejected() {
    let mut runner = runner_for("title: t\n---\none\n===\n");
    assert_eq!(runner.select_choice(0), Err(RunnerError::NoPendingChoices));

    runner.start_dialogue("t", 0).expect("start");
    assert_eq!(runner.select_choice(0), Err(RunnerError::NoPendingChoices));
}

#[test]
fn selection_enters_the_choice_children() {
    let mut runner = runner_for("title: t\n---\n-> Go\n    inside\nafter\n===\n");
    runner.start_dialogue("t", 0).expect("start");

    runner.select_choice(0).expect("select");
    assert_eq!(displayed_texts(&runner), vec!["inside"]);

    runner.advance().expect("advance");
    assert_eq!(displayed_texts(&runner), vec!["inside", "after"]);

    runner.advance().expect("advance");
    assert_eq!(runner.state(), RunnerState::Idle);
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

#[test]
fn guards_evaluate_at_selection_not_collection() {
    let evaluator = ScriptedEvaluator::with_variable("open", Value::Bool(false));
    let mut runner = runner_with("title: t\n---\n-> Locked [if $open]\n-> Free\n===\n", evaluator);
    runner.start_dialogue("t", 0).expect("start");

    assert_eq!(runner.state(), RunnerState::CollectingChoices);
    assert_eq!(runner.evaluator().guard_evaluations, 0);

    assert_eq!(
        runner.select_choice(0),
        Err(RunnerError::ChoiceUnavailable(0))
    );
    assert_eq!(runner.evaluator().guard_evaluations, 1);
    assert_eq!(runner.state(), RunnerState::CollectingChoices);

    runner.select_choice(1).expect("select");
    assert_eq!(runner.state(), RunnerState::Idle);
    assert_eq!(
        runner.handler().events.last(),
        Some(&HostEvent::DialogueCompleted)
    );
}

#[test]
fn guard_evaluation_failure_rejects_the_selection() {
    // `$open` is unbound, so the guard errors rather than returning false.
    let mut runner = runner_for("title: t\n---\n-> Locked [if $open]\n-> Free\n===\n");
    runner.start_dialogue("t", 0).expect("start");

    assert_eq!(
        runner.select_choice(0),
        Err(RunnerError::ChoiceUnavailable(0))
    );
    assert_eq!(runner.state(), RunnerState::CollectingChoices);
}
