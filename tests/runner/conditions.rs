use skein::evaluator::Value;
use skein::runner::RunnerState;

use crate::support::{displayed_texts, runner_with, HostEvent, ScriptedEvaluator};

// ---------------------------------------------------------------------------
// Branch selection
// ---------------------------------------------------------------------------

#[test]
fn a_guard_is_evaluated_once_per_visit() {
    let evaluator = ScriptedEvaluator::with_variable("flag", Value::Bool(true));
    let mut runner = runner_with(
        "title: t\n---\n<<if $flag>>\none\ntwo\n<<endif>>\n===\n",
        evaluator,
    );

    runner.start_dialogue("t", 0).expect("start");
    assert_eq!(displayed_texts(&runner), vec!["one"]);
    assert_eq!(runner.evaluator().guard_evaluations, 1);

    runner.advance().expect("advance");
    assert_eq!(displayed_texts(&runner), vec!["one", "two"]);
    // Draining the branch never re-evaluates the guard.
    assert_eq!(runner.evaluator().guard_evaluations, 1);

    runner.advance().expect("advance");
    assert_eq!(runner.state(), RunnerState::Idle);
    assert_eq!(runner.evaluator().guard_evaluations, 1);
}

#[test]
fn elseif_chain_picks_the_first_true_guard() {
    let mut evaluator = ScriptedEvaluator::with_variable("a", Value::Bool(false));
    evaluator.set("b", Value::Bool(true));
    let mut runner = runner_with(
        "title: t\n---\n<<if $a>>\nA line\n<<elseif $b>>\nB line\n<<else>>\nC line\n<<endif>>\n===\n",
        evaluator,
    );

    runner.start_dialogue("t", 0).expect("start");
    assert_eq!(displayed_texts(&runner), vec!["B line"]);
}

#[test]
fn else_branch_runs_when_every_guard_fails() {
    let mut evaluator = ScriptedEvaluator::with_variable("a", Value::Bool(false));
    evaluator.set("b", Value::Bool(false));
    let mut runner = runner_with(
        "title: t\n---\n<<if $a>>\nA line\n<<elseif $b>>\nB line\n<<else>>\nfallback\n<<endif>>\n===\n",
        evaluator,
    );

    runner.start_dialogue("t", 0).expect("start");
    assert_eq!(displayed_texts(&runner), vec!["fallback"]);
}

// ---------------------------------------------------------------------------
// Guard failure tolerance
// ---------------------------------------------------------------------------

#[test]
fn non_boolean_guard_counts_as_false() {
    let evaluator = ScriptedEvaluator::with_variable("flag", Value::Number(1.0));
    let mut runner = runner_with(
        "title: t\n---\n<<if $flag>>\nhidden\n<<endif>>\n===\n",
        evaluator,
    );

    runner.start_dialogue("t", 0).expect("start");
    assert_eq!(runner.state(), RunnerState::Idle);
    assert!(displayed_texts(&runner).is_empty());
    assert_eq!(
        runner.handler().events.last(),
        Some(&HostEvent::DialogueCompleted)
    );
}

#[test]
fn guard_evaluation_error_skips_the_branch() {
    // `$flag` is unbound; traversal continues past the condition.
    let mut runner = runner_with(
        "title: t\n---\n<<if $flag>>\nhidden\n<<endif>>\nvisible\n===\n",
        ScriptedEvaluator::default(),
    );

    runner.start_dialogue("t", 0).expect("start");
    assert_eq!(displayed_texts(&runner), vec!["visible"]);
}

// ---------------------------------------------------------------------------
// Interaction with commands
// ---------------------------------------------------------------------------

#[test]
fn commands_inside_a_branch_run_silently() {
    let evaluator = ScriptedEvaluator::with_variable("flag", Value::Bool(true));
    let mut runner = runner_with(
        "title: t\n---\n<<if $flag>>\n<<set $gold to 5>>\ndone\n<<endif>>\n===\n",
        evaluator,
    );

    runner.start_dialogue("t", 0).expect("start");
    assert_eq!(displayed_texts(&runner), vec!["done"]);
    assert_eq!(
        runner.evaluator().variables.get("gold"),
        Some(&Value::Number(5.0))
    );
}
