use skein::compile;
use skein::parser::{
    Choice, CommandKind, Condition, Content, ContentId, Dialogue, ExprKind, Script, TextSegment,
    VarOp,
};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn parse_body(body: &str) -> Script {
    let source = format!("title: t\n---\n{body}===\n");
    let output = compile(&source);
    assert!(
        output.parse_diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        output.parse_diagnostics
    );
    output.script
}

fn dialogue(script: &Script, id: ContentId) -> &Dialogue {
    match script.content(id).expect("content resolves") {
        Content::Dialogue(dialogue) => dialogue,
        other => panic!("expected dialogue, got {other:?}"),
    }
}

fn choice(script: &Script, id: ContentId) -> &Choice {
    match script.content(id).expect("content resolves") {
        Content::Choice(choice) => choice,
        other => panic!("expected choice, got {other:?}"),
    }
}

fn condition(script: &Script, id: ContentId) -> &Condition {
    match script.content(id).expect("content resolves") {
        Content::Condition(condition) => condition,
        other => panic!("expected condition, got {other:?}"),
    }
}

fn text_of(segments: &[TextSegment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            TextSegment::Text(text) => text.as_str(),
            TextSegment::Interpolation(_) => "{…}",
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Dialogue lines
// ---------------------------------------------------------------------------

#[test]
fn dialogue_lines_carry_speaker_tags_and_line_numbers() {
    let script = parse_body("Alice: Hi there\nplain narration\n\nBob: Done #done\n");
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 3);

    let first = dialogue(&script, contents[0]);
    assert_eq!(first.speaker.as_deref(), Some("Alice"));
    assert_eq!(text_of(&first.segments), "Hi there");
    assert_eq!(first.tags, vec!["line:t0".to_string()]);

    let second = dialogue(&script, contents[1]);
    assert_eq!(second.speaker, None);
    assert_eq!(text_of(&second.segments), "plain narration");
    assert_eq!(second.tags, vec!["line:t1".to_string()]);

    let third = dialogue(&script, contents[2]);
    assert_eq!(third.speaker.as_deref(), Some("Bob"));
    assert_eq!(third.tags, vec!["done".to_string(), "line:t2".to_string()]);
}

#[test]
fn empty_line_is_filtered_but_keeps_its_number() {
    let script = parse_body("Alice:\nreal line\n");
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 1);

    // The filtered line consumed `line:t0`; numbering reflects authored order.
    let kept = dialogue(&script, contents[0]);
    assert_eq!(text_of(&kept.segments), "real line");
    assert_eq!(kept.tags, vec!["line:t1".to_string()]);
}

#[test]
fn indented_content_attaches_to_the_line_above() {
    let script = parse_body("parent line\n    child line\n    -> nested choice\nafter\n");
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 2);

    let parent = dialogue(&script, contents[0]);
    assert_eq!(parent.children.len(), 2);
    assert_eq!(parent.tags, vec!["line:t0".to_string()]);

    let child = dialogue(&script, parent.children[0]);
    assert_eq!(text_of(&child.segments), "child line");
    assert_eq!(child.tags, vec!["line:t1".to_string()]);

    let nested = choice(&script, parent.children[1]);
    assert_eq!(text_of(&nested.segments), "nested choice");
    assert_eq!(nested.tags, vec!["line:t2".to_string()]);

    let after = dialogue(&script, contents[1]);
    assert_eq!(after.tags, vec!["line:t3".to_string()]);
}

// ---------------------------------------------------------------------------
// Choices
// ---------------------------------------------------------------------------

#[test]
fn choice_guard_and_tags() {
    let script = parse_body("-> Stay [if $here]\n-> Leave #bye\n");
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 2);

    let stay = choice(&script, contents[0]);
    assert_eq!(text_of(&stay.segments), "Stay");
    let guard = stay.guard.as_ref().expect("guard");
    assert!(matches!(&guard.kind, ExprKind::Variable(name) if name == "here"));
    assert_eq!(stay.tags, vec!["line:t0".to_string()]);

    let leave = choice(&script, contents[1]);
    assert_eq!(leave.guard, None);
    assert_eq!(leave.tags, vec!["bye".to_string(), "line:t1".to_string()]);
}

#[test]
fn choice_children_come_from_the_indented_block() {
    let script = parse_body("-> Go\n    inside\nafter\n");
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 2);

    let go = choice(&script, contents[0]);
    assert_eq!(go.children.len(), 1);
    assert_eq!(text_of(&dialogue(&script, go.children[0]).segments), "inside");
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

#[test]
fn condition_with_three_branches() {
    let script =
        parse_body("<<if $a>>\nA line\n<<elseif $b>>\nB line\n<<else>>\nC line\n<<endif>>\n");
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 1);

    let block = condition(&script, contents[0]);
    assert_eq!(block.branches.len(), 3);

    assert!(matches!(
        block.branches[0].guard.as_ref().map(|g| &g.kind),
        Some(ExprKind::Variable(name)) if name == "a"
    ));
    assert!(matches!(
        block.branches[1].guard.as_ref().map(|g| &g.kind),
        Some(ExprKind::Variable(name)) if name == "b"
    ));
    assert_eq!(block.branches[2].guard, None);

    for branch in &block.branches {
        assert_eq!(branch.children.len(), 1);
    }
}

#[test]
fn indented_branch_bodies_parse_the_same_way() {
    let script = parse_body("<<if $a>>\n    A line\n<<endif>>\n");
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 1);

    let block = condition(&script, contents[0]);
    assert_eq!(block.branches.len(), 1);
    assert_eq!(block.branches[0].children.len(), 1);
}

#[test]
fn condition_with_no_surviving_branch_content_is_dropped() {
    let script = parse_body("<<if $a>>\n<<endif>>\nline\n");
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 1);
    assert!(matches!(
        script.content(contents[0]),
        Some(Content::Dialogue(_))
    ));
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[test]
fn every_command_form_parses() {
    let script = parse_body(
        "<<declare $gold = 10>>\n\
         <<set $gold += 5>>\n\
         <<jump other>>\n\
         <<wait 0.5>>\n\
         <<call shake(2, \"hard\")>>\n\
         <<flash $gold true>>\n",
    );
    let contents = &script.nodes[0].contents;
    assert_eq!(contents.len(), 6);

    let kinds: Vec<&CommandKind> = contents
        .iter()
        .map(|&id| match script.content(id).expect("content") {
            Content::Command(command) => &command.kind,
            other => panic!("expected command, got {other:?}"),
        })
        .collect();

    let CommandKind::Var(declare) = kinds[0] else {
        panic!("expected var command");
    };
    assert_eq!(declare.op, VarOp::Declare);
    assert_eq!(declare.name, "gold");
    assert!(matches!(declare.value.kind, ExprKind::Number(value) if value == 10.0));

    let CommandKind::Var(add) = kinds[1] else {
        panic!("expected var command");
    };
    assert_eq!(add.op, VarOp::Add);

    assert!(matches!(kinds[2], CommandKind::Jump { target } if target == "other"));

    let CommandKind::Wait { duration } = kinds[3] else {
        panic!("expected wait command");
    };
    assert!(matches!(duration.kind, ExprKind::Number(value) if value == 0.5));

    let CommandKind::Call(call) = kinds[4] else {
        panic!("expected call command");
    };
    assert_eq!(call.function, "shake");
    assert_eq!(call.arguments.len(), 2);
    assert!(matches!(call.arguments[0].kind, ExprKind::Number(value) if value == 2.0));
    assert!(matches!(
        &call.arguments[1].kind,
        ExprKind::String(segments)
            if segments == &[TextSegment::Text("hard".to_string())]
    ));

    let CommandKind::Call(bare) = kinds[5] else {
        panic!("expected bare command");
    };
    assert_eq!(bare.function, "flash");
    assert_eq!(bare.arguments.len(), 2);
    assert!(matches!(&bare.arguments[0].kind, ExprKind::Variable(name) if name == "gold"));
    assert!(matches!(bare.arguments[1].kind, ExprKind::Boolean(true)));
}

#[test]
fn set_accepts_to_and_equals() {
    let script = parse_body("<<set $a to 1>>\n<<set $b = 2>>\n");
    let contents = &script.nodes[0].contents;
    for &id in contents {
        let Content::Command(command) = script.content(id).expect("content") else {
            panic!("expected command");
        };
        let CommandKind::Var(var) = &command.kind else {
            panic!("expected var command");
        };
        assert_eq!(var.op, VarOp::Set);
    }
}
