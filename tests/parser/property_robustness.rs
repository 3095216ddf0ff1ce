use proptest::prelude::*;
use skein::compile;

const MAX_INPUT_BYTES: usize = 512;

proptest! {
    /// Compilation is total over arbitrary input, and every content id a
    /// surviving node holds resolves in the arena.
    #[test]
    fn compile_is_total_and_ids_resolve(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_BYTES)
    ) {
        let source = String::from_utf8_lossy(&bytes);
        let output = compile(&source);
        for node in &output.script.nodes {
            for &id in &node.contents {
                prop_assert!(output.script.content(id).is_some());
            }
        }
    }

    /// Node-shaped fragments in random order never panic the parser, and
    /// every parsed node keeps a non-empty name.
    #[test]
    fn shuffled_fragments_compile(
        fragments in proptest::collection::vec(
            prop_oneof![
                Just("title: a\n".to_string()),
                Just("---\n".to_string()),
                Just("===\n".to_string()),
                Just("Alice: hi\n".to_string()),
                Just("-> choice [if $x\n".to_string()),
                Just("<<if $a>>\n".to_string()),
                Just("<<endif>>\n".to_string()),
                Just("<<set $x to\n".to_string()),
                Just("    nested\n".to_string()),
            ],
            0..24
        )
    ) {
        let source: String = fragments.concat();
        let output = compile(&source);
        for node in &output.script.nodes {
            prop_assert!(!node.name.is_empty());
        }
    }
}
