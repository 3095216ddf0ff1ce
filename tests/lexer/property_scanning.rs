use proptest::prelude::*;
use skein::lexer::{tokenize, TokenKind};

const MAX_INPUT_BYTES: usize = 512;

proptest! {
    /// The scan is total: any byte soup produces a token list terminated by
    /// exactly one Eof.
    #[test]
    fn scan_terminates_with_exactly_one_eof(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_BYTES)
    ) {
        let source = String::from_utf8_lossy(&bytes);
        let output = tokenize(&source);
        let eof_count = output
            .tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Eof)
            .count();
        prop_assert_eq!(eof_count, 1);
        prop_assert_eq!(
            output.tokens.last().map(|token| token.kind),
            Some(TokenKind::Eof)
        );
    }

    /// Indent and Dedent stay balanced no matter how the input mangles its
    /// indentation.
    #[test]
    fn indent_and_dedent_tokens_balance(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_BYTES)
    ) {
        let source = String::from_utf8_lossy(&bytes);
        let output = tokenize(&source);
        let mut depth: i64 = 0;
        for token in &output.tokens {
            match token.kind {
                TokenKind::Indent => depth += 1,
                TokenKind::Dedent => {
                    depth -= 1;
                    prop_assert!(depth >= 0, "dedent with no matching indent");
                }
                _ => {}
            }
        }
        prop_assert_eq!(depth, 0);
    }

    /// Structured-looking fragments never panic the scanner either.
    #[test]
    fn marker_heavy_input_is_handled(
        fragments in proptest::collection::vec(
            prop_oneof![
                Just("---\n".to_string()),
                Just("===\n".to_string()),
                Just("-> option\n".to_string()),
                Just("<<set $x to 1\n".to_string()),
                Just("line {$x\n".to_string()),
                Just("    indented\n".to_string()),
                Just("\"open\n".to_string()),
            ],
            0..16
        )
    ) {
        let source: String = fragments.concat();
        let output = tokenize(&source);
        prop_assert_eq!(
            output.tokens.last().map(|token| token.kind),
            Some(TokenKind::Eof)
        );
    }
}
