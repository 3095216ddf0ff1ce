//! Recursive-descent parser with structural error recovery.
//!
//! One pass over a pre-lexed token list, no backtracking across statement
//! boundaries. Recoverable mistakes are repaired and reported as
//! [`ParseDiagnostic`] values; structural failures abort the current node
//! only, and the parser resynchronizes at the next node boundary.

use tracing::{error, warn};

use crate::lexer::{Keyword, OperatorKind, Position, Severity, Token, TokenKind};
use crate::parser::ast::{
    CallCommand, Choice, Command, CommandKind, Condition, ConditionBranch, Content, ContentArena,
    ContentId, Dialogue, Metadata, NodeDefinition, Script, VarCommand, VarOp,
};
use crate::parser::error::{ParseDiagnostic, ParseDiagnosticCode};
use crate::parser::expr::{BinaryOp, Expr, ExprKind, TextSegment, UnaryOp};
use crate::parser::recovery::{
    scan_for_delimiter, scan_for_node_boundary, SyncOutcome, MAX_SYNC_DISTANCE,
};

/// Parsed script plus the diagnostics accumulated while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    /// Compiled script; nodes that could not be recovered are absent.
    pub script: Script,
    /// Recovery diagnostics in source order.
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Signals that the current node cannot be recovered.
struct NodeAbort;

/// Content-list context, controlling which tokens end the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockContext {
    /// Top level of a node body; ends at `===`.
    NodeBody,
    /// Indented block under a dialogue, choice, or branch; ends at dedent.
    Nested,
    /// Unindented condition-branch body; additionally ends at
    /// `<<elseif>>`/`<<else>>`/`<<endif>>`.
    ConditionBranch,
}

/// Single-pass parser over one token sequence.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    diagnostics: Vec<ParseDiagnostic>,
    arena: ContentArena,
    node_tag_prefix: String,
    line_counter: u32,
}

impl Parser {
    /// Creates a parser over `tokens`.
    ///
    /// The list must be non-empty; [`crate::lexer::tokenize`] always emits at
    /// least an `Eof` token, so an empty list is a caller contract violation.
    pub fn new(tokens: Vec<Token>) -> Self {
        assert!(!tokens.is_empty(), "token list must not be empty");
        Self {
            tokens,
            index: 0,
            diagnostics: Vec::new(),
            arena: ContentArena::default(),
            node_tag_prefix: String::new(),
            line_counter: 0,
        }
    }

    /// Parses the whole token sequence into a script.
    pub fn parse(mut self) -> ParseOutput {
        let mut nodes = Vec::new();
        self.skip_script_trivia();
        while !self.at(TokenKind::Eof) {
            let checkpoint = self.arena.len();
            match self.parse_node() {
                Ok(Some(node)) => nodes.push(node),
                Ok(None) => self.arena.truncate(checkpoint),
                Err(NodeAbort) => {
                    self.arena.truncate(checkpoint);
                    self.index = scan_for_node_boundary(&self.tokens, self.index);
                }
            }
            self.skip_script_trivia();
        }
        ParseOutput {
            script: Script {
                nodes,
                contents: self.arena,
            },
            diagnostics: self.diagnostics,
        }
    }

    // -- Node level --

    fn parse_node(&mut self) -> Result<Option<NodeDefinition>, NodeAbort> {
        let position = self.peek().position;
        if self.consume(TokenKind::NodeStart) {
            self.consume(TokenKind::Newline);
        }

        let metadata = self.parse_metadata();

        if !self.consume(TokenKind::NodeStart) {
            let token = self.peek().clone();
            self.report(ParseDiagnostic::error(
                ParseDiagnosticCode::UnexpectedToken,
                format!("expected `---` to open the node body, found `{}`", token.text),
                token.position,
            ));
            return Err(NodeAbort);
        }
        self.consume(TokenKind::Newline);

        let title = metadata
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case("title"))
            .map(|entry| entry.value.clone())
            .filter(|value| !value.is_empty());
        let Some(name) = title else {
            self.report(ParseDiagnostic::error(
                ParseDiagnosticCode::MissingTitle,
                "node has no `title` metadatum; dropping node",
                position,
            ));
            self.node_tag_prefix.clear();
            self.line_counter = 0;
            let _ = self.parse_content_block(BlockContext::NodeBody)?;
            self.expect_node_end()?;
            return Ok(None);
        };

        self.node_tag_prefix = name.to_lowercase();
        self.line_counter = 0;

        let contents = self.parse_content_block(BlockContext::NodeBody)?;
        self.expect_node_end()?;

        Ok(Some(NodeDefinition {
            name,
            metadata,
            contents,
            position,
        }))
    }

    fn parse_metadata(&mut self) -> Vec<Metadata> {
        let mut metadata = Vec::new();
        while self.at(TokenKind::Text) && self.peek_at(1).kind == TokenKind::Colon {
            let key_token = self.advance().clone();
            self.advance();

            let mut value = String::new();
            while !matches!(self.peek().kind, TokenKind::Newline | TokenKind::Eof) {
                value.push_str(&self.advance().text);
            }
            self.consume(TokenKind::Newline);

            metadata.push(Metadata {
                key: key_token.text.trim().to_string(),
                value: value.trim().to_string(),
                position: key_token.position,
            });
        }
        metadata
    }

    fn expect_node_end(&mut self) -> Result<(), NodeAbort> {
        if self.consume(TokenKind::NodeEnd) {
            self.consume(TokenKind::Newline);
            return Ok(());
        }
        self.report(ParseDiagnostic::error(
            ParseDiagnosticCode::MissingNodeEnd,
            "node body ended without `===`; dropping node",
            self.peek().position,
        ));
        Err(NodeAbort)
    }

    // -- Content level --

    fn parse_content_block(&mut self, context: BlockContext) -> Result<Vec<ContentId>, NodeAbort> {
        let mut items = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Eof | TokenKind::NodeEnd | TokenKind::NodeStart | TokenKind::Dedent => {
                    break
                }
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Indent => {
                    // Indentation with no owning line above it; fold the
                    // block into the current list rather than losing it.
                    let token = self.peek().clone();
                    self.report(ParseDiagnostic::unexpected_token(&token, "a statement"));
                    self.advance();
                    let nested = self.parse_content_block(BlockContext::Nested)?;
                    items.extend(nested);
                    self.consume(TokenKind::Dedent);
                }
                TokenKind::Arrow => {
                    if let Some(id) = self.parse_choice()? {
                        items.push(id);
                    }
                }
                TokenKind::CommandStart => {
                    let marker = self.peek_at(1).kind;
                    if context == BlockContext::ConditionBranch
                        && matches!(
                            marker,
                            TokenKind::Keyword(Keyword::ElseIf)
                                | TokenKind::Keyword(Keyword::Else)
                                | TokenKind::Keyword(Keyword::EndIf)
                        )
                    {
                        break;
                    }
                    if marker == TokenKind::Keyword(Keyword::If) {
                        if let Some(id) = self.parse_condition()? {
                            items.push(id);
                        }
                    } else if let Some(id) = self.parse_command()? {
                        items.push(id);
                    }
                }
                TokenKind::Text | TokenKind::Colon | TokenKind::LeftBrace | TokenKind::Hash => {
                    if let Some(id) = self.parse_dialogue()? {
                        items.push(id);
                    }
                }
                _ => {
                    let token = self.peek().clone();
                    self.report(ParseDiagnostic::unexpected_token(&token, "a statement"));
                    self.skip_to_line_end();
                }
            }
        }
        Ok(items)
    }

    fn parse_dialogue(&mut self) -> Result<Option<ContentId>, NodeAbort> {
        let position = self.peek().position;

        let mut speaker = None;
        if self.at(TokenKind::Text) && self.peek_at(1).kind == TokenKind::Colon {
            let name = self.advance().text.trim().to_string();
            self.advance();
            speaker = Some(name);
        } else if self.at(TokenKind::Colon) {
            let token = self.peek().clone();
            self.report(ParseDiagnostic::unexpected_token(&token, "dialogue text"));
            self.advance();
        }

        let segments = self.parse_text_segments();
        let mut tags = self.parse_tags();
        // Line numbers follow authored order, so the tag is synthesized
        // before any nested children are parsed; a filtered line leaves a
        // hole in the numbering rather than renumbering its successors.
        tags.push(self.synthesize_line_tag());
        self.expect_newline_lenient();
        let children = self.parse_nested_children()?;

        if !has_visible_text(&segments) && children.is_empty() {
            return Ok(None);
        }

        let dialogue = Dialogue {
            speaker,
            segments: normalize_segments(segments),
            tags,
            children,
            position,
        };
        Ok(Some(self.arena.allocate(Content::Dialogue(dialogue))))
    }

    fn parse_choice(&mut self) -> Result<Option<ContentId>, NodeAbort> {
        let position = self.peek().position;
        self.advance();

        let mut segments = self.parse_text_segments();

        let mut guard = None;
        if self.consume(TokenKind::LeftBracket) {
            if !self.consume(TokenKind::Keyword(Keyword::If)) {
                let token = self.peek().clone();
                self.report(ParseDiagnostic::unexpected_token(
                    &token,
                    "`if` to open a choice guard",
                ));
            }
            guard = self.parse_expression();
            if !self.recover_delimiter(TokenKind::RightBracket, "]") {
                guard = None;
            }
            segments.extend(self.parse_text_segments());
        }

        let mut tags = self.parse_tags();
        tags.push(self.synthesize_line_tag());
        self.expect_newline_lenient();
        let children = self.parse_nested_children()?;

        if !has_visible_text(&segments) && children.is_empty() {
            return Ok(None);
        }

        let choice = Choice {
            segments: normalize_segments(segments),
            guard,
            tags,
            children,
            position,
        };
        Ok(Some(self.arena.allocate(Content::Choice(choice))))
    }

    fn parse_condition(&mut self) -> Result<Option<ContentId>, NodeAbort> {
        let position = self.peek().position;
        self.advance(); // `<<`
        self.advance(); // `if`

        let first_guard = self.parse_guard_expression(position);
        self.recover_delimiter(TokenKind::CommandEnd, ">>");
        self.expect_newline_lenient();

        let mut branches = Vec::new();
        let mut current_guard = Some(first_guard);
        let mut current_position = position;
        let terminated = loop {
            let children = self.parse_branch_children()?;
            branches.push(ConditionBranch {
                guard: current_guard.take(),
                children,
                position: current_position,
            });

            if !self.at_condition_marker() {
                break false;
            }
            let marker_position = self.peek().position;
            self.advance(); // `<<`
            let marker = self.peek().kind;
            self.advance();
            match marker {
                TokenKind::Keyword(Keyword::EndIf) => {
                    self.recover_delimiter(TokenKind::CommandEnd, ">>");
                    self.expect_newline_lenient();
                    break true;
                }
                TokenKind::Keyword(Keyword::ElseIf) => {
                    if branches.iter().any(|branch| branch.guard.is_none()) {
                        self.report(ParseDiagnostic::warning(
                            ParseDiagnosticCode::UnmatchedConditionMarker,
                            "`<<elseif>>` after `<<else>>`",
                            marker_position,
                        ));
                    }
                    let guard = self.parse_guard_expression(marker_position);
                    self.recover_delimiter(TokenKind::CommandEnd, ">>");
                    self.expect_newline_lenient();
                    current_guard = Some(guard);
                    current_position = marker_position;
                }
                TokenKind::Keyword(Keyword::Else) => {
                    if branches.iter().any(|branch| branch.guard.is_none()) {
                        self.report(ParseDiagnostic::warning(
                            ParseDiagnosticCode::UnmatchedConditionMarker,
                            "duplicate `<<else>>`",
                            marker_position,
                        ));
                    }
                    self.recover_delimiter(TokenKind::CommandEnd, ">>");
                    self.expect_newline_lenient();
                    current_guard = None;
                    current_position = marker_position;
                }
                _ => break false,
            }
        };

        if !terminated {
            self.report(ParseDiagnostic::warning(
                ParseDiagnosticCode::UnterminatedCondition,
                "condition reached the end of the node without `<<endif>>`",
                position,
            ));
        }

        if branches.iter().all(|branch| branch.children.is_empty()) {
            return Ok(None);
        }
        let condition = Condition { branches, position };
        Ok(Some(self.arena.allocate(Content::Condition(condition))))
    }

    fn parse_branch_children(&mut self) -> Result<Vec<ContentId>, NodeAbort> {
        if self.consume(TokenKind::Indent) {
            let children = self.parse_content_block(BlockContext::Nested)?;
            self.consume(TokenKind::Dedent);
            Ok(children)
        } else {
            self.parse_content_block(BlockContext::ConditionBranch)
        }
    }

    fn at_condition_marker(&self) -> bool {
        self.at(TokenKind::CommandStart)
            && matches!(
                self.peek_at(1).kind,
                TokenKind::Keyword(Keyword::ElseIf)
                    | TokenKind::Keyword(Keyword::Else)
                    | TokenKind::Keyword(Keyword::EndIf)
            )
    }

    /// Parses a condition guard, substituting `false` when the expression is
    /// malformed so traversal still has a branch decision to make.
    fn parse_guard_expression(&mut self, position: Position) -> Expr {
        self.parse_expression()
            .unwrap_or_else(|| Expr::new(ExprKind::Boolean(false), position))
    }

    fn parse_command(&mut self) -> Result<Option<ContentId>, NodeAbort> {
        let position = self.peek().position;
        self.advance(); // `<<`

        let kind = match self.peek().kind {
            TokenKind::Keyword(Keyword::Set) => {
                self.advance();
                self.parse_var_command(false)
            }
            TokenKind::Keyword(Keyword::Declare) => {
                self.advance();
                self.parse_var_command(true)
            }
            TokenKind::Keyword(Keyword::Jump) => {
                self.advance();
                self.parse_jump_command()
            }
            TokenKind::Keyword(Keyword::Wait) => {
                self.advance();
                self.parse_expression()
                    .map(|duration| CommandKind::Wait { duration })
            }
            TokenKind::Keyword(Keyword::Call) => {
                self.advance();
                self.parse_call_command()
            }
            TokenKind::Identifier => self.parse_bare_command(),
            TokenKind::Keyword(Keyword::ElseIf)
            | TokenKind::Keyword(Keyword::Else)
            | TokenKind::Keyword(Keyword::EndIf) => {
                let token = self.peek().clone();
                self.report(ParseDiagnostic::error(
                    ParseDiagnosticCode::UnmatchedConditionMarker,
                    format!("`<<{}>>` outside a condition block; dropping node", token.text),
                    token.position,
                ));
                return Err(NodeAbort);
            }
            _ => {
                let token = self.peek().clone();
                self.report(ParseDiagnostic::unexpected_token(&token, "a command name"));
                None
            }
        };

        self.recover_delimiter(TokenKind::CommandEnd, ">>");
        self.expect_newline_lenient();

        Ok(kind.map(|kind| {
            self.arena
                .allocate(Content::Command(Command { kind, position }))
        }))
    }

    fn parse_var_command(&mut self, declare: bool) -> Option<CommandKind> {
        if !self.at(TokenKind::Variable) {
            let token = self.peek().clone();
            self.report(ParseDiagnostic::unexpected_token(&token, "a variable"));
            return None;
        }
        let name = self.advance().variable_name();

        let op = if declare {
            // `declare` accepts either `=` or `to` before its initial value.
            if !self.consume(TokenKind::Keyword(Keyword::To))
                && !self.consume(TokenKind::Operator(OperatorKind::Assign))
            {
                let token = self.peek().clone();
                self.report(ParseDiagnostic::unexpected_token(&token, "`=` or `to`"));
            }
            VarOp::Declare
        } else {
            match self.peek().kind {
                TokenKind::Keyword(Keyword::To) | TokenKind::Operator(OperatorKind::Assign) => {
                    self.advance();
                    VarOp::Set
                }
                TokenKind::Operator(OperatorKind::AddAssign) => {
                    self.advance();
                    VarOp::Add
                }
                TokenKind::Operator(OperatorKind::SubAssign) => {
                    self.advance();
                    VarOp::Sub
                }
                TokenKind::Operator(OperatorKind::MulAssign) => {
                    self.advance();
                    VarOp::Mul
                }
                TokenKind::Operator(OperatorKind::DivAssign) => {
                    self.advance();
                    VarOp::Div
                }
                TokenKind::Operator(OperatorKind::ModAssign) => {
                    self.advance();
                    VarOp::Mod
                }
                _ => {
                    let token = self.peek().clone();
                    self.report(ParseDiagnostic::unexpected_token(
                        &token,
                        "an assignment operator or `to`",
                    ));
                    return None;
                }
            }
        };

        let value = self.parse_expression()?;
        Some(CommandKind::Var(VarCommand { op, name, value }))
    }

    fn parse_jump_command(&mut self) -> Option<CommandKind> {
        match self.peek().kind {
            TokenKind::Identifier | TokenKind::Text | TokenKind::Keyword(_) => {
                let target = self.advance().text.clone();
                Some(CommandKind::Jump { target })
            }
            _ => {
                let token = self.peek().clone();
                self.report(ParseDiagnostic::unexpected_token(&token, "a node name"));
                None
            }
        }
    }

    fn parse_call_command(&mut self) -> Option<CommandKind> {
        if !self.at(TokenKind::Identifier) {
            let token = self.peek().clone();
            self.report(ParseDiagnostic::unexpected_token(&token, "a function name"));
            return None;
        }
        let function = self.advance().text.clone();

        let mut arguments = Vec::new();
        if self.consume(TokenKind::LeftParen) {
            arguments = self.parse_arguments();
            self.recover_delimiter(TokenKind::RightParen, ")");
        }
        Some(CommandKind::Call(CallCommand {
            function,
            arguments,
        }))
    }

    /// Parses a host command without the `call` keyword: `<<shake 2 "hard">>`.
    fn parse_bare_command(&mut self) -> Option<CommandKind> {
        let function = self.advance().text.clone();
        let mut arguments = Vec::new();
        loop {
            if matches!(
                self.peek().kind,
                TokenKind::CommandEnd
                    | TokenKind::Newline
                    | TokenKind::Eof
                    | TokenKind::NodeEnd
                    | TokenKind::Dedent
            ) {
                break;
            }
            let before = self.index;
            match self.parse_expression() {
                Some(expr) => arguments.push(expr),
                None => {
                    if self.index == before {
                        self.advance();
                    }
                }
            }
        }
        Some(CommandKind::Call(CallCommand {
            function,
            arguments,
        }))
    }

    // -- Text, tags, nesting --

    fn parse_text_segments(&mut self) -> Vec<TextSegment> {
        let mut segments = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Text => {
                    let text = self.advance().text.clone();
                    segments.push(TextSegment::Text(text));
                }
                TokenKind::LeftBrace => {
                    self.advance();
                    let expr = self.parse_expression();
                    if !self.consume(TokenKind::RightBrace) {
                        self.report(ParseDiagnostic::warning(
                            ParseDiagnosticCode::MissingClosingDelimiter,
                            "interpolation is missing `}`",
                            self.peek().position,
                        ));
                    }
                    if let Some(expr) = expr {
                        segments.push(TextSegment::Interpolation(expr));
                    }
                }
                _ => break,
            }
        }
        segments
    }

    fn parse_tags(&mut self) -> Vec<String> {
        let mut tags = Vec::new();
        while self.consume(TokenKind::Hash) {
            if self.at(TokenKind::Text) {
                tags.push(self.advance().text.clone());
            }
        }
        tags
    }

    fn parse_nested_children(&mut self) -> Result<Vec<ContentId>, NodeAbort> {
        if !self.consume(TokenKind::Indent) {
            return Ok(Vec::new());
        }
        let children = self.parse_content_block(BlockContext::Nested)?;
        self.consume(TokenKind::Dedent);
        Ok(children)
    }

    fn synthesize_line_tag(&mut self) -> String {
        let tag = format!("line:{}{}", self.node_tag_prefix, self.line_counter);
        self.line_counter += 1;
        tag
    }

    // -- Expressions --

    fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_binary(1)
    }

    /// Precedence climbing. The recursive call uses `precedence + 1`, so the
    /// enclosing loop, not the recursion, consumes further same-precedence
    /// operators and equal strengths associate left.
    fn parse_binary(&mut self, min_precedence: u8) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        while let Some(op) = BinaryOp::from_token(self.peek().kind) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            let position = left.position;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                position,
            );
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let position = self.peek().position;
        match self.peek().kind {
            TokenKind::Keyword(Keyword::Not) | TokenKind::Operator(OperatorKind::Not) => {
                self.advance();
                let operand = self.parse_unary()?;
                Some(Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(operand),
                    },
                    position,
                ))
            }
            TokenKind::Operator(OperatorKind::Minus) => {
                self.advance();
                let operand = self.parse_unary()?;
                Some(Expr::new(
                    ExprKind::Unary {
                        op: UnaryOp::Negate,
                        operand: Box::new(operand),
                    },
                    position,
                ))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let before = self.index;
            match self.peek().kind {
                TokenKind::LeftParen => {
                    self.advance();
                    let arguments = self.parse_arguments();
                    self.recover_delimiter(TokenKind::RightParen, ")");
                    let position = expr.position;
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            arguments,
                        },
                        position,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    if !matches!(
                        self.peek().kind,
                        TokenKind::Identifier | TokenKind::Keyword(_)
                    ) {
                        let token = self.peek().clone();
                        self.report(ParseDiagnostic::unexpected_token(&token, "a member name"));
                        break;
                    }
                    let property = self.advance().text.clone();
                    let position = expr.position;
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        position,
                    );
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let Some(index) = self.parse_expression() else {
                        // Unwind to the last complete expression.
                        self.recover_delimiter(TokenKind::RightBracket, "]");
                        break;
                    };
                    self.recover_delimiter(TokenKind::RightBracket, "]");
                    let position = expr.position;
                    expr = Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        position,
                    );
                }
                _ => break,
            }
            if self.index == before {
                // Stall guard against malformed input pinning the loop.
                self.report(ParseDiagnostic::error(
                    ParseDiagnosticCode::MalformedExpression,
                    "postfix expression made no progress",
                    self.peek().position,
                ));
                break;
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                match token.text.parse::<f64>() {
                    Ok(value) => Some(Expr::new(ExprKind::Number(value), token.position)),
                    Err(_) => {
                        self.report(ParseDiagnostic::error(
                            ParseDiagnosticCode::MalformedExpression,
                            format!("`{}` is not a valid number", token.text),
                            token.position,
                        ));
                        None
                    }
                }
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Some(Expr::new(ExprKind::Boolean(true), token.position))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Some(Expr::new(ExprKind::Boolean(false), token.position))
            }
            TokenKind::Variable => {
                self.advance();
                Some(Expr::new(
                    ExprKind::Variable(token.variable_name()),
                    token.position,
                ))
            }
            TokenKind::Identifier => {
                self.advance();
                Some(Expr::new(
                    ExprKind::Identifier(token.text),
                    token.position,
                ))
            }
            TokenKind::String => self.parse_string_interpolation(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.recover_delimiter(TokenKind::RightParen, ")");
                Some(inner)
            }
            _ => {
                self.report(ParseDiagnostic::warning(
                    ParseDiagnosticCode::MalformedExpression,
                    format!("expected an expression, found `{}`", describe(&token)),
                    token.position,
                ));
                None
            }
        }
    }

    /// Groups a `String ("{" expr "}" String)*` run into one string
    /// expression. The lexer flushes a `String` token on both sides of every
    /// interpolation, even when empty, so the alternation is well-delimited.
    fn parse_string_interpolation(&mut self) -> Option<Expr> {
        let position = self.peek().position;
        let mut segments = vec![TextSegment::Text(self.advance().text.clone())];
        while self.consume(TokenKind::LeftBrace) {
            if let Some(expr) = self.parse_expression() {
                segments.push(TextSegment::Interpolation(expr));
            }
            if !self.consume(TokenKind::RightBrace) {
                self.report(ParseDiagnostic::warning(
                    ParseDiagnosticCode::MissingClosingDelimiter,
                    "interpolation is missing `}`",
                    self.peek().position,
                ));
            }
            if self.at(TokenKind::String) {
                segments.push(TextSegment::Text(self.advance().text.clone()));
            } else {
                break;
            }
        }
        segments.retain(|segment| !matches!(segment, TextSegment::Text(text) if text.is_empty()));
        Some(Expr::new(ExprKind::String(segments), position))
    }

    fn parse_arguments(&mut self) -> Vec<Expr> {
        let mut arguments = Vec::new();
        if self.at(TokenKind::RightParen) {
            return arguments;
        }
        loop {
            match self.parse_expression() {
                Some(expr) => arguments.push(expr),
                None => break,
            }
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }
        arguments
    }

    // -- Recovery --

    /// Consumes `target` if present, otherwise runs the bounded
    /// synchronization scan. Returns `false` only when the scan gives up and
    /// the caller should unwind to its last complete construct.
    fn recover_delimiter(&mut self, target: TokenKind, label: &str) -> bool {
        if self.consume(target) {
            return true;
        }
        let position = self.peek().position;
        match scan_for_delimiter(&self.tokens, self.index, target) {
            SyncOutcome::Delimiter(found) => {
                self.report(ParseDiagnostic::warning(
                    ParseDiagnosticCode::MissingClosingDelimiter,
                    format!(
                        "skipped {} token(s) to reach `{label}`",
                        found - self.index
                    ),
                    position,
                ));
                self.index = found + 1;
                true
            }
            SyncOutcome::Boundary(found) => {
                self.report(ParseDiagnostic::warning(
                    ParseDiagnosticCode::MissingClosingDelimiter,
                    format!("`{label}` is missing; treating it as inserted"),
                    position,
                ));
                self.index = found;
                true
            }
            SyncOutcome::NotFound => {
                self.report(ParseDiagnostic::error(
                    ParseDiagnosticCode::MissingClosingDelimiter,
                    format!("`{label}` not found within {MAX_SYNC_DISTANCE} tokens"),
                    position,
                ));
                false
            }
        }
    }

    fn expect_newline_lenient(&mut self) {
        if self.consume(TokenKind::Newline) {
            return;
        }
        if matches!(
            self.peek().kind,
            TokenKind::Eof | TokenKind::Dedent | TokenKind::NodeEnd | TokenKind::NodeStart
        ) {
            return;
        }
        let token = self.peek().clone();
        self.report(ParseDiagnostic::unexpected_token(&token, "end of line"));
        self.skip_to_line_end();
    }

    fn skip_to_line_end(&mut self) {
        while !matches!(
            self.peek().kind,
            TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::Dedent
                | TokenKind::NodeEnd
                | TokenKind::NodeStart
        ) {
            self.advance();
        }
        self.consume(TokenKind::Newline);
    }

    fn skip_script_trivia(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline | TokenKind::Dedent) {
            self.advance();
        }
    }

    // -- Token access --

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.index.min(last)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)]
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        let index = self.index.min(self.tokens.len() - 1);
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        &self.tokens[index]
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn report(&mut self, diagnostic: ParseDiagnostic) {
        match diagnostic.severity {
            Severity::Warning => warn!(
                code = ?diagnostic.code,
                position = %diagnostic.position,
                "{}",
                diagnostic.message
            ),
            Severity::Error => error!(
                code = ?diagnostic.code,
                position = %diagnostic.position,
                "{}",
                diagnostic.message
            ),
        }
        self.diagnostics.push(diagnostic);
    }
}

fn has_visible_text(segments: &[TextSegment]) -> bool {
    segments.iter().any(|segment| match segment {
        TextSegment::Text(text) => !text.trim().is_empty(),
        TextSegment::Interpolation(_) => true,
    })
}

/// Trims the outer edges of a segment list so authored indentation and
/// trailing spaces never reach display text.
fn normalize_segments(mut segments: Vec<TextSegment>) -> Vec<TextSegment> {
    if let Some(TextSegment::Text(text)) = segments.first_mut() {
        *text = text.trim_start().to_string();
    }
    if let Some(TextSegment::Text(text)) = segments.last_mut() {
        *text = text.trim_end().to_string();
    }
    segments.retain(|segment| !matches!(segment, TextSegment::Text(text) if text.is_empty()));
    segments
}

fn describe(token: &Token) -> String {
    if token.text.is_empty() {
        format!("{:?}", token.kind)
    } else {
        token.text.clone()
    }
}
