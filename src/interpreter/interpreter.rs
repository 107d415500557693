//! Script Interpreter
//!
//! Executes scripts by walking the token stream with a single cursor; no
//! tree is built. Every statement handler advances the shared cursor and
//! leaves it on the first token it did not consume.
//!
//! Blocks have no explicit children. A nested run of the statement loop is
//! given a stop set (`else`/`fi` for an `if` branch, `done` for a loop body)
//! and returns control to its construct when it reaches one of those
//! keywords.
//!
//! Plain command lines are assembled from tokens and handed to a
//! [`CommandExecutor`]; its output is the only output a script produces.

use std::future::Future;
use std::pin::Pin;

use crate::interpreter::conditionals::CompareOp;
use crate::interpreter::environment::Environment;
use crate::interpreter::errors::{Expected, InterpreterError};
use crate::interpreter::types::{CommandExecutor, ExecutionLimits};
use crate::parser::{tokenize, Token, TokenKind};

type StatementFuture<'s> = Pin<Box<dyn Future<Output = Result<String, InterpreterError>> + Send + 's>>;

const TOP_LEVEL: &[&str] = &[];
const THEN_BRANCH: &[&str] = &["else", "fi"];
const ELSE_BRANCH: &[&str] = &["fi"];
const LOOP_BODY: &[&str] = &["done"];

/// Check if a string is a valid variable name
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Token kinds that can make up one shell word when written without spaces
fn is_word_part(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Word | TokenKind::Variable | TokenKind::Operator | TokenKind::Keyword | TokenKind::Brace
    )
}

pub struct ScriptInterpreter<'a> {
    executor: &'a dyn CommandExecutor,
    environment: Environment,
    limits: ExecutionLimits,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> ScriptInterpreter<'a> {
    pub fn new(executor: &'a dyn CommandExecutor) -> Self {
        Self {
            executor,
            environment: Environment::new(),
            limits: ExecutionLimits::default(),
            tokens: Vec::new(),
            pos: 0,
        }
    }

    pub fn with_limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Lex and run a script, returning the concatenated output of every
    /// command that succeeded.
    pub async fn interpret(&mut self, script: &str) -> Result<String, InterpreterError> {
        self.run(tokenize(script)).await
    }

    /// Run an already lexed token sequence.
    pub async fn run(&mut self, tokens: Vec<Token>) -> Result<String, InterpreterError> {
        self.tokens = tokens;
        self.pos = 0;
        self.run_statements(TOP_LEVEL).await
    }

    // ------------------------------------------------------------------
    // Statement dispatch
    // ------------------------------------------------------------------

    fn run_statements<'s>(&'s mut self, stop: &'static [&'static str]) -> StatementFuture<'s> {
        Box::pin(async move {
            let mut output = String::new();

            while let Some(token) = self.tokens.get(self.pos).cloned() {
                match token.kind {
                    TokenKind::EndOfInput => break,
                    TokenKind::Newline | TokenKind::Semicolon | TokenKind::Comment => {
                        self.pos += 1;
                    }
                    TokenKind::Keyword if stop.contains(&token.text.as_str()) => break,
                    TokenKind::Keyword => {
                        tracing::debug!(keyword = %token.text, line = token.line, "statement");
                        match token.text.as_str() {
                            "if" => output.push_str(&self.execute_if().await?),
                            "for" => output.push_str(&self.execute_for().await?),
                            "while" => output.push_str(&self.execute_while().await?),
                            "function" => self.define_function()?,
                            "export" => self.execute_export()?,
                            "unset" => self.execute_unset()?,
                            _ => output.push_str(&self.execute_command(stop).await?),
                        }
                    }
                    TokenKind::Word if self.is_assignment_at(self.pos) => self.execute_assignment(),
                    _ => output.push_str(&self.execute_command(stop).await?),
                }
            }

            Ok(output)
        })
    }

    // ------------------------------------------------------------------
    // Cursor primitives
    // ------------------------------------------------------------------

    fn current_is_keyword(&self, keyword: &str) -> bool {
        self.tokens.get(self.pos).is_some_and(|t| t.is_keyword(keyword))
    }

    fn expect(&mut self, expected: Expected) -> Result<Token, InterpreterError> {
        let Some(token) = self.tokens.get(self.pos) else {
            return Err(InterpreterError::UnexpectedEndOfInput { expected });
        };

        let matches = token.kind == expected.kind
            && expected.value.as_deref().map_or(true, |value| token.text == value);
        if !matches {
            return Err(InterpreterError::unexpected(token, expected));
        }

        self.pos += 1;
        Ok(token.clone())
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<Token, InterpreterError> {
        self.expect(Expected::token(TokenKind::Keyword, keyword))
    }

    /// Move the cursor over a block without executing it, stopping on the
    /// first keyword from `stop` that is not inside a nested construct.
    fn skip_block(&mut self, stop: &[&str]) {
        let mut depth = 0usize;
        while let Some(token) = self.tokens.get(self.pos) {
            if token.kind == TokenKind::EndOfInput {
                return;
            }
            if token.is(TokenKind::Keyword, "function") {
                self.skip_function_body();
                continue;
            }
            if token.kind == TokenKind::Keyword {
                match token.text.as_str() {
                    "if" | "for" | "while" => depth += 1,
                    "fi" | "done" if depth > 0 => depth -= 1,
                    text if depth == 0 && stop.contains(&text) => return,
                    _ => {}
                }
            }
            self.pos += 1;
        }
    }

    /// Step past a `function ... end` definition. Block keywords inside the
    /// body belong to the stored function, not to the enclosing block.
    fn skip_function_body(&mut self) {
        self.pos += 1; // function
        while let Some(token) = self.tokens.get(self.pos) {
            if token.kind == TokenKind::EndOfInput {
                return;
            }
            self.pos += 1;
            if token.is(TokenKind::Word, "end") {
                return;
            }
        }
    }

    fn check_loop_limit(&self, iterations: u64) -> Result<(), InterpreterError> {
        match self.limits.max_loop_iterations {
            Some(limit) if iterations >= limit => Err(InterpreterError::LoopLimitExceeded { limit }),
            _ => Ok(()),
        }
    }

    /// Text a token contributes to a command line or value.
    fn expand(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Variable => self.environment.get(&token.text),
            _ => token.text.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Plain commands and assignments
    // ------------------------------------------------------------------

    async fn execute_command(&mut self, stop: &[&str]) -> Result<String, InterpreterError> {
        if let Some(first) = self.tokens.get(self.pos) {
            if first.kind == TokenKind::Word && self.environment.lookup_function(&first.text).is_some() {
                return Err(InterpreterError::UnsupportedFunctionCall {
                    name: first.text.clone(),
                    line: first.line,
                    column: first.column,
                });
            }
        }

        let mut line = String::new();
        let mut previous_end: Option<usize> = None;

        while let Some(token) = self.tokens.get(self.pos) {
            match token.kind {
                TokenKind::Newline | TokenKind::Semicolon => {
                    self.pos += 1;
                    break;
                }
                TokenKind::EndOfInput => break,
                TokenKind::Comment => {
                    self.pos += 1;
                    continue;
                }
                TokenKind::Keyword if stop.contains(&token.text.as_str()) => break,
                _ => {}
            }

            // Tokens written without whitespace between them stay one word
            if previous_end.is_some_and(|end| end != token.start) {
                line.push(' ');
            }
            line.push_str(&self.expand(token));
            previous_end = Some(token.end);
            self.pos += 1;
        }

        if previous_end.is_none() {
            return Ok(String::new());
        }

        tracing::debug!(command = %line, "delegating command");
        let result = self.executor.execute(&line).await;
        if result.succeeded {
            Ok(result.output)
        } else {
            tracing::warn!(
                command = %line,
                error = result.error_message.as_deref().unwrap_or(""),
                "command failed"
            );
            Ok(String::new())
        }
    }

    /// `NAME=VALUE` with no whitespace around `=`.
    fn is_assignment_at(&self, pos: usize) -> bool {
        match (self.tokens.get(pos), self.tokens.get(pos + 1)) {
            (Some(name), Some(eq)) => {
                name.kind == TokenKind::Word
                    && is_valid_identifier(&name.text)
                    && eq.is(TokenKind::Operator, "=")
                    && name.touches(eq)
            }
            _ => false,
        }
    }

    fn execute_assignment(&mut self) {
        let name = self.tokens[self.pos].text.clone();
        let mut previous_end = self.tokens[self.pos + 1].end;
        self.pos += 2;

        let mut value = String::new();
        while let Some(token) = self.tokens.get(self.pos) {
            if token.start != previous_end || !is_word_part(token.kind) {
                break;
            }
            value.push_str(&self.expand(token));
            previous_end = token.end;
            self.pos += 1;
        }

        tracing::debug!(name = %name, value = %value, "assign");
        self.environment.set(name, value);
    }

    // ------------------------------------------------------------------
    // Compound statements
    // ------------------------------------------------------------------

    async fn execute_if(&mut self) -> Result<String, InterpreterError> {
        self.pos += 1; // if
        let condition = self.evaluate_condition()?;
        self.expect_keyword("then")?;

        let mut output = String::new();
        if condition {
            output = self.run_statements(THEN_BRANCH).await?;
        } else {
            self.skip_block(THEN_BRANCH);
        }

        if self.current_is_keyword("else") {
            self.pos += 1;
            if condition {
                self.skip_block(ELSE_BRANCH);
            } else {
                output = self.run_statements(ELSE_BRANCH).await?;
            }
        }

        self.expect_keyword("fi")?;
        Ok(output)
    }

    async fn execute_for(&mut self) -> Result<String, InterpreterError> {
        self.pos += 1; // for
        let variable = self.expect(Expected::kind(TokenKind::Word))?;
        self.expect(Expected::token(TokenKind::Word, "in"))?;

        // Only words are items; anything else before `do` is dropped
        let mut items = Vec::new();
        while let Some(token) = self.tokens.get(self.pos) {
            if token.is_keyword("do") || token.kind == TokenKind::EndOfInput {
                break;
            }
            if token.kind == TokenKind::Word {
                items.push(token.text.clone());
            }
            self.pos += 1;
        }
        self.expect_keyword("do")?;

        let body_start = self.pos;
        let mut output = String::new();
        if items.is_empty() {
            self.skip_block(LOOP_BODY);
        }

        for (iteration, item) in items.into_iter().enumerate() {
            self.check_loop_limit(iteration as u64)?;
            self.environment.set(variable.text.clone(), item);
            self.pos = body_start;
            output.push_str(&self.run_statements(LOOP_BODY).await?);
        }

        self.expect_keyword("done")?;
        Ok(output)
    }

    /// The condition is re-read from its saved position on every pass.
    async fn execute_while(&mut self) -> Result<String, InterpreterError> {
        self.pos += 1; // while
        let condition_start = self.pos;
        let mut output = String::new();
        let mut iterations = 0u64;

        loop {
            self.pos = condition_start;
            let condition = self.evaluate_condition()?;
            self.expect_keyword("do")?;

            if !condition {
                self.skip_block(LOOP_BODY);
                break;
            }

            self.check_loop_limit(iterations)?;
            iterations += 1;
            output.push_str(&self.run_statements(LOOP_BODY).await?);
            self.expect_keyword("done")?;
        }

        self.expect_keyword("done")?;
        Ok(output)
    }

    /// `function NAME [(PARAMS)] BODY end`. The body is stored, never run.
    fn define_function(&mut self) -> Result<(), InterpreterError> {
        self.pos += 1; // function
        let name = self.expect(Expected::kind(TokenKind::Word))?;

        let mut parameters = Vec::new();
        if self.tokens.get(self.pos).is_some_and(|t| t.is(TokenKind::Brace, "(")) {
            self.pos += 1;
            while let Some(token) = self.tokens.get(self.pos) {
                if token.kind == TokenKind::EndOfInput {
                    break;
                }
                self.pos += 1;
                if token.is(TokenKind::Brace, ")") {
                    break;
                }
                if token.kind == TokenKind::Word {
                    parameters.push(token.text.clone());
                }
            }
        }

        // A missing `end` takes the rest of the script as the body
        let body_start = self.pos;
        while let Some(token) = self.tokens.get(self.pos) {
            if token.kind == TokenKind::EndOfInput || token.is(TokenKind::Word, "end") {
                break;
            }
            self.pos += 1;
        }
        let body = self.tokens[body_start..self.pos].to_vec();
        if self.tokens.get(self.pos).is_some_and(|t| t.is(TokenKind::Word, "end")) {
            self.pos += 1;
        }

        tracing::debug!(name = %name.text, params = parameters.len(), body = body.len(), "define function");
        self.environment.define_function(name.text, parameters, body);
        Ok(())
    }

    /// No process boundary exists, so exporting only makes sure the name is set.
    fn execute_export(&mut self) -> Result<(), InterpreterError> {
        self.pos += 1; // export
        if self.is_assignment_at(self.pos) {
            self.execute_assignment();
            return Ok(());
        }

        let name = self.expect(Expected::kind(TokenKind::Word))?;
        let value = self.environment.get(&name.text);
        self.environment.set(name.text, value);
        Ok(())
    }

    fn execute_unset(&mut self) -> Result<(), InterpreterError> {
        self.pos += 1; // unset
        let name = self.expect(Expected::kind(TokenKind::Word))?;
        self.environment.unset(&name.text);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Conditions
    // ------------------------------------------------------------------

    /// `LEFT OP RIGHT`: exactly three tokens, compared as strings.
    fn evaluate_condition(&mut self) -> Result<bool, InterpreterError> {
        let left = self.expect_operand()?;
        let operator = self.expect(Expected::kind(TokenKind::Operator))?;
        let right = self.expect_operand()?;

        let op = CompareOp::from_str(&operator.text).ok_or_else(|| InterpreterError::InvalidOperator {
            operator: operator.text.clone(),
            line: operator.line,
            column: operator.column,
        })?;

        Ok(op.apply(&self.resolve_operand(&left), &self.resolve_operand(&right)))
    }

    fn expect_operand(&mut self) -> Result<Token, InterpreterError> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == TokenKind::Variable => {
                self.pos += 1;
                Ok(token.clone())
            }
            _ => self.expect(Expected::kind(TokenKind::Word)),
        }
    }

    /// A word names a variable if one is set under that name, otherwise it
    /// stands for itself.
    fn resolve_operand(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Variable => self.environment.get(&token.text),
            _ => self
                .environment
                .lookup(&token.text)
                .unwrap_or(&token.text)
                .to_string(),
        }
    }
}
