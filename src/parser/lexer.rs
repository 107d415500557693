//! Lexer for toysh Scripts
//!
//! The lexer turns script text into a flat stream of tokens that the
//! interpreter walks directly. It handles:
//! - Words and reserved words
//! - `$name` and `${name}` variable references
//! - Operators (greedy longest match against a closed set)
//! - Braces, separators and comments
//!
//! Lexing never fails: anything that matches no other shape becomes a Word.

use std::collections::HashSet;
use std::fmt;

/// Token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Word,
    Variable,
    Operator,
    Keyword,
    Brace,
    Semicolon,
    Newline,
    Comment,
    EndOfInput,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "WORD",
            Self::Variable => "VARIABLE",
            Self::Operator => "OPERATOR",
            Self::Keyword => "KEYWORD",
            Self::Brace => "BRACE",
            Self::Semicolon => "SEMICOLON",
            Self::Newline => "NEWLINE",
            Self::Comment => "COMMENT",
            Self::EndOfInput => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal text. For variables this is the bare name, without `$` or braces.
    pub text: String,
    /// Character offsets in the input
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        start: usize,
        end: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
            end,
            line,
            column,
        }
    }

    /// True if the token has the given kind and text.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.is(TokenKind::Keyword, text)
    }

    /// True if `next` starts exactly where this token ends in the source.
    pub fn touches(&self, next: &Token) -> bool {
        self.end == next.start
    }
}

/// Renders the token the way it would be written in a script.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Variable if !self.text.is_empty() && self.text.chars().all(is_name_char) => {
                write!(f, "${}", self.text)
            }
            TokenKind::Variable => write!(f, "${{{}}}", self.text),
            TokenKind::EndOfInput => Ok(()),
            _ => f.write_str(&self.text),
        }
    }
}

lazy_static::lazy_static! {
    /// Reserved words. Only some of them have statement handlers.
    static ref KEYWORDS: HashSet<&'static str> = [
        "if", "then", "else", "fi",
        "for", "while", "until", "do", "done",
        "case", "esac",
        "function", "return",
        "break", "continue",
        "export", "unset", "read",
        "let", "declare",
    ]
    .into_iter()
    .collect();

    static ref OPERATORS: HashSet<&'static str> = [
        "&&", "||", "|", ">", ">>", "<", "2>", "2>>",
        "=", "+=", "-=", "*=", "/=", "%=",
        "==", "!=", "<=", ">=",
        "+", "-", "*", "/", "%",
    ]
    .into_iter()
    .collect();
}

/// Check if a word is a reserved word
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

/// Check if a string is one of the recognised operators
pub fn is_operator(op: &str) -> bool {
    OPERATORS.contains(op)
}

fn is_operator_start(c: char) -> bool {
    matches!(c, '&' | '|' | '>' | '<' | '=' | '+' | '-' | '*' | '/' | '%')
}

fn is_brace(c: char) -> bool {
    matches!(c, '{' | '}' | '(' | ')')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whitespace other than newline, which is a token of its own
fn is_blank(c: char) -> bool {
    c.is_whitespace() && c != '\n'
}

/// Check if a character ends a word token
fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || is_operator_start(c) || is_brace(c) || c == ';' || c == '#'
}

/// Tokenize script text.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire input. The result always ends with one EndOfInput token.
    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(c) = self.current() {
            if is_blank(c) {
                self.advance();
                continue;
            }

            match c {
                '#' => self.read_comment(),
                '$' => self.read_variable(),
                c if is_operator_start(c) => self.read_operator(),
                '!' if self.peek(1) == Some('=') => self.read_operator(),
                c if is_brace(c) => self.read_single(TokenKind::Brace),
                ';' => self.read_single(TokenKind::Semicolon),
                '\n' => {
                    self.read_single(TokenKind::Newline);
                    self.line += 1;
                    self.column = 1;
                }
                _ => self.read_word(false),
            }
        }

        self.tokens.push(Token::new(
            TokenKind::EndOfInput,
            "",
            self.pos,
            self.pos,
            self.line,
            self.column,
        ));
        self.tokens
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
            self.column += 1;
        }
    }

    fn push(&mut self, kind: TokenKind, text: String, start: usize, line: usize, column: usize) {
        self.tokens.push(Token::new(kind, text, start, self.pos, line, column));
    }

    fn read_single(&mut self, kind: TokenKind) {
        let (start, line, column) = (self.pos, self.line, self.column);
        let text = self.input[self.pos].to_string();
        self.advance();
        self.push(kind, text, start, line, column);
    }

    /// Comment runs to end of line; the newline itself is left for the next token.
    fn read_comment(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        let mut text = String::new();
        while let Some(c) = self.current() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        self.push(TokenKind::Comment, text, start, line, column);
    }

    fn read_variable(&mut self) {
        let (start, line, column) = (self.pos, self.line, self.column);
        self.advance(); // $
        let mut name = String::new();

        if self.current() == Some('{') {
            self.advance();
            while let Some(c) = self.current() {
                if c == '}' {
                    break;
                }
                name.push(c);
                self.advance();
                if c == '\n' {
                    self.line += 1;
                    self.column = 1;
                }
            }
            // Unterminated ${ reads to end of input
            if self.current() == Some('}') {
                self.advance();
            }
        } else {
            while let Some(c) = self.current() {
                if !is_name_char(c) {
                    break;
                }
                name.push(c);
                self.advance();
            }
        }

        self.push(TokenKind::Variable, name, start, line, column);
    }

    /// Greedy longest match: take every operator character, then back off
    /// until the candidate is a known operator.
    fn read_operator(&mut self) {
        let mut run: String = self.input[self.pos..=self.pos].iter().collect();
        run.extend(
            self.input[self.pos + 1..]
                .iter()
                .take_while(|c| is_operator_start(**c)),
        );

        let mut candidate = run.as_str();
        while !candidate.is_empty() && !is_operator(candidate) {
            let mut chars = candidate.chars();
            chars.next_back();
            candidate = chars.as_str();
        }

        if candidate.is_empty() {
            self.read_word(true);
            return;
        }

        let (start, line, column) = (self.pos, self.line, self.column);
        let text = candidate.to_string();
        for _ in 0..text.chars().count() {
            self.advance();
        }
        self.push(TokenKind::Operator, text, start, line, column);
    }

    /// Read a word. `take_first` consumes the current character even if it
    /// would normally end a word, so operator fallback always makes progress.
    fn read_word(&mut self, take_first: bool) {
        let (start, line, column) = (self.pos, self.line, self.column);
        let mut word = String::new();

        if take_first {
            if let Some(c) = self.current() {
                word.push(c);
                self.advance();
            }
        }

        while let Some(c) = self.current() {
            if is_word_boundary(c) {
                break;
            }
            word.push(c);
            self.advance();
        }

        let kind = if is_keyword(&word) {
            TokenKind::Keyword
        } else {
            TokenKind::Word
        };
        self.push(kind, word, start, line, column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn pair(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn test_commands_split_by_semicolon() {
        assert_eq!(
            kinds_and_text("echo hi; echo bye"),
            vec![
                pair(TokenKind::Word, "echo"),
                pair(TokenKind::Word, "hi"),
                pair(TokenKind::Semicolon, ";"),
                pair(TokenKind::Word, "echo"),
                pair(TokenKind::Word, "bye"),
                pair(TokenKind::EndOfInput, ""),
            ]
        );
    }

    #[test]
    fn test_variable_comparison() {
        assert_eq!(
            kinds_and_text("$x == 1"),
            vec![
                pair(TokenKind::Variable, "x"),
                pair(TokenKind::Operator, "=="),
                pair(TokenKind::Word, "1"),
                pair(TokenKind::EndOfInput, ""),
            ]
        );
    }

    #[test]
    fn test_empty_input_is_just_eof() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::EndOfInput);
        assert_eq!(tokens[0].text, "");
    }

    #[test]
    fn test_reserved_words() {
        let tokens = tokenize("if then else fi for while do done function export unset");
        assert!(tokens[..11].iter().all(|t| t.kind == TokenKind::Keyword));
    }

    #[test]
    fn test_in_and_end_are_words() {
        let tokens = tokenize("in end If");
        assert_eq!(tokens[0].kind, TokenKind::Word);
        assert_eq!(tokens[1].kind, TokenKind::Word);
        // Case-sensitive
        assert_eq!(tokens[2].kind, TokenKind::Word);
    }

    #[test]
    fn test_comment_leaves_newline() {
        assert_eq!(
            kinds_and_text("# note\necho"),
            vec![
                pair(TokenKind::Comment, "# note"),
                pair(TokenKind::Newline, "\n"),
                pair(TokenKind::Word, "echo"),
                pair(TokenKind::EndOfInput, ""),
            ]
        );
    }

    #[test]
    fn test_comment_ends_word() {
        let tokens = tokenize("echo#tail");
        assert_eq!(tokens[0].text, "echo");
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[1].text, "#tail");
    }

    #[test]
    fn test_braced_variable() {
        let tokens = tokenize("${name}x");
        assert_eq!(tokens[0].kind, TokenKind::Variable);
        assert_eq!(tokens[0].text, "name");
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].text, "x");
    }

    #[test]
    fn test_unterminated_braced_variable_reads_to_end() {
        let tokens = tokenize("${abc def");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Variable);
        assert_eq!(tokens[0].text, "abc def");
    }

    #[test]
    fn test_bare_variable_stops_at_non_name_char() {
        let tokens = tokenize("$dir.txt");
        assert_eq!(tokens[0].text, "dir");
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].text, ".txt");
    }

    #[test]
    fn test_operator_longest_match() {
        let tokens = tokenize("a >> b >= c != d");
        assert_eq!(tokens[1].text, ">>");
        assert_eq!(tokens[3].text, ">=");
        assert_eq!(tokens[5].text, "!=");
        assert_eq!(tokens[5].kind, TokenKind::Operator);
    }

    #[test]
    fn test_operator_backs_off() {
        // "=>" is not an operator: "=" then ">"
        let tokens = tokenize("=>");
        assert_eq!(tokens[0].text, "=");
        assert_eq!(tokens[0].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, ">");
        assert_eq!(tokens[1].kind, TokenKind::Operator);
    }

    #[test]
    fn test_bang_alone_is_word() {
        let tokens = tokenize("echo hi!");
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].text, "hi!");
    }

    #[test]
    fn test_lone_ampersand_falls_back_to_word() {
        let tokens = tokenize("a & b");
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].text, "&");
        assert_eq!(tokens[2].text, "b");
    }

    #[test]
    fn test_digit_redirect_is_word_then_operator() {
        let tokens = tokenize("cmd 2> err");
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].text, "2");
        assert_eq!(tokens[2].kind, TokenKind::Operator);
        assert_eq!(tokens[2].text, ">");
    }

    #[test]
    fn test_braces() {
        let tokens = tokenize("f(a b)");
        assert_eq!(tokens[1].kind, TokenKind::Brace);
        assert_eq!(tokens[1].text, "(");
        assert_eq!(tokens[4].kind, TokenKind::Brace);
        assert_eq!(tokens[4].text, ")");
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = tokenize("echo a\n  ls");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 6));
        assert_eq!(tokens[2].kind, TokenKind::Newline);
        assert_eq!((tokens[3].line, tokens[3].column), (2, 3));
    }

    #[test]
    fn test_newline_inside_braced_variable_counts_lines() {
        let tokens = tokenize("${a\nb}\nz");
        assert_eq!(tokens[0].kind, TokenKind::Variable);
        assert_eq!(tokens[0].text, "a\nb");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[1].line, 2);
        assert_eq!((tokens[2].line, tokens[2].column), (3, 1));

        let unterminated = tokenize("${x\n\n");
        assert_eq!(unterminated.last().map(|t| t.line), Some(3));
    }

    #[test]
    fn test_adjacent_tokens_touch() {
        let tokens = tokenize("ls -l /tmp");
        assert!(!tokens[0].touches(&tokens[1]));
        assert!(tokens[1].touches(&tokens[2]));
        assert!(!tokens[2].touches(&tokens[3]));
        assert!(tokens[3].touches(&tokens[4]));
    }

    #[test]
    fn test_relexing_rendered_tokens_keeps_kinds() {
        let script = "for i in a b do echo $i ; done\nif ${x} == 1 then ls >> out fi";
        let first = tokenize(script);
        let rendered: Vec<String> = first.iter().map(|t| t.to_string()).collect();
        let second = tokenize(&rendered.join(" "));

        let kinds = |tokens: &[Token]| tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
        assert_eq!(kinds(&first), kinds(&second));
    }

    #[test]
    fn test_display_variable_forms() {
        let tokens = tokenize("$a ${b c}");
        assert_eq!(tokens[0].to_string(), "$a");
        assert_eq!(tokens[1].to_string(), "${b c}");
    }
}
