//! Command Line Parsing
//!
//! Splits one command line into a command name, arguments and redirections.
//! Quoting follows the shell: single quotes are literal, double quotes allow
//! `\"` and `\\`, and a backslash outside quotes escapes the next character.
//! Redirection operators are recognised anywhere outside quotes, so `a>b`
//! and `a > b` mean the same thing.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandLineError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("syntax error: missing target after '{0}'")]
    MissingRedirectTarget(String),

    #[error("syntax error: redirection without a command")]
    MissingCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `< FILE`
    Input,
    /// `> FILE`
    Output,
    /// `>> FILE`
    Append,
    /// `2> FILE`
    ErrorOutput,
    /// `2>> FILE`
    ErrorAppend,
}

impl RedirectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectKind::Input => "<",
            RedirectKind::Output => ">",
            RedirectKind::Append => ">>",
            RedirectKind::ErrorOutput => "2>",
            RedirectKind::ErrorAppend => "2>>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Lower-cased command name
    pub name: String,
    pub args: Vec<String>,
    pub redirects: Vec<Redirect>,
}

enum Piece {
    Word(String),
    Redirect(RedirectKind),
}

impl CommandLine {
    /// Parse a command line. A blank line parses to `None`.
    pub fn parse(input: &str) -> Result<Option<CommandLine>, CommandLineError> {
        let pieces = split_pieces(input)?;

        let mut words = Vec::new();
        let mut redirects = Vec::new();
        let mut iter = pieces.into_iter();

        while let Some(piece) = iter.next() {
            match piece {
                Piece::Word(word) => words.push(word),
                Piece::Redirect(kind) => match iter.next() {
                    Some(Piece::Word(target)) => redirects.push(Redirect { kind, target }),
                    _ => return Err(CommandLineError::MissingRedirectTarget(kind.as_str().to_string())),
                },
            }
        }

        if words.is_empty() {
            return if redirects.is_empty() {
                Ok(None)
            } else {
                Err(CommandLineError::MissingCommand)
            };
        }

        let name = words.remove(0).to_lowercase();
        Ok(Some(CommandLine {
            name,
            args: words,
            redirects,
        }))
    }
}

fn split_pieces(input: &str) -> Result<Vec<Piece>, CommandLineError> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    // Set once a word has started, so `''` still yields an empty word
    let mut in_word = false;
    let mut quoted = false;
    let mut chars = input.chars().peekable();

    fn flush(pieces: &mut Vec<Piece>, current: &mut String, in_word: &mut bool, quoted: &mut bool) {
        if *in_word {
            pieces.push(Piece::Word(std::mem::take(current)));
        }
        *in_word = false;
        *quoted = false;
    }

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => flush(&mut pieces, &mut current, &mut in_word, &mut quoted),
            '\'' => {
                in_word = true;
                quoted = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(CommandLineError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                quoted = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.peek() {
                            Some(&next) if next == '"' || next == '\\' => {
                                current.push(next);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(CommandLineError::UnterminatedQuote('"')),
                    }
                }
            }
            '\\' => {
                in_word = true;
                quoted = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '<' => {
                flush(&mut pieces, &mut current, &mut in_word, &mut quoted);
                pieces.push(Piece::Redirect(RedirectKind::Input));
            }
            '>' => {
                let append = chars.peek() == Some(&'>');
                if append {
                    chars.next();
                }
                // A bare `2` right before `>` selects stderr
                let stderr = in_word && !quoted && current == "2";
                if stderr {
                    current.clear();
                    in_word = false;
                }
                flush(&mut pieces, &mut current, &mut in_word, &mut quoted);
                let kind = match (stderr, append) {
                    (false, false) => RedirectKind::Output,
                    (false, true) => RedirectKind::Append,
                    (true, false) => RedirectKind::ErrorOutput,
                    (true, true) => RedirectKind::ErrorAppend,
                };
                pieces.push(Piece::Redirect(kind));
            }
            _ => {
                in_word = true;
                current.push(c);
            }
        }
    }
    flush(&mut pieces, &mut current, &mut in_word, &mut quoted);

    Ok(pieces)
}
