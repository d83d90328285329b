//! Shell command highlighter
//!
//! A single-pass lexer that splits a command line into categorized tokens.
//! Tokens cover the input exactly: concatenating their text gives back the
//! original command.

use serde::{Deserialize, Serialize};

/// Token category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Command,
    Keyword,
    Flag,
    String,
    Variable,
    Operator,
    Comment,
    Number,
    Path,
    Default,
}

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// Shell keywords and builtins
const KEYWORDS: &[&str] = &[
    "if", "then", "else", "elif", "fi", "case", "esac", "for", "while", "until", "do", "done",
    "in", "function", "select", "time", "coproc", "return", "break", "continue", "export",
    "local", "readonly", "declare", "typeset", "alias", "unalias", "set", "unset", "shift",
    "source", "exec", "eval", "test", "cd", "echo", "printf", "read", "exit", "true", "false",
];

const OPERATORS: &str = "|&;<>()[]{}!*";
const WORD_BREAK: &str = "|&;<>()[]{}\"'`$#";
const FLAG_BREAK: &str = "|&;<>()[]{}\"'`$";

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_path(word: &str) -> bool {
    ["/", "./", "../", "~/"]
        .iter()
        .any(|prefix| word.starts_with(prefix))
}

fn is_number(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}

/// Tokenize a command line
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advance while `pred` holds
    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn emit(&mut self, kind: TokenKind, start: usize) {
        let token = Token::new(kind, &self.input[start..self.pos]);
        self.tokens.push(token);
    }

    fn tokenize(mut self) -> Vec<Token> {
        let mut first_word = true;

        while let Some(c) = self.peek() {
            let start = self.pos;

            if c.is_whitespace() {
                self.bump();
                self.emit(TokenKind::Default, start);
            } else if c == '#' {
                self.pos = self.input.len();
                self.emit(TokenKind::Comment, start);
            } else if matches!(c, '"' | '\'' | '`') {
                self.string(c);
                first_word = false;
            } else if c == '$' {
                self.variable();
                first_word = false;
            } else if OPERATORS.contains(c) {
                self.operator();
                if matches!(c, '|' | '&' | ';') {
                    first_word = true;
                }
            } else if c == '-' && self.peek_second().is_some_and(|n| !n.is_whitespace()) {
                self.flag();
                first_word = false;
            } else if c.is_alphanumeric() || matches!(c, '.' | '/' | '_' | '~') {
                self.bump_while(|c| !c.is_whitespace() && !WORD_BREAK.contains(c));
                let word = &self.input[start..self.pos];
                let kind = if is_keyword(word) {
                    TokenKind::Keyword
                } else if first_word {
                    TokenKind::Command
                } else if is_path(word) {
                    TokenKind::Path
                } else if is_number(word) {
                    TokenKind::Number
                } else {
                    TokenKind::Default
                };
                first_word = false;
                self.emit(kind, start);
            } else {
                self.bump();
                self.emit(TokenKind::Default, start);
            }
        }

        self.tokens
    }

    /// Quoted string up to the matching unescaped quote, or end of input
    fn string(&mut self, quote: char) {
        let start = self.pos;
        self.bump();

        while let Some(c) = self.bump() {
            if c == quote {
                break;
            }
            if c == '\\' {
                self.bump();
            }
        }

        self.emit(TokenKind::String, start);
    }

    /// `$NAME` or `${...}`
    fn variable(&mut self) {
        let start = self.pos;
        self.bump();

        if self.peek() == Some('{') {
            self.bump();
            self.bump_while(|c| c != '}');
            self.bump();
        } else {
            self.bump_while(|c| c.is_alphanumeric() || c == '_');
        }

        self.emit(TokenKind::Variable, start);
    }

    fn operator(&mut self) {
        let start = self.pos;
        let first = self.bump();
        let pair = (first, self.peek());

        if matches!(
            pair,
            (Some('|'), Some('|'))
                | (Some('&'), Some('&'))
                | (Some('>'), Some('>'))
                | (Some('<'), Some('<'))
                | (Some('>'), Some('&'))
                | (Some('<'), Some('&'))
        ) {
            self.bump();
        }

        self.emit(TokenKind::Operator, start);
    }

    fn flag(&mut self) {
        let start = self.pos;
        self.bump();
        if self.peek() == Some('-') {
            self.bump();
        }
        self.bump_while(|c| !c.is_whitespace() && !FLAG_BREAK.contains(c));

        self.emit(TokenKind::Flag, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(input: &str) -> Vec<(TokenKind, String)> {
        tokenize(input)
            .into_iter()
            .filter(|t| !t.text.trim().is_empty())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn test_simple_command() {
        assert_eq!(
            kinds("ls -la /tmp 42"),
            vec![
                tok(TokenKind::Command, "ls"),
                tok(TokenKind::Flag, "-la"),
                tok(TokenKind::Path, "/tmp"),
                tok(TokenKind::Number, "42"),
            ]
        );
    }

    #[test]
    fn test_whitespace_is_one_token_per_char() {
        let tokens = tokenize("a  b");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1], Token::new(TokenKind::Default, " "));
        assert_eq!(tokens[2], Token::new(TokenKind::Default, " "));
    }

    #[test]
    fn test_pipeline_resets_command_position() {
        assert_eq!(
            kinds("cat file.txt | grep --color=auto foo && echo done"),
            vec![
                tok(TokenKind::Command, "cat"),
                tok(TokenKind::Default, "file.txt"),
                tok(TokenKind::Operator, "|"),
                tok(TokenKind::Command, "grep"),
                tok(TokenKind::Flag, "--color=auto"),
                tok(TokenKind::Default, "foo"),
                tok(TokenKind::Operator, "&&"),
                tok(TokenKind::Keyword, "echo"),
                tok(TokenKind::Keyword, "done"),
            ]
        );
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#"echo "a \" b" 'c' `d`"#),
            vec![
                tok(TokenKind::Keyword, "echo"),
                tok(TokenKind::String, r#""a \" b""#),
                tok(TokenKind::String, "'c'"),
                tok(TokenKind::String, "`d`"),
            ]
        );
        assert_eq!(kinds("\"open"), vec![tok(TokenKind::String, "\"open")]);
    }

    #[test]
    fn test_variables() {
        assert_eq!(
            kinds("echo $HOME ${PATH}x ${open"),
            vec![
                tok(TokenKind::Keyword, "echo"),
                tok(TokenKind::Variable, "$HOME"),
                tok(TokenKind::Variable, "${PATH}"),
                tok(TokenKind::Default, "x"),
                tok(TokenKind::Variable, "${open"),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("a>>b 2>&1"),
            vec![
                tok(TokenKind::Command, "a"),
                tok(TokenKind::Operator, ">>"),
                tok(TokenKind::Default, "b"),
                tok(TokenKind::Number, "2"),
                tok(TokenKind::Operator, ">&"),
                tok(TokenKind::Number, "1"),
            ]
        );
    }

    #[test]
    fn test_comment_runs_to_end() {
        assert_eq!(
            kinds("make # build it | all"),
            vec![
                tok(TokenKind::Command, "make"),
                tok(TokenKind::Comment, "# build it | all"),
            ]
        );
    }

    #[test]
    fn test_lone_dash_is_not_a_flag() {
        assert_eq!(
            kinds("cat - x"),
            vec![
                tok(TokenKind::Command, "cat"),
                tok(TokenKind::Default, "-"),
                tok(TokenKind::Default, "x"),
            ]
        );
    }

    #[test]
    fn test_keyword_in_command_position() {
        assert_eq!(kinds("if true; then")[0], tok(TokenKind::Keyword, "if"));
        assert_eq!(kinds("./run.sh")[0], tok(TokenKind::Command, "./run.sh"));
    }

    proptest! {
        #[test]
        fn prop_tokens_reproduce_input(input in "\\PC{0,64}") {
            let joined: String = tokenize(&input).into_iter().map(|t| t.text).collect();
            prop_assert_eq!(joined, input);
        }

        #[test]
        fn prop_tokens_are_never_empty(input in "[ -~]{0,64}") {
            prop_assert!(tokenize(&input).iter().all(|t| !t.text.is_empty()));
        }
    }
}
