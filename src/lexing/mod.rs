//! Tokenizes cflat source text.
//!
//! The state-machine engine itself (`lexer` submodule) is kept generic and
//! language-agnostic; this module supplies the table of states and
//! transitions specific to cflat's token grammar, plus the `Token` type the
//! parser consumes.
//!
//! Note that `Int`, `Float`, `String`, `Bool`, `Void`, `main` and `printf`
//! are *not* lexical keywords: they lex as ordinary `Identifier` tokens and
//! are only given special meaning later, by the checker, via symbol
//! comparison against the interned builtins.

pub mod lexer;

use crate::stream;
use lazy_static::lazy_static;
use lexer::{Dest, LexFailure, LexToken, Lexer, Match, Parse, State, States, Transition};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Identifier(String),
    IntLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    BoolLiteral(bool),

    If,
    Else,
    While,
    For,
    Return,
    Break,
    Continue,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    Ne,
    AndAnd,
    OrOr,
    Caret,
    Amp,
    Pipe,
    Tilde,
    Bang,
    Eq,

    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Key {
    Start,
    Identifier,
    Int,
    FloatDot,
    Float,
    StringBody,
    StringEscape,
    StringEnd,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Tilde,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    AfterLt,
    Lt,
    Le,
    AfterGt,
    Gt,
    Ge,
    AfterEq,
    Eq,
    EqEq,
    AfterBang,
    Bang,
    Ne,
    AfterAmp,
    Amp,
    AndAnd,
    AfterPipe,
    Pipe,
    OrOr,
}

fn is_ident_start(chr: &char) -> bool {
    chr.is_alphabetic() || *chr == '_'
}

fn is_ident_continue(chr: &char) -> bool {
    chr.is_alphanumeric() || *chr == '_'
}

fn is_digit(chr: &char) -> bool {
    chr.is_ascii_digit()
}

fn parse_identifier(lexeme: &str) -> Token {
    match lexeme {
        "if" => Token::If,
        "else" => Token::Else,
        "while" => Token::While,
        "for" => Token::For,
        "return" => Token::Return,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "true" => Token::BoolLiteral(true),
        "false" => Token::BoolLiteral(false),
        _ => Token::Identifier(lexeme.to_string()),
    }
}

fn parse_int(lexeme: &str) -> Token {
    Token::IntLiteral(lexeme.parse().expect("lexer only admits digit sequences into Int state"))
}

fn parse_float(lexeme: &str) -> Token {
    Token::FloatLiteral(lexeme.parse().expect("lexer only admits digit/dot sequences into Float state"))
}

fn parse_string(lexeme: &str) -> Token {
    // Lexeme includes both surrounding quotes; unescape the body.
    let body = &lexeme[1..lexeme.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(chr) = chars.next() {
        if chr == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        }
        else {
            out.push(chr);
        }
    }
    Token::StringLiteral(out)
}

/// No-transition terminal state that always yields `tok`.
fn terminal(tok: Token) -> State<'static, Key, Token> {
    State { parse: Parse::To(tok), transitions: vec![] }
}

fn build_states() -> States<'static, Key, Token> {
    let mut states = States::new();

    states.insert(Key::Start, State {
        parse: Parse::Invalid,
        transitions: vec![
            Transition { match_by: Match::ByFunction(&is_ident_start), to: Dest::To(Key::Identifier) },
            Transition { match_by: Match::ByFunction(&is_digit), to: Dest::To(Key::Int) },
            Transition { match_by: Match::ByChar('"'), to: Dest::To(Key::StringBody) },
            Transition { match_by: Match::ByChar('/'), to: Dest::To(Key::Slash) },
            Transition { match_by: Match::ByChar('<'), to: Dest::To(Key::AfterLt) },
            Transition { match_by: Match::ByChar('>'), to: Dest::To(Key::AfterGt) },
            Transition { match_by: Match::ByChar('='), to: Dest::To(Key::AfterEq) },
            Transition { match_by: Match::ByChar('!'), to: Dest::To(Key::AfterBang) },
            Transition { match_by: Match::ByChar('&'), to: Dest::To(Key::AfterAmp) },
            Transition { match_by: Match::ByChar('|'), to: Dest::To(Key::AfterPipe) },
            Transition { match_by: Match::ByChar('+'), to: Dest::To(Key::Plus) },
            Transition { match_by: Match::ByChar('-'), to: Dest::To(Key::Minus) },
            Transition { match_by: Match::ByChar('*'), to: Dest::To(Key::Star) },
            Transition { match_by: Match::ByChar('%'), to: Dest::To(Key::Percent) },
            Transition { match_by: Match::ByChar('^'), to: Dest::To(Key::Caret) },
            Transition { match_by: Match::ByChar('~'), to: Dest::To(Key::Tilde) },
            Transition { match_by: Match::ByChar('('), to: Dest::To(Key::LParen) },
            Transition { match_by: Match::ByChar(')'), to: Dest::To(Key::RParen) },
            Transition { match_by: Match::ByChar('{'), to: Dest::To(Key::LBrace) },
            Transition { match_by: Match::ByChar('}'), to: Dest::To(Key::RBrace) },
            Transition { match_by: Match::ByChar(','), to: Dest::To(Key::Comma) },
            Transition { match_by: Match::ByChar(';'), to: Dest::To(Key::Semicolon) },
        ],
    });

    states.insert(Key::Identifier, State {
        parse: Parse::ByFunction(&parse_identifier),
        transitions: vec![Transition { match_by: Match::ByFunction(&is_ident_continue), to: Dest::ToSelf }],
    });

    states.insert(Key::Int, State {
        parse: Parse::ByFunction(&parse_int),
        transitions: vec![
            Transition { match_by: Match::ByFunction(&is_digit), to: Dest::ToSelf },
            Transition { match_by: Match::ByChar('.'), to: Dest::To(Key::FloatDot) },
        ],
    });

    states.insert(Key::FloatDot, State {
        parse: Parse::Invalid, // a lone trailing dot with no digits is a lexical error
        transitions: vec![Transition { match_by: Match::ByFunction(&is_digit), to: Dest::To(Key::Float) }],
    });

    states.insert(Key::Float, State {
        parse: Parse::ByFunction(&parse_float),
        transitions: vec![Transition { match_by: Match::ByFunction(&is_digit), to: Dest::ToSelf }],
    });

    states.insert(Key::StringBody, State {
        parse: Parse::Invalid, // unterminated string
        transitions: vec![
            Transition { match_by: Match::ByChar('\\'), to: Dest::To(Key::StringEscape) },
            Transition { match_by: Match::ByChar('"'), to: Dest::To(Key::StringEnd) },
            Transition { match_by: Match::Any, to: Dest::ToSelf },
        ],
    });

    states.insert(Key::StringEscape, State {
        parse: Parse::Invalid,
        transitions: vec![Transition { match_by: Match::Any, to: Dest::To(Key::StringBody) }],
    });

    states.insert(Key::StringEnd, State { parse: Parse::ByFunction(&parse_string), transitions: vec![] });

    states.insert(Key::Slash, terminal(Token::Slash));

    states.insert(Key::Plus, terminal(Token::Plus));
    states.insert(Key::Minus, terminal(Token::Minus));
    states.insert(Key::Star, terminal(Token::Star));
    states.insert(Key::Percent, terminal(Token::Percent));
    states.insert(Key::Caret, terminal(Token::Caret));
    states.insert(Key::Tilde, terminal(Token::Tilde));
    states.insert(Key::LParen, terminal(Token::LParen));
    states.insert(Key::RParen, terminal(Token::RParen));
    states.insert(Key::LBrace, terminal(Token::LBrace));
    states.insert(Key::RBrace, terminal(Token::RBrace));
    states.insert(Key::Comma, terminal(Token::Comma));
    states.insert(Key::Semicolon, terminal(Token::Semicolon));

    states.insert(Key::AfterLt, State {
        parse: Parse::To(Token::Lt),
        transitions: vec![Transition { match_by: Match::ByChar('='), to: Dest::To(Key::Le) }],
    });
    states.insert(Key::Le, terminal(Token::Le));

    states.insert(Key::AfterGt, State {
        parse: Parse::To(Token::Gt),
        transitions: vec![Transition { match_by: Match::ByChar('='), to: Dest::To(Key::Ge) }],
    });
    states.insert(Key::Ge, terminal(Token::Ge));

    states.insert(Key::AfterEq, State {
        parse: Parse::To(Token::Eq),
        transitions: vec![Transition { match_by: Match::ByChar('='), to: Dest::To(Key::EqEq) }],
    });
    states.insert(Key::EqEq, terminal(Token::EqEq));

    states.insert(Key::AfterBang, State {
        parse: Parse::To(Token::Bang),
        transitions: vec![Transition { match_by: Match::ByChar('='), to: Dest::To(Key::Ne) }],
    });
    states.insert(Key::Ne, terminal(Token::Ne));

    states.insert(Key::AfterAmp, State {
        parse: Parse::To(Token::Amp),
        transitions: vec![Transition { match_by: Match::ByChar('&'), to: Dest::To(Key::AndAnd) }],
    });
    states.insert(Key::AndAnd, terminal(Token::AndAnd));

    states.insert(Key::AfterPipe, State {
        parse: Parse::To(Token::Pipe),
        transitions: vec![Transition { match_by: Match::ByChar('|'), to: Dest::To(Key::OrOr) }],
    });
    states.insert(Key::OrOr, terminal(Token::OrOr));

    states
}

lazy_static! {
    static ref LEXER: Lexer<'static, Key, Token> =
        Lexer::new(build_states(), Key::Start, vec![' ', '\t', '\r', '\n']);
}

/// Strip `//` line comments before the character-at-a-time state machine
/// ever sees them - the state machine models single tokens, not spans to
/// be discarded, so comments are removed up front rather than threaded
/// through every operator state. Comment markers inside string literals are
/// left alone.
fn strip_line_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut in_string = false;

    while let Some(chr) = chars.next() {
        if in_string {
            out.push(chr);
            if chr == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            else if chr == '"' {
                in_string = false;
            }
        }
        else if chr == '"' {
            in_string = true;
            out.push(chr);
        }
        else if chr == '/' && chars.peek() == Some(&'/') {
            for comment_chr in chars.by_ref() {
                if comment_chr == '\n' {
                    out.push('\n');
                    break;
                }
            }
        }
        else {
            out.push(chr);
        }
    }

    out
}

/// Tokenize a whole source string eagerly, collecting the lexer iterator
/// immediately so that lexing happens before any downstream pass begins.
pub fn lex(source: &str) -> Result<Vec<LexToken<Token>>, LexFailure> {
    LEXER.input(stream::Stream::from_string(strip_line_comments(source))).collect()
}
