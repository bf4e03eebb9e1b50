use nom::{
    bytes::complete::{tag, take_till, take_while, take_while1},
    combinator::recognize,
    sequence::pair,
    IResult,
};

use crate::error::Position;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Token {
    /// First word on a line.
    Command,
    /// Any later word on the same line.
    Arg,
    /// A character that cannot start a word or a comment.
    Illegal,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Lexeme<'a> {
    pub token: Token,
    pub value: &'a str,
    pub pos: Position,
}

pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.$:-".contains(c)
}

fn blank(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c == ' ' || c == '\t' || c == '\r')(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), take_till(|c: char| c == '\n')))(input)
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(is_word_char)(input)
}

/// Pull-based scanner over VM source text.
///
/// Scanning is deterministic: two lexers over the same text yield the same
/// lexemes at the same positions.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    rest: &'a str,
    pos: Position,
    line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            rest: source,
            pos: Position { line: 1, column: 1 },
            line_start: true,
        }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    fn consume(&mut self, remaining: &'a str, taken: &str) {
        self.rest = remaining;
        self.pos.column += taken.chars().count();
    }

    pub fn next_token(&mut self) -> Option<Lexeme<'a>> {
        loop {
            if let Ok((remaining, taken)) = blank(self.rest) {
                self.consume(remaining, taken);
            }

            if let Some(remaining) = self.rest.strip_prefix('\n') {
                self.rest = remaining;
                self.pos.line += 1;
                self.pos.column = 1;
                self.line_start = true;
                continue;
            }

            if let Ok((remaining, taken)) = comment(self.rest) {
                self.consume(remaining, taken);
                continue;
            }

            let start = self.pos;
            if let Ok((remaining, value)) = word(self.rest) {
                self.consume(remaining, value);
                let token = if self.line_start { Token::Command } else { Token::Arg };
                self.line_start = false;
                return Some(Lexeme { token, value, pos: start });
            }

            let c = self.rest.chars().next()?;
            let (value, remaining) = self.rest.split_at(c.len_utf8());
            self.consume(remaining, value);
            self.line_start = false;
            log::debug!("illegal character {:?} at {}", c, start);
            return Some(Lexeme { token: Token::Illegal, value, pos: start });
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}
