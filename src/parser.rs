use nom::{
    bytes::complete::take_while,
    character::complete::{alpha1, digit1, satisfy},
    combinator::{all_consuming, map_opt, map_res, recognize},
    sequence::pair,
    IResult,
};

use crate::ast::{Command, Segment};
use crate::error::{ParseError, ParseErrorKind, Position};
use crate::lexer::{Lexeme, Lexer, Token};
use crate::tables::ARITHMETIC_MNEMONICS;

fn integer(input: &str) -> IResult<&str, u16> {
    map_res(digit1, |c: &str| c.parse())(input)
}

#[test]
fn test_integer() {
    assert_eq!(integer("32"), Ok(("", 32)));
    assert!(integer("70000").is_err());
    assert!(integer("-1").is_err());
}

fn segment(input: &str) -> IResult<&str, Segment> {
    map_opt(alpha1, Segment::from_name)(input)
}

#[test]
fn test_segment() {
    assert_eq!(segment("pointer"), Ok(("", Segment::Pointer)));
    assert!(segment("heap").is_err());
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.$:".contains(c)
}

fn symbol(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| is_symbol_char(c) && !c.is_ascii_digit()),
        take_while(is_symbol_char),
    ))(input)
}

#[test]
fn test_symbol() {
    assert_eq!(symbol("Main.fibonacci$IF_TRUE:1"), Ok(("", "Main.fibonacci$IF_TRUE:1")));
    assert!(symbol("1abc").is_err());
}

/// Runs `parser` over a whole lexeme, reporting `err` if anything is left over.
fn whole<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
    lexeme: &Lexeme<'a>,
    err: fn(String) -> ParseErrorKind,
) -> Result<O, ParseError> {
    all_consuming(parser)(lexeme.value)
        .map(|(_, out)| out)
        .map_err(|_| ParseError::new(lexeme.pos, err(lexeme.value.to_string())))
}

/// A parsed command and where it started.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Located<T> {
    pub pos: Position,
    pub node: T,
}

/// One source line's worth of lexemes: the command word and its arguments.
struct Line<'a> {
    head: Lexeme<'a>,
    args: Vec<Lexeme<'a>>,
}

impl<'a> Line<'a> {
    fn arg(&self, i: usize, what: &'static str) -> Result<&Lexeme<'a>, ParseError> {
        self.args.get(i).ok_or_else(|| {
            ParseError::new(
                self.head.pos,
                ParseErrorKind::MissingArgument {
                    command: self.head.value.to_string(),
                    what,
                },
            )
        })
    }

    fn arity(&self, count: usize) -> Result<(), ParseError> {
        match self.args.get(count) {
            Some(extra) => Err(ParseError::new(
                extra.pos,
                ParseErrorKind::ExtraArgument(extra.value.to_string()),
            )),
            None => Ok(()),
        }
    }

    fn symbol(&self, i: usize, what: &'static str) -> Result<String, ParseError> {
        whole(symbol, self.arg(i, what)?, ParseErrorKind::InvalidSymbol).map(str::to_string)
    }

    fn index(&self, i: usize, what: &'static str) -> Result<u16, ParseError> {
        whole(integer, self.arg(i, what)?, ParseErrorKind::InvalidIndex)
    }

    fn command(&self) -> Result<Command, ParseError> {
        let command = match self.head.value {
            op if ARITHMETIC_MNEMONICS.contains(&op) => {
                self.arity(0)?;
                Command::Arithmetic(op.to_string())
            }
            "push" | "pop" => {
                let seg = whole(segment, self.arg(0, "segment")?, ParseErrorKind::UnknownSegment)?;
                let arg = self.index(1, "index")?;
                self.arity(2)?;
                if self.head.value == "push" {
                    Command::Push(seg, arg)
                } else {
                    Command::Pop(seg, arg)
                }
            }
            "label" | "goto" | "if-goto" => {
                let sym = self.symbol(0, "label")?;
                self.arity(1)?;
                match self.head.value {
                    "label" => Command::Label(sym),
                    "goto" => Command::Goto(sym),
                    _ => Command::IfGoto(sym),
                }
            }
            "function" | "call" => {
                let name = self.symbol(0, "function name")?;
                let count = self.index(1, "count")?;
                self.arity(2)?;
                if self.head.value == "function" {
                    Command::Function(name, count)
                } else {
                    Command::Call(name, count)
                }
            }
            "return" => {
                self.arity(0)?;
                Command::Return
            }
            other => {
                return Err(ParseError::new(
                    self.head.pos,
                    ParseErrorKind::UnknownCommand(other.to_string()),
                ))
            }
        };
        Ok(command)
    }
}

/// Sequential command parser. Each call to [`Parser::advance`] consumes one
/// source line; a malformed line is reported and skipped as a whole.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    lexeme: Option<Lexeme<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        // Load the first token from the input
        let lexeme = lexer.next_token();
        Parser { lexer, lexeme }
    }

    pub fn has_more_commands(&self) -> bool {
        self.lexeme.is_some()
    }

    fn next_line(&mut self) -> Option<Line<'a>> {
        let head = self.lexeme.take()?;
        let mut args = vec![];
        loop {
            match self.lexer.next_token() {
                Some(lexeme) if lexeme.pos.line == head.pos.line => args.push(lexeme),
                next => {
                    self.lexeme = next;
                    break;
                }
            }
        }
        Some(Line { head, args })
    }

    /// Parse the next command. Call only while [`Parser::has_more_commands`]
    /// holds; past the end this reports an unexpected end of input.
    pub fn advance(&mut self) -> Result<Located<Command>, ParseError> {
        let line = self.next_line().ok_or_else(|| {
            ParseError::new(self.lexer.position(), ParseErrorKind::UnexpectedEnd)
        })?;

        let illegal = std::iter::once(&line.head)
            .chain(&line.args)
            .find(|l| l.token == Token::Illegal);
        if let Some(lexeme) = illegal {
            return Err(ParseError::new(
                lexeme.pos,
                ParseErrorKind::IllegalCharacter(lexeme.value.to_string()),
            ));
        }
        if line.head.token != Token::Command {
            return Err(ParseError::new(
                line.head.pos,
                ParseErrorKind::ExpectedCommand(line.head.value.to_string()),
            ));
        }

        Ok(Located {
            pos: line.head.pos,
            node: line.command()?,
        })
    }
}

/// Parse a whole source, collecting every command and every error.
pub fn parse(input: &str) -> (Vec<Located<Command>>, Vec<ParseError>) {
    let mut parser = Parser::new(input);
    let mut commands = vec![];
    let mut errors = vec![];

    while parser.has_more_commands() {
        match parser.advance() {
            Ok(command) => commands.push(command),
            Err(err) => errors.push(err),
        }
    }

    (commands, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Segment::*;

    fn commands(input: &str) -> Vec<Command> {
        let (commands, errors) = parse(input);
        assert_eq!(errors, vec![]);
        commands.into_iter().map(|c| c.node).collect()
    }

    fn error(input: &str) -> ParseError {
        let (_, mut errors) = parse(input);
        assert_eq!(errors.len(), 1, "{:?}", errors);
        errors.remove(0)
    }

    #[test]
    fn parses_every_keyword() {
        let source = "\
            // a comment line
            push  pointer  1
            pop static 3
            add
            not
            label LOOP_START
            if-goto LOOP_START  // back edge
            goto END
            function Main.fibonacci 2
            call Math.multiply 2
            return
        ";
        assert_eq!(
            commands(source),
            vec![
                Command::Push(Pointer, 1),
                Command::Pop(Static, 3),
                Command::arithmetic("add"),
                Command::arithmetic("not"),
                Command::Label("LOOP_START".into()),
                Command::IfGoto("LOOP_START".into()),
                Command::Goto("END".into()),
                Command::Function("Main.fibonacci".into(), 2),
                Command::Call("Math.multiply".into(), 2),
                Command::Return,
            ]
        );
    }

    #[test]
    fn pop_constant_is_left_to_the_translator() {
        assert_eq!(commands("pop constant 0"), vec![Command::Pop(Constant, 0)]);
    }

    #[test]
    fn positions_are_recorded() {
        let (commands, _) = parse("\n  push constant 1\nneg");
        assert_eq!(commands[0].pos, Position { line: 2, column: 3 });
        assert_eq!(commands[1].pos, Position { line: 3, column: 1 });
    }

    #[test]
    fn bad_index_is_an_error_not_zero() {
        let err = error("push local x1");
        assert_eq!(err.kind, ParseErrorKind::InvalidIndex("x1".into()));
        assert_eq!(err.pos, Position { line: 1, column: 12 });
    }

    #[test]
    fn errors_skip_the_line_only() {
        let (commands, errors) = parse("push heap 1\nmul\nadd\npush constant\nlabel 9lives\nsub");
        assert_eq!(
            commands.into_iter().map(|c| c.node).collect::<Vec<_>>(),
            vec![Command::arithmetic("add"), Command::arithmetic("sub")]
        );
        let kinds: Vec<_> = errors.into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParseErrorKind::UnknownSegment("heap".into()),
                ParseErrorKind::UnknownCommand("mul".into()),
                ParseErrorKind::MissingArgument { command: "push".into(), what: "index" },
                ParseErrorKind::InvalidSymbol("9lives".into()),
            ]
        );
    }

    #[test]
    fn extra_arguments() {
        assert_eq!(
            error("return 1").kind,
            ParseErrorKind::ExtraArgument("1".into())
        );
        assert_eq!(
            error("push constant 1 2").kind,
            ParseErrorKind::ExtraArgument("2".into())
        );
    }

    #[test]
    fn illegal_characters() {
        assert_eq!(
            error("push constant #1").kind,
            ParseErrorKind::IllegalCharacter("#".into())
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(error("ADD").kind, ParseErrorKind::UnknownCommand("ADD".into()));
    }

    #[test]
    fn advance_past_end() {
        let mut parser = Parser::new("add");
        assert!(parser.advance().is_ok());
        assert!(!parser.has_more_commands());
        assert_eq!(parser.advance().unwrap_err().kind, ParseErrorKind::UnexpectedEnd);
    }
}
