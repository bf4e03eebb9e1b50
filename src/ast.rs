use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::Constant,
        Segment::Local,
        Segment::Static,
        Segment::Argument,
        Segment::This,
        Segment::That,
        Segment::Pointer,
        Segment::Temp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }

    pub fn from_name(name: &str) -> Option<Segment> {
        Segment::ALL.into_iter().find(|seg| seg.name() == name)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discriminant of a [`Command`], for callers that only care about the kind.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandKind {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    IfGoto,
    Function,
    Call,
    Return,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    // Stack
    /// Holds the mnemonic as written. The parser only produces the nine known
    /// ones; anything else is rejected by the translator.
    Arithmetic(String),
    Push(Segment, u16),
    Pop(Segment, u16),

    // Control
    Label(String),
    Goto(String),
    IfGoto(String),

    // Functions
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl Command {
    pub fn arithmetic(mnemonic: &str) -> Self {
        Command::Arithmetic(mnemonic.to_string())
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Arithmetic(_) => CommandKind::Arithmetic,
            Command::Push(..) => CommandKind::Push,
            Command::Pop(..) => CommandKind::Pop,
            Command::Label(_) => CommandKind::Label,
            Command::Goto(_) => CommandKind::Goto,
            Command::IfGoto(_) => CommandKind::IfGoto,
            Command::Function(..) => CommandKind::Function,
            Command::Call(..) => CommandKind::Call,
            Command::Return => CommandKind::Return,
        }
    }

    /// Mnemonic, segment, label or function name. `None` for `return`.
    pub fn arg1(&self) -> Option<&str> {
        match self {
            Command::Arithmetic(op) => Some(op),
            Command::Push(seg, _) | Command::Pop(seg, _) => Some(seg.name()),
            Command::Label(sym) | Command::Goto(sym) | Command::IfGoto(sym) => Some(sym),
            Command::Function(name, _) | Command::Call(name, _) => Some(name),
            Command::Return => None,
        }
    }

    pub fn arg2(&self) -> Option<u16> {
        match self {
            Command::Push(_, arg)
            | Command::Pop(_, arg)
            | Command::Function(_, arg)
            | Command::Call(_, arg) => Some(*arg),
            _ => None,
        }
    }
}

/// Renders the command back into VM source form.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Arithmetic(op) => write!(f, "{}", op),
            Command::Push(seg, arg) => write!(f, "push {} {}", seg, arg),
            Command::Pop(seg, arg) => write!(f, "pop {} {}", seg, arg),
            Command::Label(sym) => write!(f, "label {}", sym),
            Command::Goto(sym) => write!(f, "goto {}", sym),
            Command::IfGoto(sym) => write!(f, "if-goto {}", sym),
            Command::Function(name, locals) => write!(f, "function {} {}", name, locals),
            Command::Call(name, args) => write!(f, "call {} {}", name, args),
            Command::Return => f.write_str("return"),
        }
    }
}

#[test]
fn test_arg2_presence() {
    assert_eq!(Command::Push(Segment::Local, 3).arg2(), Some(3));
    assert_eq!(Command::Call("Foo.bar".into(), 2).arg2(), Some(2));
    assert_eq!(Command::arithmetic("add").arg2(), None);
    assert_eq!(Command::Goto("LOOP".into()).arg2(), None);
    assert_eq!(Command::Return.arg2(), None);
}

#[test]
fn test_arg1() {
    assert_eq!(Command::Pop(Segment::That, 1).arg1(), Some("that"));
    assert_eq!(Command::Function("Main.main".into(), 0).arg1(), Some("Main.main"));
    assert_eq!(Command::Return.arg1(), None);
    assert_eq!(Command::Return.kind(), CommandKind::Return);
}

#[test]
fn test_display() {
    assert_eq!(Command::IfGoto("END".into()).to_string(), "if-goto END");
    assert_eq!(Command::Push(Segment::Constant, 7).to_string(), "push constant 7");
}
