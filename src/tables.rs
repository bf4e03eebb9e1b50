//! Fixed lookup tables shared by the emitters: where each segment lives on the
//! Hack machine, and which instruction fragments each arithmetic mnemonic maps to.

use crate::ast::Segment;

/// Address the stack starts at after bootstrap.
pub const STACK_BASE: u16 = 256;

/// First cell of the `temp` segment (R5..=R12).
pub const TEMP_BASE: &str = "R5";
pub const TEMP_SIZE: u16 = 8;

/// Holds the destination address while a pop reads the stack. Nothing else
/// may use it between the store and the write-back, so pop translation is
/// not reentrant.
pub const POP_ADDRESS_CELL: &str = "R13";

/// Frame base captured by `return`.
pub const FRAME_CELL: &str = "R14";

/// Return address captured by `return`.
pub const RETURN_ADDRESS_CELL: &str = "R15";

/// Saved-frame size pushed by `call`: return address plus four bases.
pub const FRAME_SIZE: u16 = 5;

pub const ENTRY_FUNCTION: &str = "Sys.init";

/// How a segment's cells are reached.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Addressing {
    Immediate,
    /// The named register holds a pointer to cell 0.
    Indirect(&'static str),
    /// Cell 0 sits at a fixed address.
    Fixed(&'static str),
    /// Index picks `THIS` or `THAT` itself.
    Pointer,
    /// One assembler symbol per unit and index.
    Static,
}

pub fn addressing(segment: Segment) -> Addressing {
    match segment {
        Segment::Constant => Addressing::Immediate,
        Segment::Local => Addressing::Indirect("LCL"),
        Segment::Argument => Addressing::Indirect("ARG"),
        Segment::This => Addressing::Indirect("THIS"),
        Segment::That => Addressing::Indirect("THAT"),
        Segment::Temp => Addressing::Fixed(TEMP_BASE),
        Segment::Pointer => Addressing::Pointer,
        Segment::Static => Addressing::Static,
    }
}

pub fn pointer_register(index: u16) -> Option<&'static str> {
    match index {
        0 => Some("THIS"),
        1 => Some("THAT"),
        _ => None,
    }
}

/// Base registers saved by `call`, in push order. `return` restores them in reverse.
pub const SAVED_BASES: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithmeticOp {
    /// Pops one operand. Holds the `comp` that computes the result into D.
    Unary(&'static str),
    /// Pops two operands.
    Binary(&'static str),
    /// Pops two operands. Holds the jump taken when the comparison is true.
    Compare(&'static str),
}

pub fn arithmetic_op(mnemonic: &str) -> Option<ArithmeticOp> {
    use ArithmeticOp::*;

    Some(match mnemonic {
        "add" => Binary("D=D+M"),
        "sub" => Binary("D=M-D"),
        "and" => Binary("D=D&M"),
        "or" => Binary("D=D|M"),
        "neg" => Unary("D=-M"),
        "not" => Unary("D=!M"),
        "eq" => Compare("JEQ"),
        "gt" => Compare("JGT"),
        "lt" => Compare("JLT"),
        _ => return None,
    })
}

pub const ARITHMETIC_MNEMONICS: [&str; 9] = ["add", "sub", "neg", "eq", "gt", "lt", "and", "or", "not"];

#[test]
fn test_every_mnemonic_has_an_op() {
    for mnemonic in ARITHMETIC_MNEMONICS {
        assert!(arithmetic_op(mnemonic).is_some(), "{}", mnemonic);
    }
    assert_eq!(arithmetic_op("mul"), None);
    assert_eq!(arithmetic_op("ADD"), None);
}

#[test]
fn test_addressing() {
    assert_eq!(addressing(Segment::Local), Addressing::Indirect("LCL"));
    assert_eq!(addressing(Segment::Temp), Addressing::Fixed("R5"));
    assert_eq!(pointer_register(1), Some("THAT"));
    assert_eq!(pointer_register(2), None);
}
