//! Function entry, call and return: the calling convention the VM expects,
//! built out of plain loads and stores.
//!
//! A call leaves this frame on the stack, with `ARG` pointing at the first
//! argument and `LCL` just past the saved `THAT`:
//!
//! ```text
//! ARG -> argument 0 .. argument n-1
//!        return address
//!        saved LCL, ARG, THIS, THAT
//! LCL -> local 0 .. local k-1
//! ```

use super::{at, define, pop_d, push_d, UnitContext};
use crate::tables::{
    ENTRY_FUNCTION, FRAME_CELL, FRAME_SIZE, RETURN_ADDRESS_CELL, SAVED_BASES, STACK_BASE,
};

pub(super) fn function(ctx: &mut UnitContext, name: &str, locals: u16) -> Vec<String> {
    ctx.enter_function(name);

    let mut lines = svec![define(name)];
    for _ in 0..locals {
        lines.extend(svec!["@SP", "A=M", "M=0", "@SP", "M=M+1"]);
    }
    lines
}

pub(super) fn call(ctx: &mut UnitContext, name: &str, args: u16) -> Vec<String> {
    let ret_sym = ctx.next_return_label();

    let mut lines = [svec![at(&ret_sym), "D=A"], push_d()].concat();
    for base in SAVED_BASES {
        lines.extend(svec![at(base), "D=M"]);
        lines.extend(push_d());
    }
    // SP already counts the saved frame here
    lines.extend(svec![
        "@SP",
        "D=M",
        at(args),
        "D=D-A",
        at(FRAME_SIZE),
        "D=D-A",
        "@ARG",
        "M=D", // ARG = SP - args - 5
        "@SP",
        "D=M",
        "@LCL",
        "M=D", // LCL = SP
        at(name),
        "0;JMP",
        define(&ret_sym),
    ]);
    lines
}

/// `nth_saved` is the distance below the frame base: 1 for `THAT` up to 4 for `LCL`.
fn restore(nth_saved: u16, base: &str) -> Vec<String> {
    let address = if nth_saved == 1 {
        svec![at(FRAME_CELL), "D=M-1"]
    } else {
        svec![at(nth_saved), "D=A", at(FRAME_CELL), "D=M-D"]
    };
    [address, svec!["A=D", "D=M", at(base), "M=D"]].concat()
}

pub(super) fn ret() -> Vec<String> {
    let mut lines = svec![
        "@LCL",
        "D=M",
        at(FRAME_CELL),
        "M=D", // FRAME = LCL
        at(FRAME_SIZE),
        "D=D-A",
        "A=D",
        "D=M",
        at(RETURN_ADDRESS_CELL),
        "M=D", // RET = *(FRAME-5)
    ];
    lines.extend(pop_d());
    lines.extend(svec![
        "@ARG",
        "A=M",
        "M=D", // *ARG = pop()
        "@ARG",
        "D=M+1",
        "@SP",
        "M=D", // SP = ARG + 1
    ]);
    // LCL last: FRAME was read from it
    for (nth, base) in SAVED_BASES.iter().rev().enumerate() {
        lines.extend(restore(nth as u16 + 1, base));
    }
    lines.extend(svec![at(RETURN_ADDRESS_CELL), "A=M", "0;JMP"]);
    lines
}

/// Program entry: point SP at the stack base and call `Sys.init`.
pub fn bootstrap(ctx: &mut UnitContext) -> Vec<String> {
    let init_sp = svec![at(STACK_BASE), "D=A", "@SP", "M=D"];
    [init_sp, call(ctx, ENTRY_FUNCTION, 0)].concat()
}
