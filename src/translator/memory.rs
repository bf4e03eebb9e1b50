use super::{at, pop_d, push_d, UnitContext};
use crate::ast::Segment;
use crate::error::TranslateError;
use crate::tables::{addressing, pointer_register, Addressing, POP_ADDRESS_CELL, TEMP_SIZE};

/// Symbol of a directly addressed cell (`pointer`, `static`).
fn direct_sym(ctx: &UnitContext, segment: Segment, arg: u16) -> Result<String, TranslateError> {
    let out_of_range = TranslateError::SegmentIndexOutOfRange { segment, index: arg };
    match addressing(segment) {
        Addressing::Pointer => pointer_register(arg).map(str::to_string).ok_or(out_of_range),
        _ => Ok(ctx.static_sym(arg)),
    }
}

fn check_temp(segment: Segment, arg: u16) -> Result<(), TranslateError> {
    if segment == Segment::Temp && arg >= TEMP_SIZE {
        return Err(TranslateError::SegmentIndexOutOfRange { segment, index: arg });
    }
    Ok(())
}

pub(super) fn push(ctx: &UnitContext, segment: Segment, arg: u16) -> Result<Vec<String>, TranslateError> {
    check_temp(segment, arg)?;
    let load = match addressing(segment) {
        Addressing::Immediate => svec![at(arg), "D=A"],
        Addressing::Indirect(base) => svec![
            at(arg),
            "D=A",
            at(base),
            "A=D+M", // A = *base + arg
            "D=M"
        ],
        Addressing::Fixed(base) => svec![at(arg), "D=A", at(base), "A=D+A", "D=M"],
        Addressing::Pointer | Addressing::Static => {
            svec![at(direct_sym(ctx, segment, arg)?), "D=M"]
        }
    };
    Ok([load, push_d()].concat())
}

pub(super) fn pop(ctx: &UnitContext, segment: Segment, arg: u16) -> Result<Vec<String>, TranslateError> {
    check_temp(segment, arg)?;
    let lines = match addressing(segment) {
        Addressing::Immediate => return Err(TranslateError::PopConstant(arg)),
        Addressing::Indirect(base) => seg_pop(svec![at(arg), "D=A", at(base), "D=D+M"]),
        Addressing::Fixed(base) => seg_pop(svec![at(arg), "D=A", at(base), "D=D+A"]),
        Addressing::Pointer | Addressing::Static => {
            [pop_d(), svec![at(direct_sym(ctx, segment, arg)?), "M=D"]].concat()
        }
    };
    Ok(lines)
}

/// `address` leaves the destination in D. Popping clobbers both D and A, so
/// the address waits in the scratch cell until the value is in hand.
fn seg_pop(address: Vec<String>) -> Vec<String> {
    [
        address,
        svec![at(POP_ADDRESS_CELL), "M=D"],
        pop_d(),
        svec![at(POP_ADDRESS_CELL), "A=M", "M=D"],
    ]
    .concat()
}
