use super::{at, define, pop_d, push_d, UnitContext};
use crate::error::TranslateError;
use crate::tables::{arithmetic_op, ArithmeticOp};

pub(super) fn translate(ctx: &mut UnitContext, mnemonic: &str) -> Result<Vec<String>, TranslateError> {
    match arithmetic_op(mnemonic) {
        Some(ArithmeticOp::Unary(comp)) => Ok(un_op(comp)),
        Some(ArithmeticOp::Binary(comp)) => Ok(bin_op(comp)),
        Some(ArithmeticOp::Compare(jump)) => Ok(compare(ctx, jump)),
        None => Err(TranslateError::UnsupportedArithmetic(mnemonic.to_string())),
    }
}

fn un_op(comp: &str) -> Vec<String> {
    [svec!["@SP", "AM=M-1", comp], push_d()].concat()
}

// i.e. no conditions or jumps, just pop and run
fn bin_op(comp: &str) -> Vec<String> {
    [
        pop_d(), // Right arg in D
        svec!["@SP", "AM=M-1", comp],
        push_d(),
    ]
    .concat()
}

fn compare(ctx: &mut UnitContext, jump: &str) -> Vec<String> {
    let sym = ctx.next_comparison();
    // User labels never start with a digit, so these cannot clash with them
    let cmp_sym = format!("{}${}.cmp", ctx.scope(), sym);
    let end_sym = format!("{}${}.end", ctx.scope(), sym);
    [
        pop_d(),
        svec![
            "@SP",
            "AM=M-1",
            "D=M-D", // first - second
            at(&cmp_sym),
            format!("D;{}", jump),
            "D=0",
            at(&end_sym),
            "0;JMP",
            define(&cmp_sym),
            "D=-1", // true is all ones
            define(&end_sym),
        ],
        push_d(),
    ]
    .concat()
}
