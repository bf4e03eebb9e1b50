use super::{at, define, pop_d, UnitContext};

pub(super) fn label(ctx: &UnitContext, label: &str) -> Vec<String> {
    svec![define(ctx.label_to_sym(label))]
}

pub(super) fn goto(ctx: &UnitContext, label: &str) -> Vec<String> {
    svec![
        at(ctx.label_to_sym(label)),
        "0;JMP" // Unconditional jump
    ]
}

pub(super) fn if_goto(ctx: &UnitContext, label: &str) -> Vec<String> {
    [
        pop_d(), // Stack popped into D
        svec![
            at(ctx.label_to_sym(label)),
            "D;JNE" // False is 0
        ],
    ]
    .concat()
}
