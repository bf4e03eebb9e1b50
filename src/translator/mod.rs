//! Hack assembly generation, one VM command at a time.
//!
//! Every emitter is a plain function of a [`UnitContext`] and the command's
//! arguments. The context carries the only mutable state (label counters and the
//! enclosing function), so independent units can be translated side by side.

use std::fmt::Display;

use crate::ast::Command;
use crate::error::TranslateError;

macro_rules! svec {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

mod arithmetic;
mod call;
mod flow;
mod memory;

pub use call::bootstrap;

fn at<T: Display>(sym: T) -> String {
    format!("@{}", sym)
}

fn define<T: Display>(sym: T) -> String {
    format!("({})", sym)
}

/// D -> *SP, SP++
fn push_d() -> Vec<String> {
    svec!["@SP", "A=M", "M=D", "@SP", "M=M+1"]
}

/// SP--, *SP -> D
fn pop_d() -> Vec<String> {
    svec!["@SP", "AM=M-1", "D=M"]
}

/// Label counters and naming scope for one translation unit (one `.vm` file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitContext {
    unit_label: String,
    current_function: Option<String>,
    comparison_counter: u32,
    return_counter: u32,
}

impl UnitContext {
    pub fn new(unit_label: impl Into<String>) -> Self {
        UnitContext {
            unit_label: unit_label.into(),
            current_function: None,
            comparison_counter: 1,
            return_counter: 1,
        }
    }

    /// Context for the program entry sequence. It already sits in `Sys.init`
    /// so the entry call's return label is namespaced, and its return counter
    /// starts below the one `function Sys.init` resets to, keeping that label
    /// apart from every call site inside `Sys.init`.
    pub fn bootstrap() -> Self {
        UnitContext {
            unit_label: "Sys".to_string(),
            current_function: Some(crate::tables::ENTRY_FUNCTION.to_string()),
            comparison_counter: 1,
            return_counter: 0,
        }
    }

    pub fn unit_label(&self) -> &str {
        &self.unit_label
    }

    pub fn current_function(&self) -> Option<&str> {
        self.current_function.as_deref()
    }

    pub fn comparison_counter(&self) -> u32 {
        self.comparison_counter
    }

    pub fn return_counter(&self) -> u32 {
        self.return_counter
    }

    fn enter_function(&mut self, name: &str) {
        self.current_function = Some(name.to_string());
        self.comparison_counter = 1;
        self.return_counter = 1;
    }

    /// Prefix for generated labels: the function, or the unit outside any function.
    fn scope(&self) -> &str {
        self.current_function().unwrap_or(&self.unit_label)
    }

    fn next_comparison(&mut self) -> u32 {
        let tmp = self.comparison_counter;
        self.comparison_counter += 1;
        tmp
    }

    fn next_return_label(&mut self) -> String {
        let tmp = self.return_counter;
        self.return_counter += 1;
        format!("{}$ret.{}", self.scope(), tmp)
    }

    /// Convert a VM label to a Hack symbol. Labels outside any function stay bare.
    fn label_to_sym(&self, label: &str) -> String {
        match self.current_function() {
            Some(function) => format!("{}${}", function, label),
            None => label.to_string(),
        }
    }

    fn static_sym(&self, index: u16) -> String {
        format!("{}.{}", self.unit_label, index)
    }
}

/// Emit the Hack instructions for one command.
///
/// On error nothing has been emitted and the context is unchanged, so the
/// caller can report the command and move on to the next one.
pub fn translate(ctx: &mut UnitContext, command: &Command) -> Result<Vec<String>, TranslateError> {
    match command {
        Command::Arithmetic(op) => arithmetic::translate(ctx, op),
        Command::Push(seg, arg) => memory::push(ctx, *seg, *arg),
        Command::Pop(seg, arg) => memory::pop(ctx, *seg, *arg),
        Command::Label(sym) => Ok(flow::label(ctx, sym)),
        Command::Goto(sym) => Ok(flow::goto(ctx, sym)),
        Command::IfGoto(sym) => Ok(flow::if_goto(ctx, sym)),
        Command::Function(name, locals) => Ok(call::function(ctx, name, *locals)),
        Command::Call(name, args) => Ok(call::call(ctx, name, *args)),
        Command::Return => Ok(call::ret()),
    }
}
