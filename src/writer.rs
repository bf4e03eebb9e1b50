use std::fmt::Write as _;
use std::io::Write;

use crate::ast::Command;
use crate::error::{TranslateError, WriteError};
use crate::translator::{self, UnitContext};

const UNSUPPORTED_CMD: &str = "Unsupported Command: ";

/// Comment left in the output in place of a command that could not be
/// translated. It is never executable.
pub fn diagnostic_comment(command: &Command, err: &TranslateError) -> String {
    match err {
        TranslateError::UnsupportedArithmetic(op) => format!("// {}{}", UNSUPPORTED_CMD, op),
        _ => format!("// Invalid Command: {} ({})", command, err),
    }
}

/// Streams translated commands into `W`, one write per command.
pub struct CodeWriter<W: Write> {
    out: W,
    annotate: bool,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        CodeWriter { out, annotate: true }
    }

    /// Whether each command is preceded by a `// <command>` comment.
    pub fn annotate(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    fn write_lines(&mut self, header: &dyn std::fmt::Display, lines: &[String]) -> Result<(), WriteError> {
        let mut output = String::new();
        if self.annotate {
            // Writing to a String cannot fail
            let _ = writeln!(output, "// {}", header);
        }
        for line in lines {
            output.push_str(line);
            output.push('\n');
        }
        self.out.write_all(output.as_bytes())?;
        Ok(())
    }

    /// Translate and write one command.
    ///
    /// A command that cannot be translated still leaves a diagnostic comment
    /// in the output, and comes back as [`WriteError::Translate`]; the writer
    /// and `ctx` remain usable. [`WriteError::Io`] means the output is broken.
    pub fn write_command(&mut self, ctx: &mut UnitContext, command: &Command) -> Result<(), WriteError> {
        log::trace!("Handling command: {}", command);

        match translator::translate(ctx, command) {
            Ok(lines) => self.write_lines(command, &lines),
            Err(err) => {
                log::warn!("{}: {}", ctx.unit_label(), err);
                writeln!(self.out, "{}", diagnostic_comment(command, &err))?;
                Err(err.into())
            }
        }
    }

    /// Write the program entry sequence. `ctx` should come from
    /// [`UnitContext::bootstrap`].
    pub fn write_init(&mut self, ctx: &mut UnitContext) -> Result<(), WriteError> {
        log::debug!("Writing bootstrap");
        let lines = translator::bootstrap(ctx);
        self.write_lines(&"bootstrap: SP = 256, call Sys.init 0", &lines)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
