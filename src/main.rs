use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use vmil::driver::{self, Options};

/// Translate VM code into Hack assembly.
#[derive(Parser, Debug)]
#[command(name = "vmil-translator", version, about)]
struct Cli {
    /// A .vm file, or a directory of .vm files
    input: PathBuf,

    /// Output file (default: <file>.asm, or <dir>/<dir>.asm)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Always emit the bootstrap sequence
    #[arg(long, conflicts_with = "no_bootstrap")]
    bootstrap: bool,

    /// Never emit the bootstrap sequence
    #[arg(long)]
    no_bootstrap: bool,

    /// Leave out the `// <command>` comment before each translated command
    #[arg(long)]
    no_comments: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> Options {
        let bootstrap = match (self.bootstrap, self.no_bootstrap) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Options {
            input: self.input.clone(),
            output: self.output.clone(),
            bootstrap,
            annotate: !self.no_comments,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match driver::translate_path(&cli.options()) {
        Ok(report) => {
            for diagnostic in &report.diagnostics {
                eprintln!("error: {}", diagnostic);
            }
            if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                eprintln!(
                    "{} problem(s) found; see comments in {}",
                    report.diagnostics.len(),
                    report.output.display()
                );
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
