//! File and directory handling around the translator.
//!
//! A single `Foo.vm` becomes `Foo.asm` next to it. A directory `Prog/` becomes
//! `Prog/Prog.asm`: the bootstrap, then every `.vm` file in name order, each
//! translated with its own [`UnitContext`].

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, bail, Context};

use crate::error::{Position, WriteError};
use crate::parser::{Located, Parser};
use crate::translator::UnitContext;
use crate::writer::CodeWriter;

pub const SOURCE_EXTENSION: &str = "vm";
pub const TARGET_EXTENSION: &str = "asm";

#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    /// Overrides the derived output path.
    pub output: Option<PathBuf>,
    /// Overrides the default: bootstrap for directories only.
    pub bootstrap: Option<bool>,
    pub annotate: bool,
}

impl Options {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Options {
            input: input.into(),
            output: None,
            bootstrap: None,
            annotate: true,
        }
    }
}

/// Something that went wrong in one file. Never stops the other files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub pos: Option<Position>,
    /// Source text of the offending line.
    pub command: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(pos) = self.pos {
            write!(f, ":{}", pos)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(command) = &self.command {
            write!(f, " in `{}`", command)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct UnitOutput {
    pub asm: Vec<u8>,
    pub diagnostics: Vec<Diagnostic>,
    pub commands: usize,
}

#[derive(Debug)]
pub struct TranslationReport {
    pub output: PathBuf,
    pub files: usize,
    pub commands: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl TranslationReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

fn source_line(source: &str, pos: Position) -> Option<String> {
    source
        .lines()
        .nth(pos.line.checked_sub(1)?)
        .map(|line| line.trim().to_string())
}

/// Translate one unit's source text. Only output I/O errors are returned;
/// everything else ends up in [`UnitOutput::diagnostics`].
pub fn translate_source(
    source: &str,
    file: &str,
    unit_label: &str,
    annotate: bool,
) -> Result<UnitOutput, WriteError> {
    log::debug!("Translating unit {} from {}", unit_label, file);
    let mut ctx = UnitContext::new(unit_label);
    let mut writer = CodeWriter::new(Vec::new()).annotate(annotate);
    let mut parser = Parser::new(source);
    let mut diagnostics = vec![];
    let mut commands = 0;

    let report = |pos: Position, message: String| Diagnostic {
        file: file.to_string(),
        pos: Some(pos),
        command: source_line(source, pos),
        message,
    };

    while parser.has_more_commands() {
        match parser.advance() {
            Ok(Located { pos, node }) => {
                commands += 1;
                if let Err(err) = writer.write_command(&mut ctx, &node) {
                    if err.is_fatal() {
                        return Err(err);
                    }
                    diagnostics.push(report(pos, err.to_string()));
                }
            }
            Err(err) => {
                log::warn!("{}:{}", file, err);
                diagnostics.push(report(err.pos, err.kind.to_string()));
            }
        }
    }

    Ok(UnitOutput {
        asm: writer.into_inner(),
        diagnostics,
        commands,
    })
}

fn unit_label(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("cannot derive a unit name from {}", path.display()))
}

fn is_source(path: &Path) -> bool {
    path.is_file() && path.extension().map_or(false, |ext| ext == SOURCE_EXTENSION)
}

/// Read and translate one file. Failing to read it is reported as a
/// diagnostic so that sibling files still get translated.
fn translate_file(path: &Path, annotate: bool) -> anyhow::Result<UnitOutput> {
    let file = path.display().to_string();
    let label = unit_label(path)?;
    log::info!("Translating {}", file);

    match fs::read_to_string(path) {
        Ok(source) => Ok(translate_source(&source, &file, &label, annotate)?),
        Err(err) => Ok(UnitOutput {
            asm: vec![],
            diagnostics: vec![Diagnostic {
                file,
                pos: None,
                command: None,
                message: format!("could not read file: {}", err),
            }],
            commands: 0,
        }),
    }
}

/// Write to a sibling temporary file, then move it into place, so a failed
/// run never leaves a truncated `.asm` behind.
fn write_output(path: &Path, bootstrap: bool, annotate: bool, units: &[UnitOutput]) -> anyhow::Result<()> {
    let tmp = path.with_extension("asm.tmp");
    let result = (|| -> anyhow::Result<()> {
        let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        let mut writer = CodeWriter::new(BufWriter::new(file)).annotate(annotate);
        if bootstrap {
            writer.write_init(&mut UnitContext::bootstrap())?;
        }
        let mut out = writer.into_inner();
        for unit in units {
            out.write_all(&unit.asm)?;
        }
        out.flush()?;
        drop(out);
        fs::rename(&tmp, path).with_context(|| format!("moving output to {}", path.display()))?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result.with_context(|| format!("writing {}", path.display()))
}

fn translate_single(options: &Options) -> anyhow::Result<TranslationReport> {
    let path = &options.input;
    if !is_source(path) {
        bail!("{} is not a .{} file", path.display(), SOURCE_EXTENSION);
    }

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| path.with_extension(TARGET_EXTENSION));
    let unit = translate_file(path, options.annotate)?;
    write_output(&output, options.bootstrap.unwrap_or(false), options.annotate, std::slice::from_ref(&unit))?;

    Ok(TranslationReport {
        output,
        files: 1,
        commands: unit.commands,
        diagnostics: unit.diagnostics,
    })
}

/// `.vm` files directly inside `dir`, in name order.
pub fn source_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if is_source(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Translate `files` on at most `workers` threads at a time. Each worker
/// owns its context and buffer; results come back in file order.
fn translate_files(files: &[PathBuf], annotate: bool, workers: usize) -> anyhow::Result<Vec<UnitOutput>> {
    let mut units = Vec::with_capacity(files.len());
    for batch in files.chunks(workers.max(1)) {
        let results = thread::scope(|s| -> anyhow::Result<Vec<_>> {
            let mut handles = Vec::with_capacity(batch.len());
            for path in batch {
                let handle = thread::Builder::new()
                    .name(format!("translate-{}", path.display()))
                    .spawn_scoped(s, move || translate_file(path, annotate))
                    .with_context(|| format!("starting a worker for {}", path.display()))?;
                handles.push(handle);
            }
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| Err(anyhow!("translation worker panicked")))
                })
                .collect()
        })?;
        units.extend(results);
    }
    Ok(units)
}

fn translate_directory(options: &Options) -> anyhow::Result<TranslationReport> {
    let dir = options
        .input
        .canonicalize()
        .with_context(|| format!("resolving {}", options.input.display()))?;
    let files = source_files(&dir)?;
    if files.is_empty() {
        bail!("no .{} files in {}", SOURCE_EXTENSION, dir.display());
    }

    let output = match &options.output {
        Some(output) => output.clone(),
        None => {
            let name = unit_label(&dir)?;
            dir.join(format!("{}.{}", name, TARGET_EXTENSION))
        }
    };
    log::info!("Translating {} files from {}", files.len(), dir.display());

    let annotate = options.annotate;
    let workers = thread::available_parallelism().map_or(1, |n| n.get());
    let units = translate_files(&files, annotate, workers)?;

    write_output(&output, options.bootstrap.unwrap_or(true), annotate, &units)?;

    Ok(TranslationReport {
        output,
        files: units.len(),
        commands: units.iter().map(|unit| unit.commands).sum(),
        diagnostics: units.into_iter().flat_map(|unit| unit.diagnostics).collect(),
    })
}

/// Translate a file or a directory as described by `options`.
pub fn translate_path(options: &Options) -> anyhow::Result<TranslationReport> {
    let metadata = fs::metadata(&options.input)
        .with_context(|| format!("reading {}", options.input.display()))?;

    let report = if metadata.is_dir() {
        translate_directory(options)?
    } else {
        translate_single(options)?
    };

    log::info!(
        "Created output file: {} ({} files, {} commands, {} diagnostics)",
        report.output.display(),
        report.files,
        report.commands,
        report.diagnostics.len()
    );
    Ok(report)
}
