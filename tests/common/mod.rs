//! A minimal Hack CPU that runs textual assembly, enough to check what the
//! translator's output actually does.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use vmil::driver::translate_source;

pub const SP: usize = 0;
pub const LCL: usize = 1;
pub const ARG: usize = 2;
pub const THIS: usize = 3;
pub const THAT: usize = 4;

#[derive(Debug, Clone)]
enum Instr {
    Address(i16),
    Compute {
        dest: String,
        comp: String,
        jump: Option<String>,
    },
}

pub struct Machine {
    pub ram: Vec<i16>,
    pub a: i16,
    pub d: i16,
    pub pc: usize,
    program: Vec<Instr>,
    symbols: HashMap<String, u16>,
}

fn predefined() -> HashMap<String, u16> {
    let mut symbols: HashMap<String, u16> = [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ]
    .into_iter()
    .map(|(name, addr)| (name.to_string(), addr))
    .collect();
    for r in 0..16 {
        symbols.insert(format!("R{}", r), r);
    }
    symbols
}

impl Machine {
    /// Assemble `asm`. Panics on a label defined twice, which would make
    /// jumps ambiguous.
    pub fn load(asm: &str) -> Self {
        let lines: Vec<&str> = asm
            .lines()
            .map(|line| line.split("//").next().unwrap().trim())
            .filter(|line| !line.is_empty())
            .collect();

        let mut symbols = predefined();
        let mut labels = HashMap::new();
        let mut count = 0u16;
        for line in &lines {
            if let Some(label) = line.strip_prefix('(').and_then(|l| l.strip_suffix(')')) {
                assert!(
                    labels.insert(label.to_string(), count).is_none(),
                    "label {} defined twice",
                    label
                );
            } else {
                count += 1;
            }
        }
        symbols.extend(labels);

        let mut next_var = 16u16;
        let mut program = vec![];
        for line in lines {
            if line.starts_with('(') {
                continue;
            }
            if let Some(sym) = line.strip_prefix('@') {
                let value = match sym.parse::<u16>() {
                    Ok(value) => value,
                    Err(_) => *symbols.entry(sym.to_string()).or_insert_with(|| {
                        next_var += 1;
                        next_var - 1
                    }),
                };
                program.push(Instr::Address(value as i16));
                continue;
            }
            let (rest, jump) = match line.split_once(';') {
                Some((rest, jump)) => (rest, Some(jump.to_string())),
                None => (line, None),
            };
            let (dest, comp) = match rest.split_once('=') {
                Some((dest, comp)) => (dest.to_string(), comp.to_string()),
                None => (String::new(), rest.to_string()),
            };
            program.push(Instr::Compute { dest, comp, jump });
        }

        Machine {
            ram: vec![0; 32768],
            a: 0,
            d: 0,
            pc: 0,
            program,
            symbols,
        }
    }

    pub fn address_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.get(symbol).map(|addr| *addr as usize)
    }

    fn compute(&self, comp: &str) -> i16 {
        let (x, y) = if comp.contains('M') {
            (self.d, self.ram[self.a as u16 as usize])
        } else {
            (self.d, self.a)
        };
        match comp.replace('M', "A").as_str() {
            "0" => 0,
            "1" => 1,
            "-1" => -1,
            "D" => x,
            "A" => y,
            "!D" => !x,
            "!A" => !y,
            "-D" => x.wrapping_neg(),
            "-A" => y.wrapping_neg(),
            "D+1" => x.wrapping_add(1),
            "A+1" => y.wrapping_add(1),
            "D-1" => x.wrapping_sub(1),
            "A-1" => y.wrapping_sub(1),
            "D+A" | "A+D" => x.wrapping_add(y),
            "D-A" => x.wrapping_sub(y),
            "A-D" => y.wrapping_sub(x),
            "D&A" | "A&D" => x & y,
            "D|A" | "A|D" => x | y,
            other => panic!("not a Hack computation: {}", other),
        }
    }

    pub fn step(&mut self) {
        match self.program[self.pc].clone() {
            Instr::Address(value) => {
                self.a = value;
                self.pc += 1;
            }
            Instr::Compute { dest, comp, jump } => {
                let value = self.compute(&comp);
                let addr = self.a as u16 as usize;
                if dest.contains('M') {
                    self.ram[addr] = value;
                }
                if dest.contains('A') {
                    self.a = value;
                }
                if dest.contains('D') {
                    self.d = value;
                }
                let taken = match jump.as_deref() {
                    None => false,
                    Some("JGT") => value > 0,
                    Some("JEQ") => value == 0,
                    Some("JGE") => value >= 0,
                    Some("JLT") => value < 0,
                    Some("JNE") => value != 0,
                    Some("JLE") => value <= 0,
                    Some("JMP") => true,
                    Some(other) => panic!("not a Hack jump: {}", other),
                };
                // A as it was before this instruction wrote it
                self.pc = if taken { addr } else { self.pc + 1 };
            }
        }
    }

    /// Run off the end of the program.
    pub fn run(&mut self, max_steps: usize) {
        for _ in 0..max_steps {
            if self.pc >= self.program.len() {
                return;
            }
            self.step();
        }
        panic!("program did not finish in {} steps", max_steps);
    }

    /// Run until control reaches `label`.
    pub fn run_to(&mut self, label: &str, max_steps: usize) {
        let target = self
            .address_of(label)
            .unwrap_or_else(|| panic!("no label {}", label));
        for _ in 0..max_steps {
            if self.pc == target {
                return;
            }
            self.step();
        }
        panic!("never reached {} in {} steps", label, max_steps);
    }

    pub fn sp(&self) -> usize {
        self.ram[SP] as usize
    }

    pub fn top(&self) -> i16 {
        self.ram[self.sp() - 1]
    }
}

/// The register layout the book's test scripts start from.
pub fn with_segments(asm: &str) -> Machine {
    let mut machine = Machine::load(asm);
    machine.ram[SP] = 256;
    machine.ram[LCL] = 300;
    machine.ram[ARG] = 400;
    machine.ram[THIS] = 3000;
    machine.ram[THAT] = 3010;
    machine
}

/// Translate `source` as unit `Test`, insisting on a clean translation.
pub fn translate(source: &str) -> String {
    let unit = translate_source(source, "Test.vm", "Test", true).unwrap();
    assert!(unit.diagnostics.is_empty(), "{:?}", unit.diagnostics);
    String::from_utf8(unit.asm).unwrap()
}

/// Translate and run a top-level snippet from the standard segment layout.
pub fn run(source: &str) -> Machine {
    let mut machine = with_segments(&translate(source));
    machine.run(100_000);
    machine
}

/// Fresh empty directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vmil-{}-{}", std::process::id(), name));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
