use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{BenchpivotError, Result};

pub const DEFAULT_PROGRAM: &str = "benchstat";

/// Runs `benchstat -csv <file>` and hands back its stdout.
#[derive(Debug, Clone)]
pub struct Benchstat {
    program: String,
}

impl Benchstat {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn run(&self, bench_file: &Path) -> Result<String> {
        let command = format!("{} -csv {}", self.program, bench_file.display());
        tracing::debug!(%command, "running benchstat");

        let output = Command::new(&self.program)
            .arg("-csv")
            .arg(bench_file)
            .output()
            .map_err(|e| BenchpivotError::Subprocess {
                command: command.clone(),
                reason: format!("could not be started: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BenchpivotError::Subprocess {
                command,
                reason: format!("failed ({}): {}", output.status, stderr.trim()),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| BenchpivotError::Subprocess {
            command,
            reason: "wrote non UTF-8 output".to_string(),
        })
    }
}

impl Default for Benchstat {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// Read an existing `benchstat -csv` table. `-` reads stdin.
pub fn read_csv(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Where the benchmark table comes from.
#[derive(Debug, Clone)]
pub enum Input {
    /// Raw `go test -bench` output piped through benchstat.
    Benchstat { runner: Benchstat, bench_file: PathBuf },
    /// A table benchstat already produced.
    Csv(PathBuf),
}

impl Input {
    /// Buffer the whole table in memory.
    pub fn load(&self) -> Result<String> {
        match self {
            Input::Benchstat { runner, bench_file } => runner.run(bench_file),
            Input::Csv(path) => read_csv(path),
        }
    }
}
