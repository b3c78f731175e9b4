use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchpivotError {
    #[error("Subprocess error: `{command}` {reason}")]
    Subprocess { command: String, reason: String },

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Malformed row at line {line}: expected 3 fields, got {fields:?}")]
    MalformedRow { line: u64, fields: Vec<String> },

    #[error("Malformed name: {0}")]
    MalformedName(String),

    #[error("Malformed number in {field}: {value:?}")]
    MalformedNumber { field: &'static str, value: String },

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BenchpivotError>;

impl BenchpivotError {
    pub fn display_friendly(&self) -> String {
        match self {
            BenchpivotError::MalformedTable(msg) => {
                format!(
                    "Malformed table: {}\nExpected `benchstat -csv` output starting with: name,time/op (ns/op),±",
                    msg
                )
            }
            BenchpivotError::MalformedName(name) => {
                format!(
                    "Malformed benchmark name '{}'.\nNames must look like <method>/<source>[-<cpu>].",
                    name
                )
            }
            BenchpivotError::MissingArgument(msg) => {
                format!("{}\nUsage: benchpivot [OPTIONS] <BENCH_FILE>", msg)
            }
            BenchpivotError::Subprocess { command, reason } => {
                format!(
                    "Running `{}` {}\nIs benchstat installed? Use --benchstat or --csv otherwise.",
                    command, reason
                )
            }
            _ => self.to_string(),
        }
    }
}
