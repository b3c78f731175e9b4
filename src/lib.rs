pub mod benchstat;
pub mod error;
pub mod parser;
pub mod table;

pub use benchstat::{Benchstat, Input};
pub use error::{BenchpivotError, Result};
pub use parser::{decompose_name, parse_table};
pub use parser::record::{DecomposedName, Record};
pub use table::{PivotConfig, PivotTable};

/// Load the input, parse it and pivot it.
pub fn pivot(input: &Input, config: &PivotConfig) -> Result<PivotTable> {
    let content = input.load()?;
    let records = parse_table(&content)?;
    Ok(PivotTable::build(records, config))
}
