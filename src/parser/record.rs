use serde::{Deserialize, Serialize};

/// Fields recovered from a composite benchmark name such as
/// `Default/70Enqueue30Dequeue/LinkedQ-100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecomposedName {
    pub method: String,
    pub source: String,
    /// `None` when the name carries a `-` suffix that is not a number.
    pub cpu: Option<u64>,
}

/// One row of `benchstat -csv` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub source: String,
    pub method: String,
    pub cpu: Option<u64>,
    pub time_per_op: f64,      // ns/op
    pub time_display: String,  // "%.2f" of time_per_op
    pub delta_percent: i64,
}

impl Record {
    pub fn new(name: DecomposedName, time_per_op: f64, delta_percent: i64) -> Self {
        Self {
            source: name.source,
            method: name.method,
            cpu: name.cpu,
            time_per_op,
            time_display: super::format_time(time_per_op),
            delta_percent,
        }
    }
}
