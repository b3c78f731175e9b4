use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use crate::parser::record::Record;

/// Filters applied before pivoting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotConfig {
    /// Keep only records with exactly this cpu count.
    pub cpu_filter: Option<u64>,
    /// Keep only records whose untrimmed method equals this.
    pub method_filter: Option<String>,
    /// Stripped from the start of every surviving method.
    pub removed_prefix: Option<String>,
}

impl PivotConfig {
    /// Build from raw CLI values, where a negative cpu or an empty string
    /// means "disabled".
    pub fn from_cli(cpu: i64, method: &str, prefix: &str) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            cpu_filter: u64::try_from(cpu).ok(),
            method_filter: non_empty(method),
            removed_prefix: non_empty(prefix),
        }
    }

    fn keeps(&self, record: &Record) -> bool {
        if let Some(cpu) = self.cpu_filter {
            if record.cpu != Some(cpu) {
                return false;
            }
        }
        if let Some(method) = &self.method_filter {
            if record.method != *method {
                return false;
            }
        }
        true
    }

    fn trim(&self, record: &mut Record) {
        if let Some(prefix) = &self.removed_prefix {
            if let Some(rest) = record.method.strip_prefix(prefix.as_str()) {
                record.method = rest.to_string();
            }
        }
    }
}

/// Set that remembers insertion order.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Returns false if the value was already present.
    pub fn insert(&mut self, value: T) -> bool {
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    pub fn contains(&self, value: &T) -> bool {
        self.seen.contains(value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Eq + Hash + Clone> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

/// Filtered records pivoted into sources (rows) by methods (columns).
#[derive(Debug, Clone)]
pub struct PivotTable {
    records: Vec<Record>,
    methods: OrderedSet<String>,
    sources: OrderedSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotCell {
    pub method: String,
    pub time_per_op: f64,
    pub time_display: String,
    pub delta_percent: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub source: String,
    pub cells: Vec<PivotCell>,
}

#[derive(Serialize)]
struct PivotDocument<'a> {
    methods: &'a [String],
    rows: Vec<PivotRow>,
}

impl PivotTable {
    /// Filter on cpu, then on the original method, then trim the prefix.
    /// Row and column order follow first occurrence in the filtered records.
    pub fn build(records: Vec<Record>, config: &PivotConfig) -> Self {
        let total = records.len();
        let mut filtered = Vec::with_capacity(total);

        for mut record in records {
            if !config.keeps(&record) {
                continue;
            }
            config.trim(&mut record);
            filtered.push(record);
        }

        let methods: OrderedSet<String> = filtered.iter().map(|r| r.method.clone()).collect();
        let sources: OrderedSet<String> = filtered.iter().map(|r| r.source.clone()).collect();

        tracing::debug!(
            total,
            kept = filtered.len(),
            methods = methods.len(),
            sources = sources.len(),
            "built pivot table"
        );

        Self {
            records: filtered,
            methods,
            sources,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn methods(&self) -> &[String] {
        self.methods.as_slice()
    }

    pub fn sources(&self) -> &[String] {
        self.sources.as_slice()
    }

    /// First record for the pair; later duplicates are ignored.
    pub fn cell(&self, source: &str, method: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.source == source && r.method == method)
    }

    /// Rows with the cells that have a value. Missing cells are skipped.
    pub fn rows(&self) -> Vec<PivotRow> {
        self.sources
            .iter()
            .map(|source| PivotRow {
                source: source.clone(),
                cells: self
                    .methods
                    .iter()
                    .filter_map(|method| self.cell(source, method))
                    .map(|r| PivotCell {
                        method: r.method.clone(),
                        time_per_op: r.time_per_op,
                        time_display: r.time_display.clone(),
                        delta_percent: r.delta_percent,
                    })
                    .collect(),
            })
            .collect()
    }

    /// Space separated text: a header of methods, then one line per source.
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&PivotDocument {
            methods: self.methods(),
            rows: self.rows(),
        })
    }
}

impl fmt::Display for PivotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.methods().join(" "))?;
        for row in self.rows() {
            write!(f, "{}", row.source)?;
            for cell in &row.cells {
                write!(f, " {}", cell.time_display)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
