pub mod record;

use csv::{ReaderBuilder, StringRecord};

use record::*;
use crate::error::{BenchpivotError, Result};

/// Header row `benchstat -csv` writes for the time/op table.
pub const EXPECTED_HEADER: [&str; 3] = ["name", "time/op (ns/op)", "±"];

/// Split `<method>/<source>[-<cpu>]` into its parts.
///
/// A trailing `-1` is kept in the label: only suffixes other than 1 are
/// stripped, so `p/s-1` yields source `s-1` with cpu 1. A non-numeric suffix
/// leaves the name untouched and the cpu unset.
pub fn decompose_name(name: &str) -> Result<DecomposedName> {
    let mut stem = name;
    let cpu = match name.rfind('-') {
        Some(idx) => match name[idx + 1..].parse::<u64>() {
            Ok(cpu) => {
                if cpu != 1 {
                    stem = &name[..idx];
                }
                Some(cpu)
            }
            Err(_) => None,
        },
        None => Some(1),
    };

    match stem.rfind('/') {
        Some(idx) if idx + 1 < stem.len() => Ok(DecomposedName {
            method: stem[..idx].to_string(),
            source: stem[idx + 1..].to_string(),
            cpu,
        }),
        _ => Err(BenchpivotError::MalformedName(name.to_string())),
    }
}

/// Format ns/op the way the pivot table shows it.
pub fn format_time(time_per_op: f64) -> String {
    format!("{:.2}", time_per_op)
}

/// Parse a time/op cell, e.g. `1.00808E+02`.
pub fn parse_time_per_op(value: &str) -> Result<f64> {
    value.parse::<f64>().map_err(|_| BenchpivotError::MalformedNumber {
        field: "time/op",
        value: value.to_string(),
    })
}

/// Parse a delta cell, e.g. `3%`.
pub fn parse_delta(value: &str) -> Result<i64> {
    value
        .strip_suffix('%')
        .and_then(|digits| digits.parse::<i64>().ok())
        .ok_or_else(|| BenchpivotError::MalformedNumber {
            field: "delta",
            value: value.to_string(),
        })
}

/// Turn one `name,time/op,delta` row into a record.
pub fn parse_row<S: AsRef<str>>(fields: &[S]) -> Result<Record> {
    let [name, time, delta] = fields else {
        return Err(BenchpivotError::MalformedRow {
            line: 0,
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
        });
    };

    let name = decompose_name(name.as_ref())?;
    let time_per_op = parse_time_per_op(time.as_ref())?;
    let delta_percent = parse_delta(delta.as_ref())?;

    Ok(Record::new(name, time_per_op, delta_percent))
}

/// Parse a whole `benchstat -csv` table into records, in input order.
pub fn parse_table(input: &str) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_bytes());

    let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.len() < 2 {
        return Err(BenchpivotError::MalformedTable(format!(
            "too few lines: {}",
            rows.len()
        )));
    }

    let header = &rows[0];
    if !header.iter().eq(EXPECTED_HEADER) {
        return Err(BenchpivotError::MalformedTable(format!(
            "invalid first line: {}, want ({})",
            header.iter().collect::<Vec<_>>().join(","),
            EXPECTED_HEADER.join(",")
        )));
    }

    let mut records = Vec::with_capacity(rows.len() - 1);
    for row in &rows[1..] {
        if row.len() != EXPECTED_HEADER.len() {
            return Err(BenchpivotError::MalformedRow {
                line: line_of(row),
                fields: row.iter().map(str::to_string).collect(),
            });
        }
        let fields: Vec<&str> = row.iter().collect();
        records.push(parse_row(&fields[..])?);
    }

    tracing::debug!(records = records.len(), "parsed benchstat table");
    Ok(records)
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|pos| pos.line()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,time/op (ns/op),±\n";

    #[test]
    fn strips_cpu_suffix() {
        let name = decompose_name("Default/70Enqueue30Dequeue/LinkedQ-100").unwrap();
        assert_eq!(name.method, "Default/70Enqueue30Dequeue");
        assert_eq!(name.source, "LinkedQ");
        assert_eq!(name.cpu, Some(100));
    }

    #[test]
    fn no_suffix_defaults_to_one_cpu() {
        let name = decompose_name("Default/Enqueue/LinkedQ").unwrap();
        assert_eq!(name.method, "Default/Enqueue");
        assert_eq!(name.source, "LinkedQ");
        assert_eq!(name.cpu, Some(1));
    }

    #[test]
    fn suffix_of_one_stays_in_label() {
        let name = decompose_name("Default/Enqueue/LinkedQ-1").unwrap();
        assert_eq!(name.source, "LinkedQ-1");
        assert_eq!(name.method, "Default/Enqueue");
        assert_eq!(name.cpu, Some(1));
    }

    #[test]
    fn non_numeric_suffix_leaves_name_alone() {
        let name = decompose_name("Default/Enqueue/Linked-Q").unwrap();
        assert_eq!(name.source, "Linked-Q");
        assert_eq!(name.method, "Default/Enqueue");
        assert_eq!(name.cpu, None);

        // The last '-' may sit before the last '/'.
        let name = decompose_name("Mix-A/Queue").unwrap();
        assert_eq!(name.method, "Mix-A");
        assert_eq!(name.source, "Queue");
        assert_eq!(name.cpu, None);
    }

    #[test]
    fn zero_cpu_is_stripped() {
        let name = decompose_name("m/s-0").unwrap();
        assert_eq!(name.source, "s");
        assert_eq!(name.cpu, Some(0));
    }

    #[test]
    fn rejects_names_without_source() {
        assert!(matches!(
            decompose_name("LinkedQ-100"),
            Err(BenchpivotError::MalformedName(_))
        ));
        assert!(matches!(
            decompose_name("Default/"),
            Err(BenchpivotError::MalformedName(_))
        ));
        // Stripping "-8" leaves a trailing '/'.
        assert!(matches!(
            decompose_name("Default/-8"),
            Err(BenchpivotError::MalformedName(_))
        ));
    }

    #[test]
    fn formats_two_decimals() {
        assert_eq!(format_time(100.808), "100.81");
        assert_eq!(format_time(32.2), "32.20");
        assert_eq!(format_time(150.0), "150.00");
    }

    #[test]
    fn parses_numbers() {
        assert_eq!(parse_time_per_op("1.00808E+02").unwrap(), 100.808);
        assert_eq!(parse_time_per_op("42").unwrap(), 42.0);
        assert!(parse_time_per_op("fast").is_err());

        assert_eq!(parse_delta("3%").unwrap(), 3);
        assert_eq!(parse_delta("0%").unwrap(), 0);
        assert!(matches!(
            parse_delta("3"),
            Err(BenchpivotError::MalformedNumber { field: "delta", .. })
        ));
        assert!(parse_delta("x%").is_err());
        assert!(parse_delta("").is_err());
    }

    #[test]
    fn parses_row() {
        let record = parse_row(&["Default/70Enqueue30Dequeue/ArrayQ-100", "1.50000E+02", "5%"]).unwrap();
        assert_eq!(record.source, "ArrayQ");
        assert_eq!(record.method, "Default/70Enqueue30Dequeue");
        assert_eq!(record.cpu, Some(100));
        assert_eq!(record.time_per_op, 150.0);
        assert_eq!(record.time_display, "150.00");
        assert_eq!(record.delta_percent, 5);
    }

    #[test]
    fn parses_table_in_order() {
        let input = format!(
            "{}{}{}",
            HEADER,
            "Default/70Enqueue30Dequeue/LinkedQ-100,1.00808E+02,3%\n",
            "Default/70Enqueue30Dequeue/ArrayQ-100,1.50000E+02,5%\n"
        );
        let records = parse_table(&input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, "LinkedQ");
        assert_eq!(records[0].time_display, "100.81");
        assert_eq!(records[1].source, "ArrayQ");
    }

    #[test]
    fn rejects_short_table() {
        assert!(matches!(
            parse_table(HEADER),
            Err(BenchpivotError::MalformedTable(_))
        ));
        assert!(matches!(parse_table(""), Err(BenchpivotError::MalformedTable(_))));
    }

    #[test]
    fn rejects_bad_header_before_rows() {
        // The data row is malformed too, the header must win.
        let input = "name,time,±\nnot-a-name,x,y\n";
        assert!(matches!(
            parse_table(input),
            Err(BenchpivotError::MalformedTable(_))
        ));
    }

    #[test]
    fn rejects_row_with_two_fields() {
        let input = format!("{}m/a-4,1.0,1%\nm/b-4,2.0\nm/c-4,3.0,1%\n", HEADER);
        match parse_table(&input) {
            Err(BenchpivotError::MalformedRow { line, fields }) => {
                assert_eq!(line, 3);
                assert_eq!(fields, vec!["m/b-4", "2.0"]);
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn first_bad_value_aborts() {
        let input = format!("{}m/a-4,1.0,1%\nm/b-4,slow,1%\n", HEADER);
        assert!(matches!(
            parse_table(&input),
            Err(BenchpivotError::MalformedNumber { field: "time/op", .. })
        ));

        let input = format!("{}nosource,1.0,1%\n", HEADER);
        assert!(matches!(
            parse_table(&input),
            Err(BenchpivotError::MalformedName(_))
        ));
    }
}
