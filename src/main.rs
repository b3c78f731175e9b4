use anyhow::Context;
use benchpivot::{benchstat, BenchpivotError, Benchstat, Input, PivotConfig};
use clap::{Parser, ValueEnum};
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "benchpivot")]
#[command(about = "Pivot benchstat output into a source x method table", long_about = None)]
#[command(version)]
struct Cli {
    /// Benchmark output to feed to benchstat
    #[arg(value_name = "BENCH_FILE")]
    bench_file: Option<PathBuf>,

    /// Filter cpu numbers (-1 disables)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    cpu: i64,

    /// Filter method name
    #[arg(long, default_value = "")]
    method: String,

    /// Remove prefix string from method names
    #[arg(long, default_value = "")]
    prefix: String,

    /// BENCH_FILE is already `benchstat -csv` output ("-" for stdin)
    #[arg(long)]
    csv: bool,

    /// benchstat executable
    #[arg(long, value_name = "PROGRAM", env = "BENCHSTAT", default_value = benchstat::DEFAULT_PROGRAM)]
    benchstat: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let msg = match err.downcast_ref::<BenchpivotError>() {
                Some(e) => e.display_friendly(),
                None => format!("{:#}", err),
            };
            eprintln!("{} {}", "error:".red().bold(), msg);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("benchpivot={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let bench_file = cli
        .bench_file
        .ok_or_else(|| BenchpivotError::MissingArgument("need bench file".to_string()))?;

    let input = if cli.csv {
        Input::Csv(bench_file)
    } else {
        Input::Benchstat {
            runner: Benchstat::new(cli.benchstat),
            bench_file,
        }
    };
    let config = PivotConfig::from_cli(cli.cpu, &cli.method, &cli.prefix);
    tracing::debug!(?config, "pivot configuration");

    let table = benchpivot::pivot(&input, &config)?;
    let rendered = match cli.format {
        Format::Text => table.render(),
        Format::Json => {
            let mut json = table.to_json().map_err(BenchpivotError::from)?;
            json.push('\n');
            json
        }
    };

    if let Some(output_path) = cli.output {
        std::fs::write(&output_path, rendered)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        tracing::debug!(path = %output_path.display(), "output written");
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(rendered.as_bytes())
            .context("failed to write to stdout")?;
        stdout.flush().context("failed to write to stdout")?;
    }

    Ok(())
}
