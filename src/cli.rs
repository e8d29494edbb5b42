use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::{AllocationConfig, RangePolicy, TieOrder, UnclassifiedPolicy};
use crate::constants::allocation::{
    DEFAULT_MAX_REBALANCE_ITERATIONS, DEFAULT_PRIORITY_MIN_GROUP_SIZE, DEFAULT_SEED,
    DEFAULT_WORKER_COUNT,
};
use crate::constants::classifier::DEFAULT_CATEGORY;
use crate::constants::columns::ASSIGNMENT;
use crate::pipeline::{DistributionReport, Distributor};
use crate::source::{CsvFileSource, write_csv, write_csv_to};
use crate::types::WorkerName;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TieOrderArg {
    Ascending,
    Seeded,
}

impl From<TieOrderArg> for TieOrder {
    fn from(value: TieOrderArg) -> Self {
        match value {
            TieOrderArg::Ascending => TieOrder::Ascending,
            TieOrderArg::Seeded => TieOrder::Seeded,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RangePolicyArg {
    LeastLoaded,
    ContiguousBlock,
}

impl From<RangePolicyArg> for RangePolicy {
    fn from(value: RangePolicyArg) -> Self {
        match value {
            RangePolicyArg::LeastLoaded => RangePolicy::LeastLoaded,
            RangePolicyArg::ContiguousBlock => RangePolicy::ContiguousBlock,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnclassifiedArg {
    Unassigned,
    Balance,
    Drop,
}

impl From<UnclassifiedArg> for UnclassifiedPolicy {
    fn from(value: UnclassifiedArg) -> Self {
        match value {
            UnclassifiedArg::Unassigned => UnclassifiedPolicy::Unassigned,
            UnclassifiedArg::Balance => UnclassifiedPolicy::Balance,
            UnclassifiedArg::Drop => UnclassifiedPolicy::Drop,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "distribute",
    disable_help_subcommand = true,
    about = "Distribute yard inventory rows across workers",
    long_about = "Read a CSV with identifier (CHASSI), lane (RUA) and slot (VAGA) columns, assign every row to a worker by lane range and model category, and write the table back with an assignment column.",
    after_help = "Without --output the distributed CSV is written to stdout and the load summary to stderr."
)]
/// CLI for `distribute`.
///
/// Common usage:
/// - `distribute --input yard.csv --workers 3 --names "Ana,Bruno,Caio" --output out.csv`
/// - Reproduce a seeded run: `--tie-order seeded --seed 7`
struct DistributeCli {
    #[arg(long, value_name = "PATH", help = "Input CSV with a header row")]
    input: PathBuf,
    #[arg(
        long,
        value_name = "PATH",
        help = "Output CSV path (stdout when omitted)"
    )]
    output: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = DEFAULT_WORKER_COUNT,
        value_parser = parse_positive_usize,
        help = "Number of workers"
    )]
    workers: usize,
    #[arg(
        long,
        value_name = "NAME,NAME,...",
        help = "Comma-separated worker names; missing names become 'Worker N'"
    )]
    names: Option<String>,
    #[arg(long, default_value_t = DEFAULT_SEED, help = "Seed for seeded tie orders")]
    seed: u64,
    #[arg(
        long = "tie-order",
        value_enum,
        default_value = "ascending",
        help = "Which workers receive the remainder of a balanced split"
    )]
    tie_order: TieOrderArg,
    #[arg(
        long = "range-policy",
        value_enum,
        default_value = "least-loaded",
        help = "How location-range groups are distributed"
    )]
    range_policy: RangePolicyArg,
    #[arg(
        long,
        value_enum,
        default_value = "unassigned",
        help = "Handling of rows with no lane range and no known model"
    )]
    unclassified: UnclassifiedArg,
    #[arg(
        long = "default-category",
        default_value = DEFAULT_CATEGORY,
        help = "Category distributed by lane range instead of the priority pass"
    )]
    default_category: String,
    #[arg(
        long = "priority-min-group-size",
        default_value_t = DEFAULT_PRIORITY_MIN_GROUP_SIZE,
        value_parser = parse_positive_usize,
        help = "Smallest category group handled by the priority pass"
    )]
    priority_min_group_size: usize,
    #[arg(
        long = "max-rebalance-iterations",
        default_value_t = DEFAULT_MAX_REBALANCE_ITERATIONS,
        help = "Iteration cap for the rebalance pass"
    )]
    max_rebalance_iterations: usize,
    #[arg(
        long,
        default_value = ",",
        value_parser = parse_delimiter,
        help = "Single-byte field delimiter for input and output"
    )]
    delimiter: u8,
    #[arg(
        long = "assignment-column",
        default_value = ASSIGNMENT,
        help = "Header of the appended assignment column"
    )]
    assignment_column: String,
    #[arg(long = "report-json", help = "Print the run summary as JSON")]
    report_json: bool,
}

impl DistributeCli {
    fn config(&self) -> AllocationConfig {
        let mut config = AllocationConfig {
            worker_count: self.workers,
            worker_names: self
                .names
                .as_deref()
                .map(parse_worker_names)
                .unwrap_or_default(),
            tie_order: self.tie_order.into(),
            range_policy: self.range_policy.into(),
            seed: self.seed,
            unclassified: self.unclassified.into(),
            default_category: self.default_category.trim().to_string(),
            priority_min_group_size: self.priority_min_group_size,
            max_rebalance_iterations: self.max_rebalance_iterations,
            ..AllocationConfig::default()
        };
        config.columns.assignment = self.assignment_column.clone();
        config
    }
}

/// Parse `args_iter` (without the program name) and run one distribution.
pub fn run_distribute<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let Some(cli) =
        parse_cli::<DistributeCli, _>(std::iter::once("distribute".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let distributor = Distributor::new(cli.config())?;
    let source = CsvFileSource::new(&cli.input).with_delimiter(cli.delimiter);
    let distribution = distributor.distribute_source(&source)?;

    let mut summary: Box<dyn Write> = match &cli.output {
        Some(path) => {
            write_csv(path, &distribution.table, cli.delimiter)?;
            Box::new(io::stdout())
        }
        None => {
            write_csv_to(io::stdout().lock(), &distribution.table, cli.delimiter)?;
            Box::new(io::stderr())
        }
    };

    let report = distribution.report();
    if cli.report_json {
        writeln!(summary, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        print_summary(&mut summary, &report)?;
    }
    Ok(())
}

fn print_summary(out: &mut dyn Write, report: &DistributionReport) -> io::Result<()> {
    writeln!(out, "=== distribution summary ===")?;
    writeln!(
        out,
        "rows: {} in, {} out ({} assigned, {} unclassified, {} dropped)",
        report.rows_in, report.rows_out, report.assigned, report.unclassified, report.dropped
    )?;
    writeln!(out)?;
    writeln!(out, "[LOAD PER WORKER]")?;
    let width = report
        .workers
        .iter()
        .map(|worker| worker.name.chars().count())
        .max()
        .unwrap_or(0);
    for worker in &report.workers {
        writeln!(out, "  {:<width$}  {}", worker.name, worker.load)?;
    }
    writeln!(out)?;
    if let Some(skew) = &report.skew {
        writeln!(
            out,
            "spread: {} (min={}, max={}, mean={:.2})",
            skew.spread, skew.min, skew.max, skew.mean
        )?;
    }
    writeln!(
        out,
        "rebalance: {:?} after {} move(s), residual spread {}",
        report.rebalance_outcome, report.rebalance_moves, report.residual_spread
    )?;
    Ok(())
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Could not parse '{}' as a positive integer", raw))?;
    if parsed == 0 {
        return Err("value must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_worker_names(raw: &str) -> Vec<WorkerName> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw.as_bytes() {
        [byte] => Ok(*byte),
        _ if raw == "\\t" => Ok(b'\t'),
        _ => Err(format!(
            "--delimiter expects a single ASCII character, got '{}'",
            raw
        )),
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
