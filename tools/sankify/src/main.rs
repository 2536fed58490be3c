/// Land-cover change Sankey builder: reads a CSV sample table (one column per
/// time step) and writes plotly figure JSON or the raw node/link arrays.
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;

use sankee_core::scheme::{resolve_scheme, summary};
use sankee_core::{
    sankify_data, figure, ClassCode, ClassificationScheme, SampleTable, SankifyConfig, SchemeName,
};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sankify", about = "Build Sankey diagrams of land-cover change from sampled points")]
struct Args {
    /// Log pipeline details (debug level). RUST_LOG overrides.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reshape a sample table into a Sankey figure.
    Run(RunArgs),
    /// List the built-in classification schemes.
    Schemes,
    /// Print the classes of one built-in scheme.
    Scheme {
        /// Scheme name, e.g. NLCD2016.
        name: String,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// CSV sample table; header row holds the time-step labels.
    #[arg(short, long)]
    input: PathBuf,

    /// Built-in scheme name (see `sankify schemes`).
    #[arg(short, long)]
    scheme: Option<String>,

    /// JSON object mapping class codes to labels (custom scheme).
    #[arg(long, requires = "palette")]
    labels: Option<PathBuf>,

    /// JSON object mapping class codes to hex colours (custom scheme).
    #[arg(long, requires = "labels")]
    palette: Option<PathBuf>,

    /// JSON `SankifyConfig`; flags below override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Class codes to remove, comma separated.
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<ClassCode>,

    /// Keep only the N most frequent classes.
    #[arg(long)]
    max_classes: Option<usize>,

    /// Figure title.
    #[arg(short, long)]
    title: Option<String>,

    /// Keep rows with missing values instead of dropping them.
    #[arg(long)]
    keep_missing: bool,

    #[arg(short, long, value_enum, default_value = "figure")]
    format: OutputFormat,

    /// Output JSON path (stdout when omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Plotly figure JSON.
    Figure,
    /// Parallel node/link arrays.
    Data,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
    builder.parse_default_env();
    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    let _ = builder.try_init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn load_scheme(args: &RunArgs) -> Result<ClassificationScheme> {
    let named = args
        .scheme
        .as_deref()
        .map(str::parse::<SchemeName>)
        .transpose()?;
    let labels: Option<BTreeMap<ClassCode, String>> =
        args.labels.as_deref().map(read_json).transpose()?;
    let palette: Option<BTreeMap<ClassCode, String>> =
        args.palette.as_deref().map(read_json).transpose()?;
    Ok(resolve_scheme(named, None, labels, palette)?)
}

/// File config first, then explicit flags.
fn load_config(args: &RunArgs) -> Result<SankifyConfig> {
    let mut config: SankifyConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => SankifyConfig::default(),
    };
    if !args.exclude.is_empty() {
        config.exclude = args.exclude.clone();
    }
    if args.max_classes.is_some() {
        config.max_classes = args.max_classes;
    }
    if args.title.is_some() {
        config.title = args.title.clone();
    }
    Ok(config)
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Write failed: {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

// ── Commands ─────────────────────────────────────────────────────────────────

fn run(args: &RunArgs) -> Result<()> {
    let scheme = load_scheme(args)?;
    let config = load_config(args)?;

    let file = fs::File::open(&args.input)
        .with_context(|| format!("Cannot open {}", args.input.display()))?;
    let mut table = SampleTable::read_csv(file)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    if !args.keep_missing {
        table = table.drop_missing();
    }
    log::info!(
        "[sankify] {} points over time steps {:?}, scheme {}",
        table.n_rows(),
        table.column_names(),
        scheme.name
    );

    let data = sankify_data(&table, &scheme, &config)?;
    match args.format {
        OutputFormat::Data => write_json(&data, args.output.as_deref()),
        OutputFormat::Figure => {
            let fig = figure(&data, config.title.as_deref(), &config.style);
            write_json(&fig, args.output.as_deref())
        }
    }
}

fn print_schemes() -> Result<()> {
    let mut stdout = io::stdout().lock();
    for scheme in SchemeName::all() {
        writeln!(
            stdout,
            "{:<16} {:<46} {:<24} {} classes",
            scheme.name,
            scheme.collection_id,
            scheme.band,
            scheme.labels.len()
        )?;
    }
    Ok(())
}

fn print_scheme(name: &str) -> Result<()> {
    let name: SchemeName = name.parse()?;
    let mut stdout = io::stdout().lock();
    for row in summary(&name.scheme()) {
        writeln!(stdout, "{:>4}  {}  {}", row.id, row.color, row.label)?;
    }
    Ok(())
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Command::Run(run_args) => {
            if run_args.scheme.is_some() && run_args.labels.is_some() {
                bail!("--scheme and --labels/--palette are mutually exclusive");
            }
            run(run_args)
        }
        Command::Schemes => print_schemes(),
        Command::Scheme { name } => print_scheme(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["sankify", "run", "--input", "samples.csv"];
        argv.extend_from_slice(extra);
        match Args::parse_from(argv).command {
            Command::Run(run_args) => run_args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn exclude_accepts_comma_list() {
        let args = run_args(&["--exclude", "11,12", "--max-classes", "4"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.exclude, vec![11, 12]);
        assert_eq!(config.max_classes, Some(4));
        assert_eq!(args.format, OutputFormat::Figure);
    }

    #[test]
    fn named_scheme_loads() {
        let args = run_args(&["--scheme", "MODIS_LC_TYPE3"]);
        assert_eq!(load_scheme(&args).unwrap().band, "LC_Type3");
    }

    #[test]
    fn missing_scheme_is_an_error() {
        let args = run_args(&[]);
        assert!(load_scheme(&args).is_err());
    }

    #[test]
    fn labels_require_palette() {
        let argv = ["sankify", "run", "--input", "x.csv", "--labels", "l.json"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
