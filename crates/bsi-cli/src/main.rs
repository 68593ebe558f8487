//! BSI reconciliation CLI
//!
//! Command-line tool for reconciling payroll, worked-days and HR exports
//! into one record per employee.

use bsi_core::{
    discover_sources, load_table, locate_ledger_columns, Category, Error, MatchPolicy,
    PersonRegistry, Reconciliation, ReconcileInput, Reconciler, ReconcilerOptions, Vocabulary,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bsi-cli")]
#[command(about = "Employee payroll record reconciliation", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the three sources into per-employee records
    Reconcile {
        /// Compensation ledger (CSV or spreadsheet)
        #[arg(short, long)]
        money: PathBuf,

        /// Worked-days ledger
        #[arg(short, long)]
        days: PathBuf,

        /// HR description files, merged in the order given
        #[arg(long = "description")]
        descriptions: Vec<PathBuf>,

        /// Directory whose files are appended to the description list
        #[arg(long)]
        description_dir: Option<PathBuf>,

        /// TOML vocabulary overriding the built-in one
        #[arg(long)]
        vocabulary: Option<PathBuf>,

        /// Require an unambiguous name match instead of first match wins
        #[arg(long)]
        strict_matching: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a single file and print its first rows
    Inspect {
        /// Path to a CSV or spreadsheet file
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum number of rows to display
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the located ledger columns and the registered employees
    Headers {
        /// Compensation ledger
        #[arg(short, long)]
        file: PathBuf,

        /// TOML vocabulary overriding the built-in one
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },

    /// Write the built-in vocabulary as a TOML template
    Vocabulary {
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the source files found under a directory
    Discover {
        /// Directory to walk
        #[arg(short, long)]
        dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays clean for records and JSON
fn init_logging(verbose: bool) {
    let default = if verbose {
        "bsi_core=debug,bsi_cli=debug"
    } else {
        "bsi_core=info,bsi_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> bsi_core::Result<()> {
    match cli.command {
        Commands::Reconcile {
            money,
            days,
            descriptions,
            description_dir,
            vocabulary,
            strict_matching,
            format,
            output,
        } => {
            let mut descriptions = descriptions;
            if let Some(dir) = description_dir {
                descriptions.extend(discover_sources(dir)?);
            }
            let input = ReconcileInput {
                compensation: money,
                worked_days: days,
                descriptions,
            };
            let policy = if strict_matching {
                MatchPolicy::Strict
            } else {
                MatchPolicy::Greedy
            };
            cmd_reconcile(&input, vocabulary.as_deref(), policy, format, output.as_deref())
        }
        Commands::Inspect { file, limit } => cmd_inspect(&file, limit),
        Commands::Headers { file, vocabulary } => cmd_headers(&file, vocabulary.as_deref()),
        Commands::Vocabulary { output } => cmd_vocabulary(output.as_deref()),
        Commands::Discover { dir } => cmd_discover(&dir),
    }
}

fn load_vocabulary(path: Option<&Path>) -> bsi_core::Result<Vocabulary> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "using custom vocabulary");
            Vocabulary::load(path)
        }
        None => Ok(Vocabulary::default()),
    }
}

/// Stdout or a buffered file
fn open_output(output: Option<&Path>) -> bsi_core::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn cmd_reconcile(
    input: &ReconcileInput,
    vocabulary: Option<&Path>,
    match_policy: MatchPolicy,
    format: OutputFormat,
    output: Option<&Path>,
) -> bsi_core::Result<()> {
    let reconciler = Reconciler::with_options(
        load_vocabulary(vocabulary)?,
        ReconcilerOptions { match_policy },
    );

    let reconciliation = reconciler.reconcile(input)?;
    if reconciliation.is_empty() {
        return Err(Error::EmptySource);
    }

    let mut writer = open_output(output)?;
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reconciliation)?;
            writeln!(writer, "{}", json)?;
        }
        OutputFormat::Table => write_records(&mut writer, &reconciliation)?,
    }
    writer.flush()?;

    if let Some(path) = output {
        println!(
            "Wrote {} employees to {}",
            reconciliation.len(),
            path.display()
        );
    }

    Ok(())
}

fn write_records(writer: &mut dyn Write, reconciliation: &Reconciliation) -> io::Result<()> {
    for record in reconciliation.iter() {
        writeln!(writer, "{} [{}]", record.official_name, record.canonical_key)?;
        writeln!(
            writer,
            "  forfait jours: {}",
            if record.forfait_jours { "yes" } else { "no" }
        )?;
        match record.worked_days {
            Some(days) => writeln!(writer, "  worked days:   {}", days)?,
            None => writeln!(writer, "  worked days:   -")?,
        }

        let description = &record.description;
        writeln!(writer, "  job title:     {}", description.job_title)?;
        writeln!(writer, "  seniority:     {}", description.seniority)?;
        writeln!(writer, "  arrival date:  {}", description.arrival_date)?;
        writeln!(writer, "  contract:      {}", description.contract_type)?;

        for category in Category::ALL {
            let total = record.category_total(category);
            writeln!(
                writer,
                "  {:<22} {:>12.2} {:>12.2}",
                category.name(),
                total.salarial,
                total.patronal
            )?;
        }
        writeln!(writer)?;
    }

    let summary = &reconciliation.summary;
    writeln!(
        writer,
        "{} employees, {} on forfait jours",
        summary.persons_registered, summary.forfait_jours_count
    )?;
    writeln!(
        writer,
        "worked-days rows: {} matched, {} unmatched; description rows: {} matched, {} unmatched; {} ambiguous",
        summary.days_rows_matched,
        summary.days_rows_unmatched,
        summary.description_rows_matched,
        summary.description_rows_unmatched,
        summary.ambiguous_rows
    )?;

    Ok(())
}

fn cmd_inspect(file: &Path, limit: usize) -> bsi_core::Result<()> {
    let table = load_table(file)?;

    println!("File: {}", file.display());
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    for (i, row) in table.rows.iter().take(limit).enumerate() {
        println!("{:>4}: {}", i, row.join("\t"));
    }

    if table.row_count() > limit {
        println!("... ({} more rows)", table.row_count() - limit);
    }

    Ok(())
}

fn cmd_headers(file: &Path, vocabulary: Option<&Path>) -> bsi_core::Result<()> {
    let vocabulary = load_vocabulary(vocabulary)?;
    let table = load_table(file)?;

    let columns = locate_ledger_columns(&table, &vocabulary.ledger)?;
    println!("Code column:        {}", columns.code);
    println!("Label column:       {}", columns.label);
    println!("Value block starts: {}", columns.value_start);
    println!();

    let registry = PersonRegistry::from_ledger(&table, &vocabulary.ledger);
    println!("Employees ({}):", registry.len());
    for (group, &person) in registry.groups().iter().enumerate() {
        let entry = &registry.persons()[person];
        println!(
            "  group {:>3} (column {:>3}): {} [{}]",
            group,
            columns.value_start + group * bsi_core::money::GROUP_WIDTH,
            entry.official_name,
            entry.canonical_key
        );
    }

    Ok(())
}

fn cmd_vocabulary(output: Option<&Path>) -> bsi_core::Result<()> {
    let template = Vocabulary::default().to_toml_string()?;

    let mut writer = open_output(output)?;
    write!(writer, "{}", template)?;
    writer.flush()?;

    if let Some(path) = output {
        println!("Created vocabulary template: {}", path.display());
    }

    Ok(())
}

fn cmd_discover(dir: &Path) -> bsi_core::Result<()> {
    let files = discover_sources(dir)?;

    println!("Found {} source file(s) in {}:", files.len(), dir.display());
    for (i, file) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, file.display());
    }

    Ok(())
}
