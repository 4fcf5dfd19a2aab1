use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tei_article::config::{
    default_config_path, find_config_file, get_config, load_config, Config, LogFormat,
};
use tei_article::utils::{write_records, ExportFormat};
use tei_article::{ArticleRecord, Converter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// TEI Article - Convert GROBID TEI XML into article records
#[derive(Parser, Debug)]
#[command(name = "tei-article")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Convert GROBID TEI XML into section-organized article records", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Record output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    /// Article text only
    Text,
    /// JSON array of records
    Json,
    /// CSV with a header row
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => ExportFormat::Text,
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert TEI documents into article records
    #[command(alias = "c")]
    Convert {
        /// TEI XML files produced by GROBID
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format (default: from config, else text)
        #[arg(long, short, value_enum)]
        format: Option<FormatArg>,

        /// Write one file per document into this directory instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Target path (default: user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let (config, config_path) = if let Some(config_path) = &cli.config {
        (load_config(config_path)?, Some(config_path.clone()))
    } else if let Some(config_path) = find_config_file() {
        (load_config(&config_path)?, Some(config_path))
    } else {
        (get_config()?, None)
    };

    init_tracing(&cli, &config);

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        Some(Commands::Convert {
            files,
            format,
            output,
        }) => {
            let format = format.map(ExportFormat::from).unwrap_or(config.output.format);
            let output = output.or_else(|| config.output.directory.clone());
            run_convert(&config, &files, format, output.as_deref())?;
        }

        Some(Commands::Config { action }) => match action {
            ConfigCommands::Init { path, force } => {
                let path = path
                    .or_else(default_config_path)
                    .context("Could not determine the user config directory")?;
                if path.exists() && !force {
                    anyhow::bail!(
                        "Config file already exists: {} (use --force to overwrite)",
                        path.display()
                    );
                }
                Config::create_default(&path)?;
                if !cli.quiet {
                    println!("Wrote default configuration to {}", path.display());
                }
            }
            ConfigCommands::Show => {
                print!("{}", config.to_toml()?);
            }
        },

        None => {
            // No command provided - show help
            println!("No command provided. Use --help for usage information.");
            println!("Common commands:");
            println!("  convert <files>...  - Convert TEI documents");
            println!("  config init         - Write a default config file");
            println!("  config show         - Print the effective configuration");
        }
    }

    Ok(())
}

/// Initialize tracing from verbosity flags, config and `RUST_LOG`
fn init_tracing(cli: &Cli, config: &Config) {
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tei_article={}", env_filter)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean for records
    let format = cli.log_format.map(LogFormat::from).unwrap_or(config.logging.format);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn run_convert(
    config: &Config,
    files: &[PathBuf],
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let converter = Converter::new(config.converter.clone());
    let mut records = Vec::new();
    let mut failed = 0;

    for file in files {
        match converter.convert_file(file) {
            Ok(record) => match output {
                Some(dir) => write_record_file(dir, file, &record, format)?,
                None => records.push(record),
            },
            Err(e) => {
                tracing::error!(path = %file.display(), error = %e, "Conversion failed");
                failed += 1;
            }
        }
    }

    if output.is_none() {
        write_records(&records, format, std::io::stdout().lock())?;
    }

    if failed > 0 {
        anyhow::bail!("{} of {} documents failed to convert", failed, files.len());
    }
    Ok(())
}

fn write_record_file(
    dir: &Path,
    source: &Path,
    record: &ArticleRecord,
    format: ExportFormat,
) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let stem = output_stem(record, source);
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    write_records(std::slice::from_ref(record), format, BufWriter::new(file))?;
    tracing::info!(path = %path.display(), "Wrote record");
    Ok(())
}

/// DOI-derived stem, falling back to the input file name without `.tei.xml`
fn output_stem(record: &ArticleRecord, source: &Path) -> String {
    record.export_stem().unwrap_or_else(|| {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "article".to_string());
        stem.trim_end_matches(".tei").to_string()
    })
}
