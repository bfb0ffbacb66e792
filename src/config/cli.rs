use clap::Parser;

/// Command line arguments; every flag overrides the TOML file.
#[derive(Debug, Clone, Parser)]
#[command(name = "alarm-mapper")]
#[command(about = "Preview how vendor SCADA alarms map onto canonical alarm events")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Connector type (ignition, factorytalk, wincc, plant_scada)
    #[arg(long)]
    pub vendor: Option<String>,

    /// Read raw records from this JSON file instead of the configured source
    #[arg(short, long)]
    pub input: Option<String>,

    /// Raw field filter as field=value, may be repeated
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Output formats (json, csv, loki)
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print the preview to stdout instead of writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
