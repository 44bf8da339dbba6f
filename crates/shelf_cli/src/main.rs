//! Shelf CLI — command-line tools for the extended-Bookshelf interchange
//! format.
//!
//! Provides `shelf report` for design statistics, `shelf check` for
//! cross-file validation, and `shelf sitemap` / `shelf fixed` for
//! rendering the device floorplan and the fixed-instance overlay.

#![warn(missing_docs)]

mod bundle;
mod check;
mod fixed;
mod report;
mod sitemap;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use shelf_model::Dialect;

/// Shelf: tools for the extended-Bookshelf placement interchange format.
#[derive(Parser, Debug)]
#[command(name = "shelf", version, about = "Extended-Bookshelf interchange toolkit")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print extra detail while loading.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML dialect file overriding the format's token
    /// vocabulary.
    #[arg(long, global = true)]
    pub dialect: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print statistics for a design bundle.
    Report(ReportArgs),
    /// Parse a design bundle and report every consistency finding.
    Check(CheckArgs),
    /// Render the device floorplan from a `.scl` file.
    Sitemap(SitemapArgs),
    /// Render the fixed instances of a design bundle.
    Fixed(FixedArgs),
}

/// Arguments for the `shelf report` subcommand.
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Directory containing the design bundle (`.aux` plus members).
    pub dir: String,

    /// Output format for the report.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the `shelf check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Directory containing the design bundle.
    pub dir: String,
}

/// Arguments for the `shelf sitemap` subcommand.
#[derive(Parser, Debug)]
pub struct SitemapArgs {
    /// The `.scl` layout file to render.
    pub scl: String,

    /// Output PNG path (default: `<stem>_sitemap.png`).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Pixels per site.
    #[arg(long)]
    pub cell_size: Option<u32>,

    /// Suppress per-site grid lines.
    #[arg(long)]
    pub no_grid_lines: bool,
}

/// Arguments for the `shelf fixed` subcommand.
#[derive(Parser, Debug)]
pub struct FixedArgs {
    /// Directory containing the design bundle.
    pub dir: String,

    /// Output PNG path (default: `<design>_fixed.png`).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Pixels per site.
    #[arg(long)]
    pub cell_size: Option<u32>,

    /// Suppress per-site grid lines.
    #[arg(long)]
    pub no_grid_lines: bool,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print extra loading detail.
    pub verbose: bool,
    /// The format dialect in effect.
    pub dialect: Dialect,
}

fn main() {
    let cli = Cli::parse();

    let dialect = match &cli.dialect {
        Some(path) => match Dialect::load(Path::new(path)) {
            Ok(dialect) => dialect,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        None => Dialect::default(),
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        dialect,
    };

    let result = match cli.command {
        Command::Report(ref args) => report::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
        Command::Sitemap(ref args) => sitemap::run(args, &global),
        Command::Fixed(ref args) => fixed::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
