// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use reunion_radio::{
    export_csv, export_workbook, render_chart, write_report, AudienceTable, GeneratorConfig,
    OutputPaths, RegistryFile, RunInfo, SeriesGenerator, StationRegistry, TrendRegistry,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthetic Réunion radio audience analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Seed for a reproducible series (omit for a fresh random one)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// JSON file replacing the built-in stations and trends
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Disable the yearly Gaussian noise
    #[arg(long, global = true)]
    no_noise: bool,

    /// Disable the 2008 / 2020 / 2021 shocks
    #[arg(long, global = true)]
    no_shocks: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate, print the report and write the PNG / XLSX / CSV files (default)
    Run {
        /// Directory for the output files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// Skip the PNG chart
        #[arg(long)]
        no_chart: bool,
    },
    /// Browse the generated table in a terminal dashboard
    Dashboard,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.command {
        Some(Command::Dashboard) => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        None => run_analysis(&cli, Path::new("."), false)?,
        Some(Command::Run { out_dir, no_chart }) => run_analysis(&cli, out_dir, *no_chart)?,
        Some(Command::Dashboard) => run_dashboard_mode(&cli)?,
    }

    Ok(())
}

fn load_registries(cli: &Cli) -> Result<(StationRegistry, TrendRegistry)> {
    match &cli.registry {
        Some(path) => {
            let file = RegistryFile::from_file(path)?;
            info!(path = %path.display(), stations = file.stations.len(), "registry loaded");
            Ok(file.into_registries())
        }
        None => Ok((StationRegistry::new(), TrendRegistry::new())),
    }
}

fn build_table(cli: &Cli) -> Result<AudienceTable> {
    let (stations, trends) = load_registries(cli)?;

    let mut config = GeneratorConfig::default();
    if cli.no_noise {
        config = config.without_noise();
    }
    if cli.no_shocks {
        config = config.without_shocks();
    }

    let generator = SeriesGenerator::new(&stations, &trends, config)?;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let series = generator.generate(&mut rng);
    AudienceTable::flatten(&series, &stations)
}

fn run_analysis(cli: &Cli, out_dir: &Path, no_chart: bool) -> Result<()> {
    println!("⏳ Generating simulated data...\n");

    let table = build_table(cli)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &table, &RunInfo::now(cli.seed))?;
    drop(out);

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;
    let paths = OutputPaths::in_dir(out_dir);

    println!();
    if !no_chart {
        render_chart(&table, &paths.chart)?;
        println!("🖼️  Chart saved to '{}'", paths.chart.display());
    }

    export_workbook(&table, &paths.workbook)?;
    println!("💾 Data exported to '{}'", paths.workbook.display());

    export_csv(&table, &paths.csv)?;
    println!("💾 Data saved to '{}'", paths.csv.display());

    println!("\n✅ Analysis complete!");
    Ok(())
}

#[cfg(feature = "tui")]
fn run_dashboard_mode(cli: &Cli) -> Result<()> {
    let table = build_table(cli)?;

    let mut app = ui::App::new(table);
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_dashboard_mode(_cli: &Cli) -> Result<()> {
    eprintln!("❌ Dashboard not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
