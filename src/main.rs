use std::{env, path::PathBuf};

use aeroperf::runner::AnalysisRun;
use anyhow::Result;
use clap::Parser;

/// Aircraft performance curves: thrust required, minimum-drag airspeed and
/// Mach behaviour for every model of a geometry/mass table.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Aircraft table (CSV)
    #[arg(long, default_value = "data/airplane.csv")]
    data: PathBuf,

    /// Run configuration (TOML); built-in defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chart output directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        unsafe { env::set_var("RUST_LOG", "info") }
    }

    pretty_env_logger::init();

    let cli = Cli::parse();

    let out_dir = cli.out_dir.unwrap_or_else(|| {
        let mut out_dir = PathBuf::from("out");
        out_dir.push(chrono::Local::now().format("%Y_%m_%d_%H-%M-%S").to_string());
        out_dir
    });

    let run = AnalysisRun::new(&cli.data, cli.config.as_deref(), out_dir)?;
    run.run()?;

    Ok(())
}
