use clap::Parser;
use env_logger::{Builder, Env};
use gpshow::gp::kernels::KernelKind;
use gpshow::{run_showcase, save_npy, save_series, write_series, ShowcaseConfig};
use log::info;
use std::path::PathBuf;

/// Compute GP prior, posterior and noisy posterior panels for several kernels
/// and export them as (x, y, series_id) JSON series
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file, defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output JSON file, series are written to stdout if omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Kernel to run (repeatable), one of squared_exp, rational_quadratic,
    /// periodic, locally_periodic, linear, cos
    #[arg(short, long)]
    kernel: Vec<KernelKind>,
    /// Random seed of sample paths
    #[arg(short, long)]
    seed: Option<u64>,
    /// Number of sample paths per panel
    #[arg(short, long)]
    n_samples: Option<usize>,
    /// Directory where mean, covariance and samples are also saved as npy files
    #[arg(long)]
    npy_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let env = Env::new().filter_or("GPSHOW_LOG", "info");
    let mut builder = Builder::from_env(env);
    let builder = builder.target(env_logger::Target::Stderr);
    builder.try_init().ok();

    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => ShowcaseConfig::from_file(path)?,
        None => ShowcaseConfig::default(),
    };
    if !args.kernel.is_empty() {
        config = config.kernels(&args.kernel);
    }
    if let Some(seed) = args.seed {
        config = config.seed(seed);
    }
    if let Some(n_samples) = args.n_samples {
        config = config.n_samples(n_samples);
    }

    let panels = run_showcase(&config)?;
    match args.output {
        Some(path) => {
            save_series(&panels, &path)?;
            info!("Series of {} panels saved in {}", panels.len(), path.display());
        }
        None => write_series(&panels, std::io::stdout().lock())?,
    }
    if let Some(dir) = args.npy_dir {
        save_npy(&panels, &dir)?;
        info!("Npy files saved in {}", dir.display());
    }
    Ok(())
}
