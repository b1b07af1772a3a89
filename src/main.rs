use clap::Parser;
use colorcut::{ColorReducer, PaletteEntry, ReduceOptions};
use log::LevelFilter;
use std::error::Error;
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Reduce the colors of an image and print the resulting palette
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path
    img: PathBuf,

    /// Quantization method: median_cut or cluster
    #[arg(short, long, default_value = "cluster")]
    method: String,

    /// Target palette size, rounded down to a power of two for median_cut
    #[arg(short = 'n', long, default_value_t = 8)]
    colors: usize,

    /// Seed for the cluster method
    #[arg(long, default_value_t = colorcut::DEFAULT_SEED)]
    seed: u64,

    /// Split median cut buckets on all cores
    #[arg(long)]
    parallel: bool,

    /// Print debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let options = ReduceOptions {
        method: args.method.parse()?,
        n_colors: args.colors,
        seed: args.seed,
        parallel: args.parallel,
    };
    let reduced = ColorReducer::open(&args.img)?.reduce(&options)?;
    let palette = reduced.palette();
    eprintln!("Palette size: {}", palette.len());

    let mut stdout = stdout().lock();
    for PaletteEntry { color, count } in palette {
        writeln!(
            stdout,
            "{:.6} {:.6} {:.6} {count}",
            color[0], color[1], color[2]
        )?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_default_env()
        .filter_level(log_level(args.verbose))
        .format_timestamp(None)
        .init();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", args.img.to_string_lossy());
            ExitCode::FAILURE
        }
    }
}
