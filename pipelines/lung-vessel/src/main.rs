//! `lung-vessel`: 批量分割 2D 胸部 CT 切片中的肺与肺血管.

mod profile;
mod result;
mod runner;

use anyhow::Result;
use clap::Parser;
use lung_berry::prelude::RunMode;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Segment lungs and pulmonary vessels from axial CT slices (NIfTI)
#[derive(Parser, Debug)]
#[command(name = "lung-vessel", version)]
#[command(about = "Segment lungs and pulmonary vessels from 2D CT slices", long_about = None)]
pub struct Args {
    /// What to segment
    #[arg(value_enum, default_value = "vessels")]
    pub mode: ModeArg,

    /// Directory holding the slices [default: $LUNG_SLICE_DIR, then $HOME/dataset/lung/Images]
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// File name prefix of the slices
    #[arg(short, long, default_value = lung_berry::consts::SLICE_PREFIX)]
    pub prefix: String,

    /// Output directory for masks [default: LUNGS or Vessels]
    #[arg(short, long)]
    pub mask_dir: Option<PathBuf>,

    /// Output CSV path [default: lung_volumes.csv or vessel_volumes.csv]
    #[arg(short, long)]
    pub csv: Option<PathBuf>,

    /// Number of worker threads [default: all cores]
    #[arg(short, long)]
    pub workers: Option<NonZeroUsize>,

    /// Skip removing vessel pixels that touch the lung contour
    #[arg(long)]
    pub no_denoise: bool,

    /// Use the indexed neighbour search when denoising
    #[arg(long)]
    pub indexed_denoise: bool,

    /// Print per-stage debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    Lungs,
    Vessels,
}

impl From<ModeArg> for RunMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Lungs => RunMode::Lungs,
            ModeArg::Vessels => RunMode::Vessels,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new().with_level(level).init()?;

    let profile = runner::run(&args)?;
    result::analyze(&profile)?;
    Ok(())
}
