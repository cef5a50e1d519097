//! 程序运行函数.

use crate::profile::Profile;
use crate::Args;
use anyhow::{bail, Context, Result};
use log::info;
use lung_berry::prelude::*;
use utils::loader;

/// 由命令行参数构造批处理配置.
pub fn build_config(args: &Args) -> Result<BatchConfig> {
    let input = match &args.input {
        Some(dir) => dir.clone(),
        None => loader::slice_dir_from_env_or_home()
            .context("no --input given and the home directory is unknown")?,
    };
    if !input.is_dir() {
        bail!("input directory {} does not exist", input.display());
    }

    let mut config = BatchConfig::new(input, args.mode.into());
    config.prefix = args.prefix.clone();
    if let Some(dir) = &args.mask_dir {
        config.mask_dir = dir.clone();
    }
    if let Some(csv) = &args.csv {
        config.csv_path = csv.clone();
    }
    config.workers = args.workers;
    config.params.denoise = !args.no_denoise;
    if args.indexed_denoise {
        config.params.denoise_strategy = DenoiseStrategy::Indexed;
    }
    Ok(config)
}

/// 实际运行.
pub fn run(args: &Args) -> Result<Profile> {
    let mut profile = Profile::new();
    let config = build_config(args)?;

    // 短路判断
    let mut slices = lung_berry::dataset::slice_loader(&config.input_dir, &config.prefix)
        .with_context(|| format!("cannot list {}", config.input_dir.display()))?;
    match slices.next() {
        None => bail!(
            "no `{}*.nii[.gz]` slice under {}",
            config.prefix,
            config.input_dir.display()
        ),
        Some((path, Err(e))) => {
            return Err(e).with_context(|| format!("cannot load {}", path.display()));
        }
        Some(_) => {}
    }

    info!(
        "Running {:?} segmentation on {} worker(s)...",
        config.mode,
        config.workers.map_or_else(utils::cpus, usize::from)
    );
    let records = run_batch(&config).context("batch aborted")?;
    for record in records.iter() {
        profile.count_record(record);
    }
    Ok(profile.finish())
}
