//! 批处理驱动.
//!
//! 对目录下的每张切片运行分割流程, 保存掩膜, 最后写出 CSV.
//! 单张切片的分割错误 ([`SegError`]) 只记录不中断;
//! 读写文件、建线程池等资源错误 ([`crate::BatchError`]) 会终止整个批处理.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::consts::SLICE_PREFIX;
use crate::dataset::slice_paths;
use crate::error::{BatchResult, SegError};
use crate::pipeline::{Measurement, PipelineParams, Segmenter};
use crate::{CtSlice, MaskWrite, NiftiHeaderAttr};

pub use crate::pipeline::RunMode;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 批处理配置. 所有路径都在这里给出, 没有任何全局状态.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// 切片所在目录.
    pub input_dir: PathBuf,

    /// 切片文件名前缀.
    pub prefix: String,

    /// 运行模式.
    pub mode: RunMode,

    /// 掩膜输出目录.
    pub mask_dir: PathBuf,

    /// CSV 输出路径.
    pub csv_path: PathBuf,

    /// 工作线程数. `None` 表示使用全部可用核心.
    pub workers: Option<NonZeroUsize>,

    /// 分割参数.
    pub params: PipelineParams,
}

impl BatchConfig {
    /// 以 `mode` 的默认输出位置 (相对于当前目录) 创建配置.
    ///
    /// - 肺模式: 掩膜写入 `LUNGS/`, 测量写入 `lung_volumes.csv`;
    /// - 血管模式: 掩膜写入 `Vessels/`, 测量写入 `vessel_volumes.csv`.
    pub fn new<P: Into<PathBuf>>(input_dir: P, mode: RunMode) -> Self {
        let (mask_dir, csv_path) = match mode {
            RunMode::Lungs => ("LUNGS", "lung_volumes.csv"),
            RunMode::Vessels => ("Vessels", "vessel_volumes.csv"),
        };
        Self {
            input_dir: input_dir.into(),
            prefix: SLICE_PREFIX.to_owned(),
            mode,
            mask_dir: PathBuf::from(mask_dir),
            csv_path: PathBuf::from(csv_path),
            workers: None,
            params: PipelineParams::default(),
        }
    }

    /// 切片 `slice` 的掩膜输出路径.
    pub fn mask_path(&self, slice: &str) -> PathBuf {
        let name = match self.mode {
            RunMode::Lungs => format!("{slice}_mask.nii.gz"),
            RunMode::Vessels => format!("{slice}_vessel_only_mask.nii.gz"),
        };
        self.mask_dir.join(name)
    }
}

/// 一张切片的处理记录.
#[derive(Clone, Debug)]
pub struct SliceRecord {
    /// 切片标识.
    pub slice: String,

    /// 切片文件路径.
    pub path: PathBuf,

    /// 测量结果, 或分割错误.
    pub measurement: Result<Measurement, SegError>,

    /// 挑选出的肺轮廓个数.
    pub lung_contours: usize,

    /// 去噪清除的血管像素个数.
    pub denoised: usize,

    /// 处理耗时 (含读写文件).
    pub elapsed: Duration,
}

/// 处理单张切片: 读取, 分割, 保存掩膜.
fn process_one(config: &BatchConfig, segmenter: &Segmenter, path: &Path) -> BatchResult<SliceRecord> {
    let start = Instant::now();
    let slice = CtSlice::open(path)?;

    let (measurement, lung_contours, denoised) = match segmenter.segment(&slice, config.mode) {
        Ok(outcome) => {
            let mask = match &outcome.vessels {
                Some(vessels) => vessels.mask.as_immut(),
                None => outcome.lungs.mask.as_immut(),
            };
            mask.save_nifti(config.mask_path(slice.name()), slice.header())?;

            if let Some(ratio) = outcome.measurement.ratio {
                info!("{} Vessel %: {}", slice.name(), ratio);
            }
            let denoised = outcome.vessels.as_ref().map_or(0, |v| v.denoised);
            (Ok(outcome.measurement), outcome.lungs.contours.len(), denoised)
        }
        Err(e) => {
            warn!("{}: {}", slice.name(), e);
            (Err(e), 0, 0)
        }
    };

    Ok(SliceRecord {
        slice: slice.name().to_owned(),
        path: path.to_owned(),
        measurement,
        lung_contours,
        denoised,
        elapsed: start.elapsed(),
    })
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        /// 借助 `rayon` 线程池并行处理, 结果按输入顺序收集.
        fn process_all(
            config: &BatchConfig,
            segmenter: &Segmenter,
            paths: &[PathBuf],
        ) -> BatchResult<Vec<SliceRecord>> {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(n) = config.workers {
                builder = builder.num_threads(n.get());
            }
            let pool = builder.build()?;
            info!("running on {} worker thread(s)", pool.current_num_threads());

            pool.install(|| {
                paths
                    .par_iter()
                    .map(|path| process_one(config, segmenter, path))
                    .collect()
            })
        }
    } else {
        /// 顺序处理.
        fn process_all(
            config: &BatchConfig,
            segmenter: &Segmenter,
            paths: &[PathBuf],
        ) -> BatchResult<Vec<SliceRecord>> {
            paths
                .iter()
                .map(|path| process_one(config, segmenter, path))
                .collect()
        }
    }
}

/// 运行批处理, 返回按输入顺序排列的处理记录.
///
/// 掩膜目录和 CSV 所在目录会被自动创建. 没有找到任何切片时仍会写出空的 CSV.
pub fn run_batch(config: &BatchConfig) -> BatchResult<Vec<SliceRecord>> {
    let paths = slice_paths(&config.input_dir, &config.prefix)?;
    info!(
        "{} slice(s) matching `{}*` under {}",
        paths.len(),
        config.prefix,
        config.input_dir.display()
    );

    fs::create_dir_all(&config.mask_dir)?;
    if let Some(parent) = config.csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let segmenter = Segmenter::new(config.params);
    debug!("segmentation parameters: {:?}", segmenter.params());
    let records = process_all(config, &segmenter, &paths)?;

    crate::report::write_csv(&config.csv_path, config.mode, &records)?;
    info!("measurements written to {}", config.csv_path.display());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Ratio;
    use crate::PixelSpacing;
    use ndarray::Array2;
    use nifti::writer::WriterOptions;

    /// 带两侧 "肺" 的合成切片. `vessel` 为真时在左肺内放一个 2x2 的血管.
    fn phantom(vessel: bool) -> Array2<f32> {
        Array2::from_shape_fn((80, 120), |(h, w)| {
            let in_body = (5..75).contains(&h) && (5..115).contains(&w);
            let lung = (15..65).contains(&h) && ((10..55).contains(&w) || (65..110).contains(&w));
            let in_vessel = (30..32).contains(&h) && (30..32).contains(&w);
            if !in_body {
                -1000.0
            } else if lung && vessel && in_vessel {
                -50.0
            } else if lung {
                -800.0
            } else {
                30.0
            }
        })
    }

    fn write_slice(dir: &Path, name: &str, data: Array2<f32>) {
        let reference = CtSlice::from_raw(name, Array2::zeros(data.dim()), PixelSpacing::new(0.5, 0.5));
        let mut header = reference.header().clone();
        header.scl_slope = 1.0;
        header.scl_inter = 0.0;
        WriterOptions::new(dir.join(format!("{name}.nii.gz")))
            .reference_header(&header)
            .write_nifti(&data)
            .unwrap();
    }

    #[test]
    fn test_config_defaults() {
        let c = BatchConfig::new("Images", RunMode::Lungs);
        assert_eq!(c.prefix, "slice");
        assert_eq!(c.mask_path("slice_3"), PathBuf::from("LUNGS/slice_3_mask.nii.gz"));
        assert_eq!(c.csv_path, PathBuf::from("lung_volumes.csv"));

        let c = BatchConfig::new("Images", RunMode::Vessels);
        assert_eq!(
            c.mask_path("slice_3"),
            PathBuf::from("Vessels/slice_3_vessel_only_mask.nii.gz")
        );
        assert_eq!(c.csv_path, PathBuf::from("vessel_volumes.csv"));
        assert!(c.workers.is_none());
    }

    #[test]
    fn test_run_batch_in_order() {
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Debug)
            .init();
        let root = std::env::temp_dir().join(format!("lung-berry-{}-batch", std::process::id()));
        let input = root.join("Images");
        fs::create_dir_all(&input).unwrap();

        write_slice(&input, "slice_1", phantom(true));
        write_slice(&input, "slice_0", phantom(false));
        write_slice(&input, "slice_2", Array2::from_elem((80, 120), -1000.0));
        fs::write(input.join("other_0.nii.gz"), b"").unwrap();

        let mut config = BatchConfig::new(&input, RunMode::Vessels);
        config.mask_dir = root.join("Vessels");
        config.csv_path = root.join("out").join("vessel_volumes.csv");
        config.workers = NonZeroUsize::new(2);
        let records = run_batch(&config).unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.slice.as_str()).collect();
        assert_eq!(names, vec!["slice_0", "slice_1", "slice_2"]);

        let m0 = records[0].measurement.as_ref().unwrap();
        let m1 = records[1].measurement.as_ref().unwrap();
        let m2 = records[2].measurement.as_ref().unwrap();
        assert_eq!(records[0].lung_contours, 2);
        assert_eq!(m0.lung_area_mm2, 2.0 * 50.0 * 45.0 * 0.25);
        assert_eq!(m1.lung_area_mm2, m0.lung_area_mm2);
        assert_eq!(m0.vessel_area_mm2, Some(0.0));
        assert_eq!(m1.vessel_area_mm2, Some(4.0 * 0.25));
        assert_eq!(m2.lung_area_mm2, 0.0);
        assert_eq!(m2.ratio, Some(Ratio::Undefined));

        for name in ["slice_0", "slice_1", "slice_2"] {
            assert!(config.mask_path(name).is_file(), "{name}");
        }
        let saved = CtSlice::open(config.mask_path("slice_1")).unwrap();
        let values: Vec<f32> = saved.scan().data().iter().copied().filter(|&v| v != 0.0).collect();
        assert_eq!(values, vec![255.0; 4]);

        let csv = fs::read_to_string(&config.csv_path).unwrap();
        fs::remove_dir_all(&root).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "slice_0,1125.0,0.0,0.0");
        assert!(lines[1].starts_with("slice_1,1125.0,1.0,"));
        assert_eq!(lines[2], "slice_2,0.0,0.0,undefined");
    }

    #[test]
    fn test_failed_slice_does_not_stop_batch() {
        let root = std::env::temp_dir().join(format!("lung-berry-{}-batch-failed", std::process::id()));
        let input = root.join("Images");
        fs::create_dir_all(&input).unwrap();

        // 唯一的致密像素在角上, 等值线只有 2 个点.
        let mut corner = Array2::from_elem((20, 20), -1000.0);
        corner[(0, 0)] = 30.0;
        write_slice(&input, "slice_0", corner);
        write_slice(&input, "slice_1", phantom(true));

        let mut config = BatchConfig::new(&input, RunMode::Vessels);
        config.mask_dir = root.join("Vessels");
        config.csv_path = root.join("vessel_volumes.csv");
        config.workers = NonZeroUsize::new(2);
        let records = run_batch(&config).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].slice, "slice_0");
        assert_eq!(
            records[0].measurement,
            Err(SegError::DegenerateContour { points: 2 })
        );
        assert_eq!(records[0].lung_contours, 0);
        assert_eq!(records[0].denoised, 0);
        assert_eq!(records[1].slice, "slice_1");
        let m1 = records[1].measurement.as_ref().unwrap();
        assert_eq!(m1.lung_area_mm2, 1125.0);
        assert_eq!(m1.vessel_area_mm2, Some(1.0));

        assert!(!config.mask_path("slice_0").exists());
        assert!(config.mask_path("slice_1").is_file());

        let csv = fs::read_to_string(&config.csv_path).unwrap();
        fs::remove_dir_all(&root).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "slice_0,error:degenerate_contour,error:degenerate_contour,error:degenerate_contour"
        );
        assert!(lines[1].starts_with("slice_1,1125.0,1.0,"));
    }
}
