//! 单张切片的完整分割流程.
//!
//! 流程本身是纯函数: 只读取切片, 不写文件, 不持有任何可变状态.

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::consts::{hu, DENOISE_DISTANCE, ISO_LEVEL, MIN_HULL_AREA};
use crate::contour::{find_contours, select_lung_contours, Contour};
use crate::error::{SegError, SegResult};
use crate::mask::{area_mm2, rasterize};
use crate::vessel::{denoise_vessels, isolate_vessels, DenoiseStrategy};
use crate::{BinaryMask, CtSlice, HuBand};

/// 分割流程的全部数值参数. 默认值即常用的经验值.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// 二值化强度带.
    pub band: HuBand,

    /// 等值线水平.
    pub iso_level: f64,

    /// 肺轮廓的最小凸包面积 (像素单位, 开区间).
    pub min_hull_area: f64,

    /// 血管门限 (HU).
    pub vessel_threshold: f32,

    /// 肺外像素的哨兵值 (HU).
    pub outside_sentinel: f32,

    /// 是否对血管去噪.
    pub denoise: bool,

    /// 去噪距离 (像素单位, 闭区间).
    pub denoise_distance: f64,

    /// 去噪时的近邻搜索方式.
    pub denoise_strategy: DenoiseStrategy,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            band: HuBand::lung(),
            iso_level: ISO_LEVEL,
            min_hull_area: MIN_HULL_AREA,
            vessel_threshold: hu::VESSEL_THRESHOLD,
            outside_sentinel: hu::OUTSIDE_SENTINEL,
            denoise: true,
            denoise_distance: DENOISE_DISTANCE,
            denoise_strategy: DenoiseStrategy::BruteForce,
        }
    }
}

/// 运行模式.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// 只分割肺.
    Lungs,

    /// 分割肺, 再分割肺内血管.
    #[default]
    Vessels,
}

impl RunMode {
    /// 是否需要分割血管?
    #[inline]
    pub fn with_vessels(self) -> bool {
        matches!(self, RunMode::Vessels)
    }
}

/// 血管面积占肺面积的百分比.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Ratio {
    /// 百分比值.
    Percent(f64),

    /// 肺面积为 0, 占比无定义.
    Undefined,
}

impl Ratio {
    /// `vessel_area / lung_area * 100`. `lung_area` 为 0 时返回 [`Ratio::Undefined`].
    pub fn between(vessel_area: f64, lung_area: f64) -> Self {
        if lung_area == 0.0 {
            Ratio::Undefined
        } else {
            Ratio::Percent(vessel_area / lung_area * 100.0)
        }
    }

    /// 获取百分比值. 无定义时返回 [`SegError::UndefinedRatio`].
    pub fn percent(&self) -> SegResult<f64> {
        match *self {
            Ratio::Percent(v) => Ok(v),
            Ratio::Undefined => Err(SegError::UndefinedRatio),
        }
    }

    /// 是否有定义?
    #[inline]
    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Percent(_))
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Percent(v) => write!(f, "{v}"),
            Ratio::Undefined => f.write_str("undefined"),
        }
    }
}

/// 一张切片的测量结果.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    /// 切片标识.
    pub slice: String,

    /// 肺面积 (平方毫米).
    pub lung_area_mm2: f64,

    /// 血管面积 (平方毫米). 仅血管模式下存在.
    pub vessel_area_mm2: Option<f64>,

    /// 血管占比. 仅血管模式下存在.
    pub ratio: Option<Ratio>,
}

/// 肺分割结果.
#[derive(Clone, Debug)]
pub struct LungSegmentation {
    /// 肺掩膜.
    pub mask: BinaryMask,

    /// 挑选出的肺轮廓.
    pub contours: Vec<Contour>,

    /// 肺面积 (平方毫米).
    pub area_mm2: f64,
}

/// 血管分割结果.
#[derive(Clone, Debug)]
pub struct VesselSegmentation {
    /// 血管掩膜 (已去噪时为去噪后的结果).
    pub mask: BinaryMask,

    /// 血管面积 (平方毫米).
    pub area_mm2: f64,

    /// 去噪清除的像素个数.
    pub denoised: usize,
}

/// 一张切片的全部输出.
#[derive(Clone, Debug)]
pub struct SliceOutcome {
    /// 肺分割结果.
    pub lungs: LungSegmentation,

    /// 血管分割结果. 仅血管模式下存在.
    pub vessels: Option<VesselSegmentation>,

    /// 测量值.
    pub measurement: Measurement,
}

/// 逐切片分割器. 只持有参数, 可在线程间共享.
#[derive(Clone, Debug, Default)]
pub struct Segmenter {
    params: PipelineParams,
}

impl Segmenter {
    /// 以给定参数创建分割器.
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    /// 参数.
    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// 分割肺.
    ///
    /// 没有合格轮廓时不是错误: 此时掩膜全为背景, 面积为 0, 并记录一条警告.
    pub fn segment_lungs(&self, slice: &CtSlice) -> SegResult<LungSegmentation> {
        let p = &self.params;
        let binary = p.band.binarize(slice.scan());
        let contours = find_contours(binary.as_immut().array_view(), p.iso_level);
        debug!("{}: {} contour(s) at level {}", slice.name(), contours.len(), p.iso_level);

        let contours = select_lung_contours(contours, p.min_hull_area)?;
        if contours.is_empty() {
            warn!("{}: {}", slice.name(), SegError::EmptyContourSet);
        } else {
            debug!("{}: {} lung contour(s)", slice.name(), contours.len());
        }

        let mask = rasterize(slice.shape(), &contours)?;
        debug_assert!(mask.as_immut().is_binary());
        let area_mm2 = area_mm2(&mask.as_immut(), slice.spacing());
        Ok(LungSegmentation {
            mask,
            contours,
            area_mm2,
        })
    }

    /// 在已分割的肺内分割血管.
    pub fn segment_vessels(
        &self,
        slice: &CtSlice,
        lungs: &LungSegmentation,
    ) -> SegResult<VesselSegmentation> {
        let p = &self.params;
        let mut mask = isolate_vessels(
            &lungs.mask.as_immut(),
            &slice.scan(),
            p.vessel_threshold,
            p.outside_sentinel,
        )?;
        debug_assert!(mask.as_immut().is_within(&lungs.mask.as_immut()));
        let denoised = if p.denoise {
            denoise_vessels(
                &mut mask.as_mutable(),
                &lungs.contours,
                p.denoise_distance,
                p.denoise_strategy,
            )
        } else {
            0
        };
        debug!("{}: {} vessel pixel(s) removed by denoising", slice.name(), denoised);
        debug_assert!(mask.as_immut().is_within(&lungs.mask.as_immut()));

        let area_mm2 = area_mm2(&mask.as_immut(), slice.spacing());
        Ok(VesselSegmentation {
            mask,
            area_mm2,
            denoised,
        })
    }

    /// 按 `mode` 处理一张切片.
    pub fn segment(&self, slice: &CtSlice, mode: RunMode) -> SegResult<SliceOutcome> {
        let lungs = self.segment_lungs(slice)?;
        let vessels = if mode.with_vessels() {
            Some(self.segment_vessels(slice, &lungs)?)
        } else {
            None
        };

        let measurement = Measurement {
            slice: slice.name().to_owned(),
            lung_area_mm2: lungs.area_mm2,
            vessel_area_mm2: vessels.as_ref().map(|v| v.area_mm2),
            ratio: vessels.as_ref().map(|v| Ratio::between(v.area_mm2, lungs.area_mm2)),
        };
        Ok(SliceOutcome {
            lungs,
            vessels,
            measurement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelSpacing;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    /// 模拟一张胸部切片: 空气背景, 胸腔组织环, 两侧肺, 肺内若干血管.
    fn phantom() -> CtSlice {
        let data = Array2::from_shape_fn((120, 140), |(h, w)| {
            let in_body = (10..110).contains(&h) && (10..130).contains(&w);
            let left = (25..95).contains(&h) && (20..65).contains(&w);
            let right = (25..95).contains(&h) && (75..120).contains(&w);
            let vessel = (h == 60 || h == 61) && ((40..44).contains(&w) || (95..99).contains(&w));
            if !in_body {
                -1000.0
            } else if vessel {
                -100.0
            } else if left || right {
                -850.0
            } else {
                40.0
            }
        });
        CtSlice::from_raw("slice_phantom", data, PixelSpacing::new(0.5, 0.8))
    }

    #[test]
    fn test_ratio() {
        assert_eq!(Ratio::between(0.0, 0.0), Ratio::Undefined);
        assert_eq!(Ratio::between(5.0, 0.0), Ratio::Undefined);
        assert_eq!(Ratio::Undefined.percent(), Err(SegError::UndefinedRatio));
        assert_eq!(Ratio::Undefined.to_string(), "undefined");
        assert_eq!(Ratio::between(1.0, 4.0), Ratio::Percent(25.0));
        assert_eq!(Ratio::between(1.0, 4.0).percent(), Ok(25.0));
        assert!(Ratio::between(0.0, 4.0).is_defined());
    }

    #[test]
    fn test_params_serde_defaults() {
        let p = PipelineParams::default();
        assert_eq!(p.band, HuBand::lung());
        assert_eq!(p.iso_level, 0.95);
        assert_eq!(p.min_hull_area, 2000.0);
        assert_eq!(p.vessel_threshold, -500.0);
        assert_eq!(p.outside_sentinel, -1000.0);
        assert_eq!(p.denoise_distance, 0.1);
        assert!(p.denoise);
        assert_eq!(p.denoise_strategy, DenoiseStrategy::BruteForce);
    }

    #[test]
    fn test_phantom_vessels() {
        let slice = phantom();
        let outcome = Segmenter::default().segment(&slice, RunMode::Vessels).unwrap();

        // 外轮廓 (空气与身体的边界) 以及两侧肺, 共三条候选, 丢掉最大的.
        assert_eq!(outcome.lungs.contours.len(), 2);
        let lung = outcome.lungs.mask.as_immut();
        assert!(lung.is_binary());
        assert_eq!(lung[(60, 30)], 1);
        assert_eq!(lung[(60, 100)], 1);
        assert_eq!(lung[(60, 70)], 0);
        assert_eq!(lung[(5, 5)], 0);

        let vessels = outcome.vessels.as_ref().unwrap();
        let v = vessels.mask.as_immut();
        assert!(v.is_within(&lung));
        assert_eq!(v.count_foreground(), 16);

        let m = &outcome.measurement;
        assert_eq!(m.slice, "slice_phantom");
        assert_relative_eq!(m.lung_area_mm2, lung.count_foreground() as f64 * 0.4, max_relative = 1e-12);
        assert_relative_eq!(m.vessel_area_mm2.unwrap(), 16.0 * 0.4, max_relative = 1e-12);
        let ratio = m.ratio.unwrap().percent().unwrap();
        assert_relative_eq!(ratio, 16.0 / lung.count_foreground() as f64 * 100.0, max_relative = 1e-9);
    }

    #[test]
    fn test_lungs_mode_has_no_vessels() {
        let outcome = Segmenter::default().segment(&phantom(), RunMode::Lungs).unwrap();
        assert!(outcome.vessels.is_none());
        assert_eq!(outcome.measurement.vessel_area_mm2, None);
        assert_eq!(outcome.measurement.ratio, None);
    }

    #[test]
    fn test_all_air_is_undefined() {
        let slice = CtSlice::from_raw("slice_air", Array2::from_elem((32, 32), -1000.0), PixelSpacing::unit());
        let outcome = Segmenter::default().segment(&slice, RunMode::Vessels).unwrap();
        assert!(outcome.lungs.contours.is_empty());
        assert_eq!(outcome.lungs.mask.as_immut().count_foreground(), 0);
        assert_eq!(outcome.measurement.lung_area_mm2, 0.0);
        assert_eq!(outcome.measurement.vessel_area_mm2, Some(0.0));
        assert_eq!(outcome.measurement.ratio, Some(Ratio::Undefined));
    }

    #[test]
    fn test_denoise_toggle() {
        let slice = phantom();
        let params = PipelineParams {
            denoise: false,
            ..Default::default()
        };
        let raw = Segmenter::new(params).segment(&slice, RunMode::Vessels).unwrap();
        let indexed = Segmenter::new(PipelineParams {
            denoise_strategy: DenoiseStrategy::Indexed,
            ..Default::default()
        })
        .segment(&slice, RunMode::Vessels)
        .unwrap();
        let brute = Segmenter::default().segment(&slice, RunMode::Vessels).unwrap();

        let raw = raw.vessels.unwrap();
        assert_eq!(raw.denoised, 0);
        let (indexed, brute) = (indexed.vessels.unwrap(), brute.vessels.unwrap());
        assert_eq!(indexed.mask, brute.mask);
        assert!(brute.mask.as_immut().is_within(&raw.mask.as_immut()));
    }
}
