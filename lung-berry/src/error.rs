//! 运行时错误.

use crate::Idx2d;
use std::path::PathBuf;
use thiserror::Error;

/// 单张切片的分割错误.
///
/// 这些错误只影响出错的切片本身, 批处理会记录它们并继续处理剩余切片.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegError {
    /// 轮廓点数不足 (凸包需要至少 3 个不共线的点, 栅格化需要至少 3 个点).
    ///
    /// 参数为轮廓中的点数.
    #[error("degenerate contour with {points} point(s)")]
    DegenerateContour {
        /// 轮廓点数.
        points: usize,
    },

    /// 切片上没有任何合格的肺轮廓.
    #[error("no qualifying lung contour")]
    EmptyContourSet,

    /// 肺面积为 0 时请求了血管占比.
    #[error("vessel ratio is undefined for zero lung area")]
    UndefinedRatio,

    /// 掩膜与切片形状不一致.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// 期望的形状 (切片).
        expected: Idx2d,

        /// 实际的形状 (掩膜).
        found: Idx2d,
    },
}

impl SegError {
    /// 稳定的错误代号, 用于 CSV 记录.
    pub fn code(&self) -> &'static str {
        match self {
            SegError::DegenerateContour { .. } => "degenerate_contour",
            SegError::EmptyContourSet => "empty_contour_set",
            SegError::UndefinedRatio => "undefined_ratio",
            SegError::ShapeMismatch { .. } => "shape_mismatch",
        }
    }
}

/// 分割运行时结果.
pub type SegResult<T> = Result<T, SegError>;

/// 批处理的资源级错误. 遇到它们时整个批处理终止.
#[derive(Debug, Error)]
pub enum BatchError {
    /// 读写 nifti 文件错误.
    #[error("nifti error: {0}")]
    Nifti(#[from] nifti::NiftiError),

    /// 其他底层 I/O 错误.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 写 CSV 错误.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// 文件不是一张 2D 切片 (去掉尾部长度为 1 的维度后仍不是二维).
    #[error("{path:?} is not a 2D slice (shape {shape:?})")]
    NotASlice {
        /// 文件路径.
        path: PathBuf,

        /// 体数据形状.
        shape: Vec<usize>,
    },

    /// 创建工作线程池失败.
    #[cfg(feature = "rayon")]
    #[error("cannot build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// 批处理运行时结果.
pub type BatchResult<T> = Result<T, BatchError>;
