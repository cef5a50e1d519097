#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 从 nifti 格式的 2D 胸部 CT 水平切片中分割肺实质与肺血管,
//! 并给出每张切片的肺面积、血管面积及血管占比.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 逐切片工作, 不做任何跨切片 (三维) 的分割.
//! 2. 除批处理驱动 (`batch`) 的文件读写以外, 所有算法都是纯函数:
//!   切片进, 掩膜和测量值出. 因此切片之间可以任意并行.
//!
//! # 处理流程
//!
//! ### 强度二值化 ✅
//!
//! 将 CT HU 值截断到强度带 `[lower, upper]`, 截断后恰好等于 `upper`
//! 的像素记为 1. 注意这不是 "落在带内" 的判定: 原值 `>= upper`
//! 的像素 (致密组织) 才会被标记.
//!
//! 实现位于 `lung-berry/src/data/band.rs`.
//!
//! ### 等值线提取 ✅
//!
//! marching squares. 点坐标以 `(行, 列)` 给出, 与掩膜索引一致.
//! 首尾相同的轮廓为闭合轮廓.
//!
//! 实现位于 `lung-berry/src/contour/marching.rs`.
//!
//! ### 肺轮廓挑选 ✅
//!
//! 以凸包面积和闭合性过滤轮廓. 候选多于 2 个时,
//! 丢弃凸包面积最大的一个 (视为胸廓外轮廓).
//!
//! 这是一个启发式规则: 胸廓与肺的凸包面积接近时, 它可能保留非肺轮廓,
//! 也可能丢掉真正的肺; 只拍到一侧肺时也没有任何特殊处理.
//!
//! 实现位于 `lung-berry/src/contour/select.rs`.
//!
//! ### 多边形栅格化与面积 ✅
//!
//! 奇偶规则填充, 多个轮廓的覆盖合并为 {0, 1} 掩膜.
//! 面积 = 前景像素数 * 像素物理面积.
//!
//! 实现位于 `lung-berry/src/mask/*`.
//!
//! ### 血管提取与去噪 ✅
//!
//! 肺掩膜内以 -500 HU 为门限提取血管, 再去掉紧贴肺轮廓的伪血管像素.
//!
//! 实现位于 `lung-berry/src/vessel/*`.
//!
//! ### 并行批处理 ✅
//!
//! 借助 `rayon` 线程池逐切片并行, 结果按输入顺序收集.
//!
//! 实现位于 `lung-berry/src/batch.rs`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 高精度二维坐标 `(行, 列)`. 轮廓点均以该类型存储.
pub type Idx2dF = (f64, f64);

/// 2D CT nii 文件基础数据结构.
mod data;

pub use data::{
    BinaryMask, CtSlice, HuBand, MaskSlice, MaskSliceMut, MaskWrite, NiftiHeaderAttr,
    PixelSpacing, ScanSlice,
};

pub mod consts;

pub mod error;

pub use error::{BatchError, BatchResult, SegError, SegResult};

pub mod contour;

pub mod mask;

pub mod vessel;

pub mod pipeline;

pub mod batch;

pub mod dataset;

pub mod report;

pub mod prelude;
