use std::cmp::Reverse;
use std::path::Path;

use itertools::Itertools;
use ndarray::{Array2, ArrayD, Axis, Ix2};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::error::{BatchError, BatchResult};
use crate::Idx2d;

pub mod band;
pub mod slice;

pub use band::HuBand;

pub use slice::{BinaryMask, MaskSlice, MaskSliceMut, MaskWrite, ScanSlice};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 水平切片的像素物理尺寸, 以毫米为单位.
///
/// `x` 与 `y` 分别对应切片数组的第一维与第二维.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelSpacing {
    /// 第一维方向的像素尺寸.
    pub x: f64,

    /// 第二维方向的像素尺寸.
    pub y: f64,
}

impl PixelSpacing {
    /// 直接初始化.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 1 毫米 * 1 毫米的像素. 此时面积即像素个数.
    #[inline]
    pub const fn unit() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// 单个像素的实际面积值, 以平方毫米为单位.
    #[inline]
    pub fn pixel_area(&self) -> f64 {
        self.x * self.y
    }

    /// 从 nifti header 中提取像素尺寸.
    ///
    /// 取 `dim[1..=ndim]` 中最大的两个维度 (相同时取靠前的维度),
    /// 按维度声明顺序返回它们对应的 `pixdim`.
    pub fn from_header(header: &NiftiHeader) -> Self {
        let ndim = usize::from(header.dim[0]).clamp(2, 7);
        let axes: Vec<usize> = (1..=ndim)
            .sorted_by_key(|&axis| Reverse(header.dim[axis]))
            .take(2)
            .sorted()
            .collect();
        let &[first, second] = axes.as_slice() else {
            unreachable!()
        };
        Self {
            x: f64::from(header.pixdim[first]),
            y: f64::from(header.pixdim[second]),
        }
    }
}

/// 2D CT nii 文件 header 的共用属性和部分通用操作.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分. 保存掩膜时用作参考 header.
    fn header(&self) -> &NiftiHeader;
}

/// nii 格式 2D CT 水平切片, 包括 header, 切片 (HU) 和像素尺寸.
///
/// HU 值以 `f32` 保存, 已应用 header 中的 `scl_slope` / `scl_inter`.
/// 数组索引顺序与 nifti 体素索引一致, 即 `[i, j]`.
#[derive(Debug, Clone)]
pub struct CtSlice {
    name: String,
    header: BoxedHeader,
    spacing: PixelSpacing,
    data: Array2<f32>,
}

impl NiftiHeaderAttr for CtSlice {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl CtSlice {
    /// 打开 nii 文件格式的 2D CT 切片. `path` 为 nii (或 nii.gz) 文件的本地路径.
    ///
    /// 尾部长度为 1 的维度会被去掉 (如 `W * H * 1`); 去掉后仍不是二维的体数据会返回
    /// [`BatchError::NotASlice`]. 切片标识取自文件名, 见 [`crate::dataset::slice_name`].
    pub fn open<P: AsRef<Path>>(path: P) -> BatchResult<Self> {
        let path = path.as_ref();
        let obj = ReaderOptions::new().read_file(path)?;
        let header = Box::new(obj.header().clone());
        let volume = obj.into_volume().into_ndarray::<f32>()?;
        let data = squeeze_to_2d(volume).map_err(|shape| BatchError::NotASlice {
            path: path.to_owned(),
            shape,
        })?;
        let spacing = PixelSpacing::from_header(&header);

        Ok(Self {
            name: crate::dataset::slice_name(path),
            header,
            spacing,
            data,
        })
    }

    /// 根据裸数据和像素尺寸直接创建 `CtSlice` 实体. header 只填写维度和像素尺寸.
    ///
    /// # 注意
    ///
    /// 该方法创建的 header 不包含任何空间方向信息, 因此你应仅将其用于实验目的.
    pub fn from_raw(name: impl Into<String>, data: Array2<f32>, spacing: PixelSpacing) -> Self {
        let (h, w) = data.dim();
        let mut header = Box::<NiftiHeader>::default();
        header.dim = [2, saturate_u16(h), saturate_u16(w), 1, 1, 1, 1, 1];
        header.pixdim[1] = spacing.x as f32;
        header.pixdim[2] = spacing.y as f32;

        Self {
            name: name.into(),
            header,
            spacing,
            data,
        }
    }

    /// 切片标识.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 像素尺寸.
    #[inline]
    pub fn spacing(&self) -> PixelSpacing {
        self.spacing
    }

    /// 获取切片的不可变视图.
    #[inline]
    pub fn scan(&self) -> ScanSlice<'_> {
        ScanSlice::new(self.data.view())
    }

    /// 图像的分辨率.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }
}

#[inline]
fn saturate_u16(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

/// 去掉尾部长度为 1 的维度, 得到二维切片. 失败时返回原形状.
fn squeeze_to_2d(mut volume: ArrayD<f32>) -> Result<Array2<f32>, Vec<usize>> {
    let shape = volume.shape().to_vec();
    while volume.ndim() > 2 {
        let last = Axis(volume.ndim() - 1);
        if volume.len_of(last) != 1 {
            return Err(shape);
        }
        volume = volume.index_axis_move(last, 0);
    }
    let data = volume.into_dimensionality::<Ix2>().map_err(|_| shape)?;
    Ok(data.as_standard_layout().into_owned())
}
