//! 掩膜的持久化存储.

use crate::{MaskSlice, MaskSliceMut};
use ndarray::ArrayView2;
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;
use std::path::Path;

/// 表明一个可以以 nifti 格式持久化存储的掩膜对象.
///
/// 存储时以 `reference` 为参考 header, 因此原切片的空间方向信息
/// (qform / sform 仿射变换) 会原样保留; 但强度缩放会被重置为
/// `scl_slope = 1`, `scl_inter = 0`. 路径以 `.gz` 结尾时自动压缩.
pub trait MaskWrite {
    /// 以 "可视化友好" 模式保存: 前景映射为白色 (255), 背景为黑色 (0).
    /// 这样的掩膜在常见 nifti 查看器中可以直接看清.
    fn save_nifti<P: AsRef<Path>>(&self, path: P, reference: &NiftiHeader) -> nifti::Result<()>;
}

/// 使像素更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(label: u8) -> u8 {
    use crate::consts::gray::*;
    if is_foreground(label) {
        WHITE
    } else {
        BLACK
    }
}

fn write_u8<P: AsRef<Path>>(
    path: P,
    data: ArrayView2<u8>,
    reference: &NiftiHeader,
) -> nifti::Result<()> {
    let mut header = reference.clone();
    header.scl_slope = 1.0;
    header.scl_inter = 0.0;
    WriterOptions::new(path.as_ref())
        .reference_header(&header)
        .write_nifti(&data)
}

macro_rules! impl_mask_write {
    ($($slice: ty),+) => {
        $(
            /// 背景/前景分别映射为黑色/白色.
            impl MaskWrite for $slice {
                fn save_nifti<P: AsRef<Path>>(&self, path: P, reference: &NiftiHeader) -> nifti::Result<()> {
                    let vis = self.array_view().mapv(pretty);
                    write_u8(path, vis.view(), reference)
                }
            }
        )+
    };
}

impl_mask_write!(MaskSlice<'_>, MaskSliceMut<'_>);
