use crate::consts::gray::*;
use crate::Idx2d;
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Zip};
use std::ops::{Index, IndexMut};

/// 不可变、借用的二维 CT 扫描切片.
pub struct ScanSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::CtSlice`].
    ///
    /// 这里有意把代码写死为 `ArrayView` 降低灵活性, 但使结构的意图更加明确.
    data: ArrayView2<'a, f32>,
}

impl<'a> From<ArrayView2<'a, f32>> for ScanSlice<'a> {
    #[inline]
    fn from(data: ArrayView2<'a, f32>) -> Self {
        Self::new(data)
    }
}

impl Index<Idx2d> for ScanSlice<'_> {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl<'a> ScanSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub(crate) fn new(data: ArrayView2<'a, f32>) -> Self {
        Self { data }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// 图像的分辨率.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }
}

/// 不可变、借用的二维二值掩膜.
pub struct MaskSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`BinaryMask`].
    data: ArrayView2<'a, u8>,
}

impl Index<Idx2d> for MaskSlice<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

/// 可变、借用的二维二值掩膜.
///
/// 写入的值由调用者保证为 `MASK_BACKGROUND` 或 `MASK_FOREGROUND`.
pub struct MaskSliceMut<'a> {
    /// 底层数据的轻量级视图, 借用于 [`BinaryMask`].
    data: ArrayViewMut2<'a, u8>,
}

/// 可变方法集合.
impl<'a> MaskSliceMut<'a> {
    /// 将 `it` 中的每个索引对应的像素改为背景. 返回原本是前景的像素个数.
    pub fn clear_batch<I: IntoIterator<Item = Idx2d>>(&mut self, it: I) -> usize {
        let mut cnt = 0usize;
        for pos in it.into_iter() {
            if is_foreground(self[pos]) {
                cnt += 1;
            }
            self[pos] = MASK_BACKGROUND;
        }
        cnt
    }
}

impl Index<Idx2d> for MaskSliceMut<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx2d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx2d> for MaskSliceMut<'_> {
    #[inline]
    fn index_mut(&mut self, index: Idx2d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

/// mask 不可变方法集合.
macro_rules! impl_mask_slice_immut {
    ($life: lifetime, $slice: ty, $array: ty) => {
        /// 不可变方法集合.
        impl<$life> $slice {
            /// 直接初始化.
            #[inline]
            pub(crate) fn new(data: $array) -> Self {
                Self { data }
            }

            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<'_, u8> {
                self.data.view()
            }

            /// 图像的分辨率.
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 统计图像中的前景 (非零) 像素总个数.
            #[inline]
            pub fn count_foreground(&self) -> usize {
                self.data.iter().filter(|&p| is_foreground(*p)).count()
            }

            /// 所有像素是否都只取 `MASK_BACKGROUND` 或 `MASK_FOREGROUND`?
            #[inline]
            pub fn is_binary(&self) -> bool {
                self.data
                    .iter()
                    .all(|p| matches!(*p, MASK_BACKGROUND | MASK_FOREGROUND))
            }

            /// 获取所有前景像素的索引, 按行优先存储.
            pub fn foreground_pos<B: FromIterator<Idx2d>>(&self) -> B {
                FromIterator::from_iter(
                    self.data
                        .indexed_iter()
                        .filter_map(|(pos, pixel)| is_foreground(*pixel).then_some(pos)),
                )
            }

            /// 自身的前景是否是 `other` 前景的子集 (逐像素 `<=`)?
            ///
            /// 形状不一致时返回 `false`.
            pub fn is_within(&self, other: &MaskSlice) -> bool {
                self.shape() == other.shape()
                    && Zip::from(&self.data)
                        .and(&other.data)
                        .all(|&a, &b| !is_foreground(a) || is_foreground(b))
            }
        }
    };
}

impl_mask_slice_immut!('a, MaskSlice<'a>, ArrayView2<'a, u8>);
impl_mask_slice_immut!('a, MaskSliceMut<'a>, ArrayViewMut2<'a, u8>);

/// 拥有所有权的二维二值掩膜. 所有像素只取 0 或 1.
///
/// `BinaryMask` 仅提供构造, 以及到 `MaskSlice` 和 `MaskSliceMut`
/// 的轻量转换, 不提供其它方法.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    data: Array2<u8>,
}

impl BinaryMask {
    /// 从任意 `u8` 数组创建掩膜. 非零像素被截断为 1.
    pub fn from_raw_clamped(mut data: Array2<u8>) -> Self {
        data.mapv_inplace(|p| u8::from(is_foreground(p)));
        Self { data }
    }

    /// 从覆盖计数创建掩膜. 被覆盖至少一次的像素为 1.
    pub fn from_counts(counts: &Array2<u32>) -> Self {
        Self {
            data: counts.mapv(|c| u8::from(c > 0)),
        }
    }

    /// 逐像素对 `data` 求谓词 `pred`, 结果为真的位置为 1.
    pub fn from_fn_over<T: Copy>(data: ArrayView2<T>, mut pred: impl FnMut(T) -> bool) -> Self {
        Self {
            data: data.mapv(|v| u8::from(pred(v))),
        }
    }

    /// 获得不可变切片引用.
    #[inline]
    pub fn as_immut(&self) -> MaskSlice<'_> {
        MaskSlice::new(self.data.view())
    }

    /// 获得可变切片引用.
    #[inline]
    pub fn as_mutable(&mut self) -> MaskSliceMut<'_> {
        MaskSliceMut::new(self.data.view_mut())
    }
}
