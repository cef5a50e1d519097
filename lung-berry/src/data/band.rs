use crate::consts::hu;
use crate::{BinaryMask, ScanSlice};
use serde::{Deserialize, Serialize};

/// CT 强度带, 包含下限 (lower) 和上限 (upper).
///
/// 该强度带是只读的. 若要修改参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HuBand {
    lower: f32,
    upper: f32,
}

impl Default for HuBand {
    #[inline]
    fn default() -> Self {
        Self::lung()
    }
}

impl HuBand {
    /// 构建强度带.
    ///
    /// `lower` 和 `upper` 必须是有限值且 `lower <= upper`, 否则返回 `None`.
    pub fn new(lower: f32, upper: f32) -> Option<HuBand> {
        if lower.is_finite() && upper.is_finite() && lower <= upper {
            Some(Self { lower, upper })
        } else {
            None
        }
    }

    /// 用于区分空气与致密组织的强度带 `[-1000, -300]`.
    #[inline]
    pub const fn lung() -> HuBand {
        Self {
            lower: hu::LUNG_LOWER,
            upper: hu::LUNG_UPPER,
        }
    }

    /// 将 `ct` 截断到强度带内. NaN 保持为 NaN.
    #[inline]
    pub fn clip(&self, ct: f32) -> f32 {
        ct.clamp(self.lower, self.upper)
    }

    /// 截断后的值是否恰好等于上限.
    ///
    /// 截断会把所有 `>= upper` 的值压到 `upper`, 因此这等价于原值 `>= upper`,
    /// 而不是 "落在带内".
    #[inline]
    pub fn is_dense(&self, ct: f32) -> bool {
        self.clip(ct) == self.upper
    }

    /// 截断并二值化整张切片: 截断后等于上限的像素为 1, 其余为 0.
    /// 输出形状与输入一致.
    pub fn binarize(&self, scan: ScanSlice) -> BinaryMask {
        BinaryMask::from_fn_over(scan.data(), |ct| self.is_dense(ct))
    }
}
