//! 等值线 (轮廓) 的提取与挑选.
//!
//! 所有轮廓点以 `(行, 列)` 即 `(i, j)` 形式给出, 与切片和掩膜的索引方式一致.

mod hull;
mod marching;
mod select;

use crate::error::{SegError, SegResult};
use crate::Idx2dF;

pub use hull::{convex_hull, hull_area};
pub use marching::find_contours;
pub use select::select_lung_contours;

/// 一张切片上的所有轮廓. 数量不定, 可以为空.
pub type ContourSet = Vec<Contour>;

/// 有序的二维折线, 至少包含 2 个点. 首尾点相同时为闭合轮廓.
///
/// 轮廓没有身份信息, 只由点序列本身决定.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    points: Vec<Idx2dF>,
}

impl Contour {
    /// 由点序列创建轮廓. 点数少于 2 时返回 [`SegError::DegenerateContour`].
    pub fn new(points: Vec<Idx2dF>) -> SegResult<Self> {
        if points.len() < 2 {
            return Err(SegError::DegenerateContour {
                points: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// 内部方法, 调用者保证至少 2 个点.
    #[inline]
    pub(crate) fn from_points(points: Vec<Idx2dF>) -> Self {
        debug_assert!(points.len() >= 2);
        Self { points }
    }

    /// 点序列.
    #[inline]
    pub fn points(&self) -> &[Idx2dF] {
        &self.points
    }

    /// 首尾点是否 (精确) 相同?
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.points.first() == self.points.last()
    }

    /// 凸包面积, 见 [`hull_area`].
    #[inline]
    pub fn hull_area(&self) -> SegResult<f64> {
        hull_area(&self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contour_new() {
        assert_eq!(
            Contour::new(vec![(0.0, 0.0)]),
            Err(SegError::DegenerateContour { points: 1 })
        );
        let c = Contour::new(vec![(0.0, 0.0), (1.0, 0.5)]).unwrap();
        assert_eq!(c.points().len(), 2);
        assert!(!c.is_closed());

        let c = Contour::new(vec![(0.0, 0.0), (1.0, 0.5), (0.0, 1.0), (0.0, 0.0)]).unwrap();
        assert!(c.is_closed());
    }
}
