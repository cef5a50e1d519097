use ndarray::Array2;

use crate::contour::Contour;
use crate::error::{SegError, SegResult};
use crate::{BinaryMask, Idx2d, Idx2dF};

/// 把轮廓填充为形状为 `shape` 的二值掩膜.
///
/// 每条轮廓视为 `(行, 列)` 空间中的闭合多边形 (未闭合时补上首尾连线),
/// 按奇偶规则在像素中心采样: 从 `(r, c)` 向列增大方向的射线与多边形边相交奇数次时,
/// 像素在内部. 多条轮廓的结果叠加后截断为 {0, 1}.
///
/// 任一轮廓少于 3 个点时返回 [`SegError::DegenerateContour`].
pub fn rasterize(shape: Idx2d, contours: &[Contour]) -> SegResult<BinaryMask> {
    let mut counts = Array2::<u32>::zeros(shape);
    let mut crossings: Vec<f64> = Vec::new();

    for contour in contours {
        let points = contour.points();
        if points.len() < 3 {
            return Err(SegError::DegenerateContour {
                points: points.len(),
            });
        }
        for (r, mut row) in counts.rows_mut().into_iter().enumerate() {
            scanline(points, r as f64, &mut crossings);
            for pair in crossings.chunks_exact(2) {
                let (start, end) = column_span(pair[0], pair[1], shape.1);
                for c in start..end {
                    row[c] += 1;
                }
            }
        }
    }
    Ok(BinaryMask::from_counts(&counts))
}

/// 求水平线 `row` 与多边形各边交点的列坐标, 升序写入 `out`.
///
/// 顶点恰在线上时按半开规则计数, 因此交点个数总为偶数.
fn scanline(points: &[Idx2dF], row: f64, out: &mut Vec<f64>) {
    out.clear();
    let closing = (points[points.len() - 1], points[0]);
    let edges = points.windows(2).map(|w| (w[0], w[1])).chain(Some(closing));
    for ((yi, xi), (yj, xj)) in edges {
        if (yi > row) != (yj > row) {
            out.push(xi + (row - yi) * (xj - xi) / (yj - yi));
        }
    }
    out.sort_unstable_by(f64::total_cmp);
}

/// 交点 `[x0, x1)` 覆盖的像素列, 截断到 `[0, width)`.
#[inline]
fn column_span(x0: f64, x1: f64, width: usize) -> (usize, usize) {
    let w = width as f64;
    let start = x0.ceil().clamp(0.0, w) as usize;
    let end = x1.ceil().clamp(0.0, w) as usize;
    (start, end.max(start))
}
