use ordered_float::OrderedFloat;

use crate::error::{SegError, SegResult};
use crate::Idx2dF;

/// 向量 `oa` 与 `ob` 的叉积.
#[inline]
fn cross(o: Idx2dF, a: Idx2dF, b: Idx2dF) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// 求点集的凸包 (Andrew monotone chain), 逆时针返回顶点, 首尾不重复.
///
/// 去重后不足 3 个点, 或所有点共线时返回 [`SegError::DegenerateContour`].
pub fn convex_hull(points: &[Idx2dF]) -> SegResult<Vec<Idx2dF>> {
    let mut pts = points.to_vec();
    pts.sort_unstable_by_key(|&(i, j)| (OrderedFloat(i), OrderedFloat(j)));
    pts.dedup();
    if pts.len() < 3 {
        return Err(SegError::DegenerateContour { points: pts.len() });
    }

    let mut lower: Vec<Idx2dF> = Vec::with_capacity(pts.len());
    for &p in pts.iter() {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Idx2dF> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.append(&mut upper);
    if lower.len() < 3 {
        // 共线
        return Err(SegError::DegenerateContour { points: lower.len() });
    }
    Ok(lower)
}

/// 点集凸包的面积 (鞋带公式).
pub fn hull_area(points: &[Idx2dF]) -> SegResult<f64> {
    let hull = convex_hull(points)?;
    let twice: f64 = hull
        .iter()
        .zip(hull.iter().cycle().skip(1))
        .map(|(&(i0, j0), &(i1, j1))| i0 * j1 - i1 * j0)
        .sum();
    Ok(twice.abs() / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_two_points_degenerate() {
        let pts = [(1.0, 1.0), (4.0, 2.0)];
        assert_eq!(hull_area(&pts), Err(SegError::DegenerateContour { points: 2 }));
        // 重复点不计.
        let pts = [(1.0, 1.0), (4.0, 2.0), (1.0, 1.0)];
        assert_eq!(convex_hull(&pts), Err(SegError::DegenerateContour { points: 2 }));
    }

    #[test]
    fn test_collinear_degenerate() {
        let pts = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        assert!(matches!(hull_area(&pts), Err(SegError::DegenerateContour { .. })));
    }

    #[test]
    fn test_square_with_interior() {
        let pts = [
            (0.0, 0.0),
            (0.0, 10.0),
            (5.0, 5.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (3.0, 7.0),
            (0.0, 5.0),
            (0.0, 0.0),
        ];
        let hull = convex_hull(&pts).unwrap();
        assert_eq!(hull.len(), 4);
        assert_abs_diff_eq!(hull_area(&pts).unwrap(), 100.0);
    }

    #[test]
    fn test_triangle() {
        let pts = [(0.5, 0.5), (2.5, 0.5), (0.5, 3.5)];
        assert_abs_diff_eq!(hull_area(&pts).unwrap(), 3.0);
    }
}
