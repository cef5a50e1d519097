use ordered_float::OrderedFloat;

use super::{Contour, ContourSet};
use crate::error::SegResult;

/// 从所有轮廓中挑出肺部轮廓.
///
/// 1. 计算每条轮廓的凸包面积, 任一轮廓退化时直接返回错误;
/// 2. 保留凸包面积严格大于 `min_hull_area` 的闭合轮廓;
/// 3. 不超过 2 条时按原顺序返回;
/// 4. 超过 2 条时按面积升序 (稳定) 排列并去掉最大的一条, 它通常是胸腔外轮廓.
///
/// # 注意
///
/// 这是一个经验规则. 只扫到一侧肺, 或胸腔与肺的凸包面积接近时,
/// 结果可能包含非肺轮廓或漏掉真实的肺.
pub fn select_lung_contours(contours: ContourSet, min_hull_area: f64) -> SegResult<Vec<Contour>> {
    let mut kept: Vec<(f64, Contour)> = Vec::with_capacity(contours.len());
    for contour in contours {
        let area = contour.hull_area()?;
        if area > min_hull_area && contour.is_closed() {
            kept.push((area, contour));
        }
    }

    if kept.len() > 2 {
        kept.sort_by_key(|&(area, _)| OrderedFloat(area));
        kept.pop();
    }
    Ok(kept.into_iter().map(|(_, contour)| contour).collect())
}
