use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::consts::gray::{is_foreground, MASK_BACKGROUND};
use crate::contour::Contour;
use crate::{Idx2d, MaskSliceMut};

/// 血管去噪时的近邻搜索方式. 两种方式的判定结果逐像素一致.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenoiseStrategy {
    /// 遍历所有 (血管像素, 轮廓点) 对.
    #[default]
    BruteForce,

    /// 对每个轮廓点只检查其附近截断框内的像素.
    Indexed,
}

/// 像素 `(i, j)` 到轮廓点 `p` 的欧氏距离是否不超过 `max_distance`.
#[inline]
fn is_near((i, j): Idx2d, (p0, p1): (f64, f64), max_distance: f64) -> bool {
    let di = p0 - i as f64;
    let dj = p1 - j as f64;
    (di * di + dj * dj).sqrt() <= max_distance
}

/// 去掉贴近肺部轮廓的血管像素, 它们通常是肺壁而非血管.
///
/// 像素 `(i, j)` 到某条轮廓上某个点的距离不超过 `max_distance` 时, 被改为背景.
/// 返回被清除的前景像素个数. 结果逐像素不大于输入.
pub fn denoise_vessels(
    vessels: &mut MaskSliceMut,
    contours: &[Contour],
    max_distance: f64,
    strategy: DenoiseStrategy,
) -> usize {
    match strategy {
        DenoiseStrategy::BruteForce => brute_force(vessels, contours, max_distance),
        DenoiseStrategy::Indexed => indexed(vessels, contours, max_distance),
    }
}

fn brute_force(vessels: &mut MaskSliceMut, contours: &[Contour], max_distance: f64) -> usize {
    let near: Vec<Idx2d> = vessels
        .foreground_pos::<Vec<_>>()
        .into_iter()
        .filter(|&pos| {
            contours
                .iter()
                .flat_map(Contour::points)
                .any(|&p| is_near(pos, p, max_distance))
        })
        .collect();
    vessels.clear_batch(near)
}

/// `[p - d, p + d]` 向外各扩一个像素后, 与 `[0, len)` 的交集.
#[inline]
fn candidate_range(p: f64, d: f64, len: usize) -> Range<usize> {
    let len_f = len as f64;
    let lo = ((p - d).floor() - 1.0).clamp(0.0, len_f) as usize;
    let hi = ((p + d).ceil() + 2.0).clamp(0.0, len_f) as usize;
    lo..hi.max(lo)
}

fn indexed(vessels: &mut MaskSliceMut, contours: &[Contour], max_distance: f64) -> usize {
    let (h, w) = vessels.shape();
    let mut cleared = 0usize;
    for &p in contours.iter().flat_map(Contour::points) {
        for i in candidate_range(p.0, max_distance, h) {
            for j in candidate_range(p.1, max_distance, w) {
                let pixel = &mut vessels[(i, j)];
                if is_foreground(*pixel) && is_near((i, j), p, max_distance) {
                    *pixel = MASK_BACKGROUND;
                    cleared += 1;
                }
            }
        }
    }
    cleared
}
