//! marching squares 等值线提取.
//!
//! 每个 2x2 方格的四个角点按 `左上 = 1, 右上 = 2, 左下 = 4, 右下 = 8`
//! 编码 (严格大于 `level` 的角点计入), 共 16 种情形. 鞍点情形 (6 和 9)
//! 按 "低值相连" 处理, 即把两个高值角点分开.

use std::collections::{HashMap, VecDeque};

use ndarray::ArrayView2;
use ordered_float::OrderedFloat;

use super::{Contour, ContourSet};
use crate::Idx2dF;

/// 精确比较用的点键.
type PointKey = (OrderedFloat<f64>, OrderedFloat<f64>);

/// 有向线段 `(from, to)`.
type Segment = (Idx2dF, Idx2dF);

#[inline]
fn key((i, j): Idx2dF) -> PointKey {
    (OrderedFloat(i), OrderedFloat(j))
}

/// 在 `data` 上提取值为 `level` 的等值线.
///
/// 点以 `(行, 列)` 给出, 位于数组索引空间. 闭合轮廓首尾点相同.
/// 轮廓按创建顺序返回, 即大致自上而下、自左而右. 含 NaN 的方格被跳过.
/// 没有任何轮廓时返回空集合.
pub fn find_contours<T: Copy + Into<f64>>(data: ArrayView2<T>, level: f64) -> ContourSet {
    assemble(square_segments(data, level))
}

/// 沿方格边的线性插值位置. 两端值相同时取 0.
#[inline]
fn fraction(from: f64, to: f64, level: f64) -> f64 {
    if to == from {
        0.0
    } else {
        (level - from) / (to - from)
    }
}

/// 逐方格 (行优先) 生成线段.
fn square_segments<T: Copy + Into<f64>>(data: ArrayView2<T>, level: f64) -> Vec<Segment> {
    let (h, w) = data.dim();
    let mut segments = Vec::new();

    for r0 in 0..h.saturating_sub(1) {
        for c0 in 0..w.saturating_sub(1) {
            let (r1, c1) = (r0 + 1, c0 + 1);
            let ul: f64 = data[(r0, c0)].into();
            let ur: f64 = data[(r0, c1)].into();
            let ll: f64 = data[(r1, c0)].into();
            let lr: f64 = data[(r1, c1)].into();
            if [ul, ur, ll, lr].iter().any(|v| v.is_nan()) {
                continue;
            }

            let case = u8::from(ul > level)
                | u8::from(ur > level) << 1
                | u8::from(ll > level) << 2
                | u8::from(lr > level) << 3;
            if case == 0 || case == 15 {
                continue;
            }

            let (rf, cf) = (r0 as f64, c0 as f64);
            let top = (rf, cf + fraction(ul, ur, level));
            let bottom = (rf + 1.0, cf + fraction(ll, lr, level));
            let left = (rf + fraction(ul, ll, level), cf);
            let right = (rf + fraction(ur, lr, level), cf + 1.0);

            match case {
                1 => segments.push((top, left)),
                2 => segments.push((right, top)),
                3 => segments.push((right, left)),
                4 => segments.push((left, bottom)),
                5 => segments.push((top, bottom)),
                6 => {
                    segments.push((right, top));
                    segments.push((left, bottom));
                }
                7 => segments.push((right, bottom)),
                8 => segments.push((bottom, right)),
                9 => {
                    segments.push((top, left));
                    segments.push((bottom, right));
                }
                10 => segments.push((bottom, top)),
                11 => segments.push((bottom, left)),
                12 => segments.push((left, right)),
                13 => segments.push((top, right)),
                14 => segments.push((left, top)),
                _ => unreachable!(),
            }
        }
    }
    segments
}

/// 把有向线段拼接为折线.
///
/// 每条折线记录其起点和终点; 新线段的终点是某折线的起点时接在其头部,
/// 起点是某折线的终点时接在其尾部. 同时连接两条不同折线时,
/// 较晚创建的一条并入较早创建的一条.
fn assemble(segments: Vec<Segment>) -> ContourSet {
    // 按创建序号存放, 被合并掉的位置置为 `None`.
    let mut lines: Vec<Option<VecDeque<Idx2dF>>> = Vec::new();
    let mut starts: HashMap<PointKey, usize> = HashMap::new();
    let mut ends: HashMap<PointKey, usize> = HashMap::new();

    for (from, to) in segments {
        if from == to {
            continue;
        }
        let tail = starts.remove(&key(to));
        let head = ends.remove(&key(from));

        match (head, tail) {
            (Some(h), Some(t)) if h == t => {
                // 闭合.
                if let Some(line) = lines[h].as_mut() {
                    line.push_back(to);
                }
            }
            (Some(h), Some(t)) if t > h => {
                let Some(tail_line) = lines[t].take() else {
                    unreachable!()
                };
                let Some(head_line) = lines[h].as_mut() else {
                    unreachable!()
                };
                head_line.extend(tail_line);
                if let Some(&last) = head_line.back() {
                    ends.insert(key(last), h);
                }
            }
            (Some(h), Some(t)) => {
                let Some(head_line) = lines[h].take() else {
                    unreachable!()
                };
                let Some(tail_line) = lines[t].as_mut() else {
                    unreachable!()
                };
                for p in head_line.into_iter().rev() {
                    tail_line.push_front(p);
                }
                if let Some(&first) = tail_line.front() {
                    starts.insert(key(first), t);
                }
            }
            (None, None) => {
                let id = lines.len();
                lines.push(Some(VecDeque::from([from, to])));
                starts.insert(key(from), id);
                ends.insert(key(to), id);
            }
            (None, Some(t)) => {
                if let Some(line) = lines[t].as_mut() {
                    line.push_front(from);
                }
                starts.insert(key(from), t);
            }
            (Some(h), None) => {
                if let Some(line) = lines[h].as_mut() {
                    line.push_back(to);
                }
                ends.insert(key(to), h);
            }
        }
    }

    lines
        .into_iter()
        .flatten()
        .map(|line| Contour::from_points(line.into()))
        .collect()
}
