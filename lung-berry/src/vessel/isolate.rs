use ndarray::Zip;

use crate::error::{SegError, SegResult};
use crate::{BinaryMask, MaskSlice, ScanSlice};

/// 在肺部掩膜内提取血管.
///
/// 先求 `v = 掩膜 * CT 值`, 其中 `v == 0` 的像素 (肺外, 或 CT 值恰为 0)
/// 被替换为 `sentinel`; 之后 `v >= threshold` 的像素为血管.
///
/// 两者形状不一致时返回 [`SegError::ShapeMismatch`].
pub fn isolate_vessels(
    lung_mask: &MaskSlice,
    scan: &ScanSlice,
    threshold: f32,
    sentinel: f32,
) -> SegResult<BinaryMask> {
    if lung_mask.shape() != scan.shape() {
        return Err(SegError::ShapeMismatch {
            expected: scan.shape(),
            found: lung_mask.shape(),
        });
    }

    let vessels = Zip::from(lung_mask.array_view())
        .and(scan.data())
        .map_collect(|&m, &ct| {
            let v = f32::from(m) * ct;
            let v = if v == 0.0 { sentinel } else { v };
            u8::from(v >= threshold)
        });
    Ok(BinaryMask::from_raw_clamped(vessels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::hu::{OUTSIDE_SENTINEL, VESSEL_THRESHOLD};
    use ndarray::{array, Array2};

    fn isolate(mask: &BinaryMask, ct: &Array2<f32>) -> SegResult<BinaryMask> {
        isolate_vessels(
            &mask.as_immut(),
            &ScanSlice::from(ct.view()),
            VESSEL_THRESHOLD,
            OUTSIDE_SENTINEL,
        )
    }

    #[test]
    fn test_inside_lung_only() {
        let mask = BinaryMask::from_raw_clamped(array![[1, 1, 1], [1, 1, 0], [0, 0, 0]]);
        let ct = array![
            [-900.0, -500.0, 40.0],
            [-500.1, 0.0, 40.0],
            [40.0, -100.0, -950.0f32]
        ];
        let vessels = isolate(&mask, &ct).unwrap();
        assert_eq!(vessels.as_immut().array_view(), array![[0, 1, 1], [0, 0, 0], [0, 0, 0]]);
    }

    #[test]
    fn test_subset_of_lung() {
        let mask = BinaryMask::from_raw_clamped(Array2::from_shape_fn((9, 9), |(h, w)| u8::from(h > 2 && w < 6)));
        let ct = Array2::from_shape_fn((9, 9), |(h, w)| (h as f32 - w as f32) * 150.0 - 300.0);
        let vessels = isolate(&mask, &ct).unwrap();
        assert!(vessels.as_immut().is_binary());
        assert!(vessels.as_immut().is_within(&mask.as_immut()));
        assert!(vessels.as_immut().count_foreground() > 0);
    }

    #[test]
    fn test_shape_mismatch() {
        let mask = BinaryMask::from_raw_clamped(Array2::zeros((4, 5)));
        let ct = Array2::<f32>::zeros((5, 4));
        assert_eq!(
            isolate(&mask, &ct),
            Err(SegError::ShapeMismatch {
                expected: (5, 4),
                found: (4, 5)
            })
        );
    }
}
