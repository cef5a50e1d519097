use crate::{MaskSlice, PixelSpacing};

/// 掩膜前景的实际面积, 以平方毫米为单位.
#[inline]
pub fn area_mm2(mask: &MaskSlice, spacing: PixelSpacing) -> f64 {
    mask.count_foreground() as f64 * spacing.pixel_area()
}
