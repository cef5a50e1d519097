//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 二值掩膜中, 背景的像素值.
    pub const MASK_BACKGROUND: u8 = 0;

    /// 二值掩膜中, 前景 (肺实质或血管) 的像素值.
    pub const MASK_FOREGROUND: u8 = 1;

    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色. 掩膜持久化时, 前景会被映射为该值以便于 nifti 查看器显示.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p != MASK_BACKGROUND
    }
}

/// CT HU 相关默认值.
pub mod hu {
    /// 肺分割强度带下限 (空气).
    pub const LUNG_LOWER: f32 = -1000.0;

    /// 肺分割强度带上限. 原值 `>= LUNG_UPPER` 的像素被视为致密组织.
    pub const LUNG_UPPER: f32 = -300.0;

    /// 血管判定门限. 肺内 `>= VESSEL_THRESHOLD` 的像素被视为血管.
    pub const VESSEL_THRESHOLD: f32 = -500.0;

    /// 肺掩膜以外像素的哨兵值. 必须小于 [`VESSEL_THRESHOLD`].
    pub const OUTSIDE_SENTINEL: f32 = -1000.0;
}

/// 等值线提取的默认等值水平.
pub const ISO_LEVEL: f64 = 0.95;

/// 候选肺轮廓的最小凸包面积 (像素单位).
pub const MIN_HULL_AREA: f64 = 2000.0;

/// 血管去噪时, 血管像素到肺轮廓点的最大距离 (像素单位, 闭区间).
pub const DENOISE_DISTANCE: f64 = 0.1;

/// 切片文件名的默认前缀.
pub const SLICE_PREFIX: &str = "slice";
