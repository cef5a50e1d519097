//! 🫁欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx2dF};

pub use crate::data::slice::{BinaryMask, MaskSlice, MaskSliceMut, MaskWrite, ScanSlice};
pub use crate::data::{CtSlice, HuBand, NiftiHeaderAttr, PixelSpacing};

pub use crate::consts::gray::{MASK_BACKGROUND, MASK_FOREGROUND};

pub use crate::contour::{find_contours, select_lung_contours, Contour, ContourSet};
pub use crate::mask::{area_mm2, rasterize};
pub use crate::vessel::{denoise_vessels, isolate_vessels, DenoiseStrategy};

pub use crate::pipeline::{Measurement, PipelineParams, Ratio, Segmenter, SliceOutcome};

pub use crate::batch::{run_batch, BatchConfig, RunMode, SliceRecord};

pub use crate::error::{BatchError, SegError};
