//! CT 扫描切片与二值掩膜对象的操作.

mod core;
mod save;

pub use core::{BinaryMask, MaskSlice, MaskSliceMut, ScanSlice};

pub use save::MaskWrite;
