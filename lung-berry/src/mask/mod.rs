//! 掩膜的生成与度量.

mod area;
mod raster;

pub use area::area_mm2;
pub use raster::rasterize;
