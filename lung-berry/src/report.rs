//! 测量结果的 CSV 输出.
//!
//! 没有表头, 每张切片一行, 顺序与输入一致.
//!
//! - 肺模式: `切片标识, 肺面积`;
//! - 血管模式: `切片标识, 肺面积, 血管面积, 血管占比 (%)`.
//!
//! 占比无定义时写 `undefined`; 失败的切片在所有数值列写 `error:<代号>`.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::batch::SliceRecord;
use crate::error::{BatchResult, SegError};
use crate::pipeline::{Measurement, Ratio, RunMode};

/// 单元格: 数值或标记.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
enum Cell {
    Number(f64),
    Marker(String),
}

impl Cell {
    fn error(e: &SegError) -> Self {
        Cell::Marker(format!("error:{}", e.code()))
    }

    fn ratio(r: Ratio) -> Self {
        match r {
            Ratio::Percent(v) => Cell::Number(v),
            Ratio::Undefined => Cell::Marker(r.to_string()),
        }
    }

    fn missing() -> Self {
        Cell::Marker(String::new())
    }
}

#[derive(Serialize)]
struct LungRow<'a> {
    slice: &'a str,
    lung_area_mm2: Cell,
}

#[derive(Serialize)]
struct VesselRow<'a> {
    slice: &'a str,
    lung_area_mm2: Cell,
    vessel_area_mm2: Cell,
    ratio: Cell,
}

impl<'a> LungRow<'a> {
    fn new(slice: &'a str, m: &Result<Measurement, SegError>) -> Self {
        let lung_area_mm2 = match m {
            Ok(m) => Cell::Number(m.lung_area_mm2),
            Err(e) => Cell::error(e),
        };
        Self {
            slice,
            lung_area_mm2,
        }
    }
}

impl<'a> VesselRow<'a> {
    fn new(slice: &'a str, m: &Result<Measurement, SegError>) -> Self {
        match m {
            Ok(m) => Self {
                slice,
                lung_area_mm2: Cell::Number(m.lung_area_mm2),
                vessel_area_mm2: m.vessel_area_mm2.map_or_else(Cell::missing, Cell::Number),
                ratio: m.ratio.map_or_else(Cell::missing, Cell::ratio),
            },
            Err(e) => Self {
                slice,
                lung_area_mm2: Cell::error(e),
                vessel_area_mm2: Cell::error(e),
                ratio: Cell::error(e),
            },
        }
    }
}

/// 把 `records` 按 `mode` 对应的格式写入 `w`.
pub fn write_records<W: io::Write>(w: W, mode: RunMode, records: &[SliceRecord]) -> csv::Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(w);
    for r in records {
        match mode {
            RunMode::Lungs => writer.serialize(LungRow::new(&r.slice, &r.measurement))?,
            RunMode::Vessels => writer.serialize(VesselRow::new(&r.slice, &r.measurement))?,
        }
    }
    writer.flush()?;
    Ok(())
}

/// 创建 (或覆盖) `path` 并写入 `records`.
pub fn write_csv<P: AsRef<Path>>(path: P, mode: RunMode, records: &[SliceRecord]) -> BatchResult<()> {
    let file = File::create(path)?;
    write_records(file, mode, records)?;
    Ok(())
}
