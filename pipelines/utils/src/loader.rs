//! 对 `lung-berry::dataset` 的更一层封装. 提供更直接的切片目录定位.

use lung_berry::dataset;
use std::env;
use std::path::PathBuf;

/// 指定切片目录的环境变量.
pub const SLICE_DIR_ENV: &str = "LUNG_SLICE_DIR";

/// 获取切片基本路径.
///
/// 1. 若环境变量 `$LUNG_SLICE_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/lung/Images`;
/// 3. 无法确定用户主目录时返回 `None`.
pub fn slice_dir_from_env_or_home() -> Option<PathBuf> {
    match env::var(SLICE_DIR_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => dataset::home_dataset_dir_with(["lung", "Images"]),
    }
}
