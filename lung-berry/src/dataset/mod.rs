//! 数据集操作.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

mod loader;

pub use loader::{slice_loader, SliceLoader};

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 文件名是否以 `.nii` 或 `.nii.gz` 结尾?
#[inline]
pub fn is_nifti_name(name: &str) -> bool {
    name.ends_with(".nii") || name.ends_with(".nii.gz")
}

/// 切片标识: 文件名中第一个 `.nii` 之前的部分.
///
/// 例如 `Images/slice_12.nii.gz` 的标识为 `slice_12`.
pub fn slice_name<P: AsRef<Path>>(path: P) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();
    match name.find(".nii") {
        Some(end) => name[..end].to_owned(),
        None => name.into_owned(),
    }
}

/// 列出 `dir` 下文件名以 `prefix` 开头的所有 nifti 文件, 按路径字典序排列.
///
/// 不递归进入子目录.
pub fn slice_paths<P: AsRef<Path>>(dir: P, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(prefix) && is_nifti_name(name) {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_slice_name() {
        assert_eq!(slice_name("Images/slice_12.nii.gz"), "slice_12");
        assert_eq!(slice_name("/a/b.nii/slice_3.nii"), "slice_3");
        assert_eq!(slice_name("slice.v2.nii.gz"), "slice.v2");
        assert_eq!(slice_name("no_extension"), "no_extension");
    }

    #[test]
    fn test_is_nifti_name() {
        assert!(is_nifti_name("slice_0.nii"));
        assert!(is_nifti_name("slice_0.nii.gz"));
        assert!(!is_nifti_name("slice_0.nii.gz.bak"));
        assert!(!is_nifti_name("slice_0.npz"));
    }

    #[test]
    fn test_slice_paths() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("lung-berry-{}-paths", std::process::id()));
        fs::create_dir_all(dir.join("slice_sub.nii")).unwrap();
        for name in ["slice_2.nii.gz", "slice_10.nii", "slice_1.nii.gz", "mask_1.nii.gz", "slice_3.txt"] {
            fs::write(dir.join(name), b"").unwrap();
        }

        let names: Vec<String> = slice_paths(&dir, "slice")
            .unwrap()
            .iter()
            .map(slice_name)
            .collect();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(names, vec!["slice_1", "slice_10", "slice_2"]);
    }

    #[test]
    fn test_missing_dir() {
        assert!(slice_paths("/definitely/not/here", "slice").is_err());
    }
}
