//! 切片加载器.
//!
//! 提供迭代器风格的切片获取模式.

use crate::error::BatchResult;
use crate::CtSlice;
use std::path::{Path, PathBuf};

/// 从 `dir` 下所有以 `prefix` 开头的 nifti 切片文件创建加载器. 文件按路径字典序排列.
pub fn slice_loader<P: AsRef<Path>>(dir: P, prefix: &str) -> std::io::Result<SliceLoader> {
    let paths = super::slice_paths(dir, prefix)?;
    Ok(SliceLoader::new(paths))
}

/// 2D CT 切片加载器. 每次迭代打开一个文件.
pub struct SliceLoader {
    paths_rev: Vec<PathBuf>,
}

impl SliceLoader {
    /// 按给定顺序加载 `paths`.
    pub fn new<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        let mut paths_rev: Vec<PathBuf> = paths.into_iter().collect();
        paths_rev.reverse();
        Self { paths_rev }
    }
}

impl Iterator for SliceLoader {
    type Item = (PathBuf, BatchResult<CtSlice>);

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths_rev.pop()?;
        let data = CtSlice::open(&path);
        Some((path, data))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len(), Some(self.len()))
    }
}

impl ExactSizeIterator for SliceLoader {
    #[inline]
    fn len(&self) -> usize {
        self.paths_rev.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_and_errors() {
        let loader = SliceLoader::new([PathBuf::from("/no/slice_a.nii"), PathBuf::from("/no/slice_b.nii")]);
        assert_eq!(loader.len(), 2);
        let got: Vec<_> = loader.collect();
        assert_eq!(got[0].0, PathBuf::from("/no/slice_a.nii"));
        assert_eq!(got[1].0, PathBuf::from("/no/slice_b.nii"));
        assert!(got.iter().all(|(_, r)| r.is_err()));
    }
}
