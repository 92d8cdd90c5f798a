//! 单元测试和 `tests/` 下的集成测试共用

use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

/// 测试用的临时目录，drop 时删除
pub struct TempDir(PathBuf);

impl TempDir {
    pub fn new(tag: &str) -> Self {
        let path = env::temp_dir().join(format!(
            "minit-{tag}-{}-{:016x}",
            process::id(),
            fastrand::u64(..)
        ));
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.join(name);
        fs::write(&path, content).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}
