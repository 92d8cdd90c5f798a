use std::{fs, os::unix::fs::PermissionsExt, path::PathBuf};

#[path = "../../src/test_util/temp_dir.rs"]
mod temp_dir;

pub use temp_dir::TempDir;

/// 写一个可执行的 shell 脚本
pub fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.write(name, &format!("#!/bin/sh\n{body}\n"));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap_or_default()
}
