//! 命令名到可执行文件路径的解析。
//!
//! 解析是纯字符串操作，不检查文件是否存在；路径无效的情况会在 exec 时暴露出来。

use std::{
    ffi::OsString,
    os::unix::ffi::OsStrExt,
    path::{Path, PathBuf},
};

use compact_str::CompactString;
use defines::config::{NAME_MAX, PATH_MAX};
use derive_more::{Display, Error};

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[display("empty command name")]
    Empty,
    #[display("name is {len} bytes, longer than {}", NAME_MAX)]
    NameTooLong { len: usize },
    #[display("path is {len} bytes, longer than {}", PATH_MAX - 1)]
    PathTooLong { len: usize },
}

/// 命令名以及最终用来执行的路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    name: CompactString,
    path: PathBuf,
}

impl ResolvedCommand {
    /// 命令名，会作为子进程的 `argv[0]`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 以 `/` 开头、含有 `/` 或者含有 `.` 的 token 都直接当作路径使用，
/// 这样 `./foo`、`bin/foo`、`foo.sh` 都不会被拼到搜索目录下。
pub fn is_path_like(token: &str) -> bool {
    token.starts_with('/') || token.contains('/') || token.contains('.')
}

/// 把 `name` 拼接到 `dir` 下，检查分量长度和总长度
pub fn join(dir: &Path, name: &str) -> Result<PathBuf, PathError> {
    if name.is_empty() {
        return Err(PathError::Empty);
    }
    if name.len() > NAME_MAX {
        return Err(PathError::NameTooLong { len: name.len() });
    }
    let mut path = OsString::from(dir.as_os_str());
    if !dir.as_os_str().as_bytes().ends_with(b"/") {
        path.push("/");
    }
    path.push(name);
    // 还要给结尾的 `\0` 留一个字节
    if path.len() >= PATH_MAX {
        return Err(PathError::PathTooLong { len: path.len() });
    }
    Ok(PathBuf::from(path))
}

/// 解析一个命令 token。路径形式的 token 原样返回，裸命令名拼接到 `search_dir` 下
pub fn resolve(token: &str, search_dir: &Path) -> Result<ResolvedCommand, PathError> {
    if token.is_empty() {
        return Err(PathError::Empty);
    }
    let path = if is_path_like(token) {
        PathBuf::from(token)
    } else {
        join(search_dir, token)?
    };
    Ok(ResolvedCommand {
        name: CompactString::from(token),
        path,
    })
}

/// 不管 `name` 是什么形式，都拼接到 `dir` 下
pub fn resolve_under(dir: &Path, name: &str) -> Result<ResolvedCommand, PathError> {
    Ok(ResolvedCommand {
        name: CompactString::from(name),
        path: join(dir, name)?,
    })
}
