use core::fmt;
use std::io;

use rustix::io::Errno;

/// 系统调用错误的粗分类。
///
/// 挂载和创建目录都只关心这么几种情况，其余的统一归为 [`ErrorKind::Unknown`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PermissionDenied,
    AlreadyExists,
    OutOfSpace,
    ReadOnly,
    NotADirectory,
    NameTooLong,
    Unknown,
}

macro_rules! declare_error_kind {
    ($($kind:ident, $errno:ident, $desc:literal,)*) => {
        impl ErrorKind {
            /// 将 errno 映射到分类
            pub fn from_errno(errno: Errno) -> Self {
                $(if errno == Errno::$errno {
                    return Self::$kind;
                })*
                Self::Unknown
            }

            pub fn description(self) -> &'static str {
                match self {
                    $(Self::$kind => $desc,)*
                    Self::Unknown => "An unknown error occurred",
                }
            }
        }
    };
}

#[rustfmt::skip]
declare_error_kind!(
    PermissionDenied,   ACCESS,         "Permission denied",
    AlreadyExists,      EXIST,          "Directory already exists",
    OutOfSpace,         NOSPC,          "No space left on device",
    ReadOnly,           ROFS,           "Read-only file system",
    NotADirectory,      NOTDIR,         "A component of the path is not a directory",
    NameTooLong,        NAMETOOLONG,    "Path name is too long",
);

impl ErrorKind {
    /// 对 `std::io::Error` 分类。没有 errno 的错误（比如 std 自己构造的）都是 `Unknown`
    pub fn classify(err: &io::Error) -> Self {
        err.raw_os_error()
            .map_or(Self::Unknown, |code| Self::from_errno(Errno::from_raw_os_error(code)))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.description())
    }
}

/// 带分类的系统错误，输出形如 `Directory already exists: File exists (os error 17)`
#[derive(Debug)]
pub struct SysError {
    kind: ErrorKind,
    source: io::Error,
}

impl SysError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn io_error(&self) -> &io::Error {
        &self.source
    }
}

impl From<io::Error> for SysError {
    fn from(source: io::Error) -> Self {
        Self {
            kind: ErrorKind::classify(&source),
            source,
        }
    }
}

impl From<Errno> for SysError {
    fn from(errno: Errno) -> Self {
        Self {
            kind: ErrorKind::from_errno(errno),
            source: errno.into(),
        }
    }
}

impl fmt::Display for SysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.source)
    }
}

impl std::error::Error for SysError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
