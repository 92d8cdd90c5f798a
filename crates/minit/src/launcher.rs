//! spawn-and-wait：创建子进程、替换其映像、等待其结束，只产生一个结果。
//!
//! 调用者只会看到 `Ok(ChildOutcome)` 或者 `Err(LaunchError)`，不需要关心自己是父进程还是子进程。

use core::fmt;
use std::{
    ffi::{OsStr, OsString},
    io,
    os::unix::process::{CommandExt, ExitStatusExt},
    path::{Path, PathBuf},
    process::{self, ExitStatus},
};

use compact_str::CompactString;
use defines::config::{EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND};
use derive_more::{Display, Error};
use rustix::{
    io::Errno,
    process::{wait, WaitOptions},
};
use tap::Tap;

use crate::resolve::ResolvedCommand;

/// 一个子进程的结束状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOutcome {
    Exited(i32),
    Signaled(i32),
}

impl ChildOutcome {
    /// 折叠成一个整数，被信号杀死时和 shell 一样记为 `128 + signo`
    pub fn code(self) -> i32 {
        match self {
            Self::Exited(code) => code,
            Self::Signaled(signo) => 128 + signo,
        }
    }

    pub fn success(self) -> bool {
        self == Self::Exited(0)
    }
}

impl From<ExitStatus> for ChildOutcome {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => Self::Exited(code),
            (None, Some(signo)) => Self::Signaled(signo),
            // 只有 stopped/continued 才会两者都没有，而我们没有请求 WUNTRACED
            (None, None) => Self::Exited(status.into_raw()),
        }
    }
}

impl fmt::Display for ChildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Signaled(signo) => write!(f, "killed by signal {signo}"),
        }
    }
}

/// 子进程根本没能创建出来，比如资源耗尽。和「创建成功但退出码非零」是两回事
#[derive(Debug, Display, Error)]
#[display("cannot launch {}: {source}", path.display())]
pub struct LaunchError {
    path: PathBuf,
    source: io::Error,
}

impl LaunchError {
    pub(crate) fn new(path: PathBuf, source: io::Error) -> Self {
        Self { path, source }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub trait Launcher {
    /// 运行 `command`，参数为 `args`，阻塞直到它结束
    fn spawn_and_wait(
        &mut self,
        command: &ResolvedCommand,
        args: &[CompactString],
    ) -> Result<ChildOutcome, LaunchError>;
}

/// 真正创建子进程的 [`Launcher`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn spawn_and_wait(
        &mut self,
        command: &ResolvedCommand,
        args: &[CompactString],
    ) -> Result<ChildOutcome, LaunchError> {
        Cmd::new(command)
            .args(args.iter().map(CompactString::as_str))
            .tap(|cmd| debug!("spawn {:?}", cmd.info()))
            .status()
    }
}

pub struct Cmd {
    inner: process::Command,
    path: PathBuf,
}

impl Cmd {
    pub fn new(command: &ResolvedCommand) -> Self {
        // std 会在 PATH 中搜索不带 `/` 的程序名，而 `foo.sh` 这种 token 应该相对于当前目录执行
        let program = if command.path().as_os_str().as_encoded_bytes().contains(&b'/') {
            command.path().to_path_buf()
        } else {
            Path::new(".").join(command.path())
        };
        let mut inner = process::Command::new(&program);
        inner.arg0(command.name());
        Self {
            inner,
            path: program,
        }
    }

    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.inner.arg(s);
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn info(&self) -> OsString {
        let mut msg = OsString::new();
        msg.push(self.inner.get_program());
        for a in self.inner.get_args() {
            msg.push(" ");
            msg.push(a);
        }
        msg
    }

    /// 创建子进程并等待它结束。
    ///
    /// exec 失败（路径不存在、不可执行等）按普通的非零退出处理：找不到记为 127，不可执行记为 126。
    /// 其余错误说明子进程没能创建出来，返回 [`LaunchError`]。
    pub fn status(&mut self) -> Result<ChildOutcome, LaunchError> {
        match self.inner.status() {
            Ok(status) => Ok(status.into()),
            Err(source) => match exec_failure_code(&source) {
                Some(code) => {
                    debug!("exec {} failed: {source}", self.path.display());
                    Ok(ChildOutcome::Exited(code))
                }
                None => Err(LaunchError::new(self.path.clone(), source)),
            },
        }
    }
}

fn exec_failure_code(err: &io::Error) -> Option<i32> {
    let errno = Errno::from_raw_os_error(err.raw_os_error()?);
    if [Errno::NOENT, Errno::NOTDIR, Errno::NAMETOOLONG, Errno::LOOP].contains(&errno) {
        Some(EXIT_NOT_FOUND)
    } else if [
        Errno::ACCESS,
        Errno::PERM,
        Errno::NOEXEC,
        Errno::ISDIR,
        Errno::TXTBSY,
    ]
    .contains(&errno)
    {
        Some(EXIT_NOT_EXECUTABLE)
    } else {
        None
    }
}

/// 回收所有剩下的子进程，直到没有子进程为止，返回回收的个数。
///
/// 作为 PID 1 运行时，孤儿进程都会被过继给我们，启动序列结束后需要把它们收掉。
pub fn reap_orphans() -> usize {
    let mut reaped = 0;
    loop {
        match wait(WaitOptions::empty()) {
            Ok(Some((pid, status))) => {
                reaped += 1;
                info!(
                    "Released a zombie process, pid={}, exit_code={:?}",
                    pid.as_raw_nonzero(),
                    status.exit_status(),
                );
            }
            Ok(None) => break,
            Err(err) if err == Errno::INTR => continue,
            Err(err) if err == Errno::CHILD => {
                info!("No child process left");
                break;
            }
            Err(err) => {
                error!("wait failed: {err}");
                break;
            }
        }
    }
    reaped
}
