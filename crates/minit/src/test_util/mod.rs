mod temp_dir;

use std::{io, path::PathBuf};

use compact_str::CompactString;
use rustix::io::Errno;

pub use self::temp_dir::TempDir;
use crate::{
    launcher::{ChildOutcome, LaunchError, Launcher},
    mount::{MountEntry, Mounter},
    resolve::ResolvedCommand,
};

#[derive(Debug, Clone)]
pub struct Call {
    pub path: PathBuf,
    pub name: CompactString,
    pub args: Vec<CompactString>,
}

/// 只记录调用，不创建进程
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    pub calls: Vec<Call>,
    /// 这些路径以给定的退出码结束
    pub fail_with: Vec<(PathBuf, i32)>,
    /// 这些路径模拟创建子进程失败
    pub refuse: Vec<PathBuf>,
}

impl RecordingLauncher {
    pub fn paths(&self) -> Vec<String> {
        self.calls
            .iter()
            .map(|call| call.path.display().to_string())
            .collect()
    }
}

impl Launcher for RecordingLauncher {
    fn spawn_and_wait(
        &mut self,
        command: &ResolvedCommand,
        args: &[CompactString],
    ) -> Result<ChildOutcome, LaunchError> {
        if self.refuse.iter().any(|path| path == command.path()) {
            return Err(LaunchError::new(
                command.path().to_path_buf(),
                io::Error::from_raw_os_error(Errno::AGAIN.raw_os_error()),
            ));
        }
        self.calls.push(Call {
            path: command.path().to_path_buf(),
            name: command.name().into(),
            args: args.to_vec(),
        });
        let code = self
            .fail_with
            .iter()
            .find(|(path, _)| path == command.path())
            .map_or(0, |(_, code)| *code);
        Ok(ChildOutcome::Exited(code))
    }
}

/// 记录挂载请求，文件系统类型在 `reject` 中的返回 `ENODEV`
#[derive(Debug, Default)]
pub struct FakeMounter {
    pub mounted: Vec<MountEntry>,
    pub attempts: usize,
    pub reject: Vec<&'static str>,
}

impl Mounter for FakeMounter {
    fn mount(&mut self, entry: &MountEntry) -> io::Result<()> {
        self.attempts += 1;
        if self.reject.contains(&entry.fs_type.as_str()) {
            return Err(Errno::NODEV.into());
        }
        self.mounted.push(entry.clone());
        Ok(())
    }
}
