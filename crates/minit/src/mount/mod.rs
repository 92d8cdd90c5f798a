//! 挂载编排：保证挂载点存在，然后单独挂载或者按挂载表批量挂载。

mod options;
mod table;

use core::fmt;
use std::{
    ffi::CString,
    fs::{DirBuilder, File},
    io::{self, BufReader},
    os::unix::fs::DirBuilderExt,
    path::{Path, PathBuf},
};

use compact_str::CompactString;
use defines::{
    config::MOUNT_POINT_MODE,
    error::{ErrorKind, SysError},
    fs::MountFlags,
};
use derive_more::{Display, Error};

pub use self::{
    options::{append_mount_options, fold_long_options},
    table::{parse_record, MountTable, TableRecord},
};

/// 一次挂载所需的全部信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: CompactString,
    pub target: PathBuf,
    pub fs_type: CompactString,
    pub flags: MountFlags,
    /// 传给文件系统的 data 参数
    pub data: Option<CompactString>,
}

impl MountEntry {
    pub fn new(source: &str, target: impl Into<PathBuf>, fs_type: &str, flags: MountFlags) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            fs_type: fs_type.into(),
            flags,
            data: None,
        }
    }
}

impl fmt::Display for MountEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} type {}",
            self.source,
            self.target.display(),
            self.fs_type
        )
    }
}

#[derive(Debug, Display, Error)]
pub enum MountError {
    #[display("cannot create mount point {}: {source}", target.display())]
    MountPoint { target: PathBuf, source: SysError },
    #[display("mount {entry} failed: {source}")]
    Mount { entry: MountEntry, source: SysError },
    #[display("can't read '{}': {source}", path.display())]
    OpenTable { path: PathBuf, source: io::Error },
    #[display("failed reading '{}': {source}", path.display())]
    ReadTable { path: PathBuf, source: io::Error },
    #[display("malformed record at {}:{line_no}: {line:?}", path.display())]
    Malformed {
        path: PathBuf,
        line_no: usize,
        line: String,
    },
}

/// `mount(2)` 的抽象
pub trait Mounter {
    fn mount(&mut self, entry: &MountEntry) -> io::Result<()>;
}

/// 直接调用内核的 [`Mounter`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SysMounter;

impl Mounter for SysMounter {
    fn mount(&mut self, entry: &MountEntry) -> io::Result<()> {
        let flags = rustix::mount::MountFlags::from_bits_retain(entry.flags.bits());
        let data = mount_data(entry)?;
        rustix::mount::mount2(
            Some(entry.source.as_str()),
            entry.target.as_path(),
            Some(entry.fs_type.as_str()),
            flags,
            data.as_deref(),
        )?;
        Ok(())
    }
}

/// 没有 data 时传给内核的是 NULL，而不是空串
fn mount_data(entry: &MountEntry) -> io::Result<Option<CString>> {
    entry
        .data
        .as_deref()
        .map(CString::new)
        .transpose()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
    Created,
    AlreadyExists,
}

/// 保证目录存在。目录已存在不算错误，其余错误按分类返回
pub fn ensure_dir(path: &Path) -> Result<DirStatus, SysError> {
    match DirBuilder::new().mode(MOUNT_POINT_MODE).create(path) {
        Ok(()) => {
            info!("mkdir {} ok!", path.display());
            Ok(DirStatus::Created)
        }
        Err(err) => {
            let err = SysError::from(err);
            if err.kind() == ErrorKind::AlreadyExists {
                debug!("mkdir {}: {err}", path.display());
                Ok(DirStatus::AlreadyExists)
            } else {
                Err(err)
            }
        }
    }
}

/// 准备好挂载点然后挂载
pub fn mount_entry(mounter: &mut impl Mounter, entry: &MountEntry) -> Result<(), MountError> {
    ensure_dir(&entry.target).map_err(|source| MountError::MountPoint {
        target: entry.target.clone(),
        source,
    })?;
    mounter.mount(entry).map_err(|err| MountError::Mount {
        entry: entry.clone(),
        source: err.into(),
    })?;
    info!("{} mount on {} successfully", entry.source, entry.target.display());
    Ok(())
}

/// 挂载单个文件系统，flags 只带魔数 `MS_MGC_VAL`
pub fn mount_targeted(
    mounter: &mut impl Mounter,
    source: &str,
    target: &Path,
    fs_type: &str,
    data: Option<&str>,
) -> Result<(), MountError> {
    let mut entry = MountEntry::new(source, target, fs_type, MountFlags::MS_MGC_VAL);
    entry.data = data.map(CompactString::from);
    mount_entry(mounter, &entry)
}

/// 按挂载表逐条挂载，返回挂载的个数。
///
/// 任何一条失败都会立即中止，后面的记录不会再尝试。
pub fn mount_all(mounter: &mut impl Mounter, table: &Path) -> Result<usize, MountError> {
    let file = File::open(table).map_err(|source| MountError::OpenTable {
        path: table.to_path_buf(),
        source,
    })?;
    let mut mounted = 0;
    for entry in MountTable::new(BufReader::new(file), table) {
        mount_entry(mounter, &entry?)?;
        mounted += 1;
    }
    Ok(mounted)
}
