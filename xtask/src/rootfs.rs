use std::{
    fs,
    os::unix::fs::{DirBuilderExt, PermissionsExt},
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;

use crate::build::BuildArgs;

const USER_BINS: [&str; 3] = ["init", "mount", "testrunner"];

const RCS: &str = "\
mount -a
";

const FSTAB: &str = "\
# <file system> <mount point> <type> <options> <dump> <pass>
proc /proc proc 0 0 0
";

/// 构建并把程序、启动脚本和挂载表放进一个根文件系统目录
#[derive(Parser)]
pub struct RootfsArgs {
    #[clap(flatten)]
    build: BuildArgs,
    /// 输出目录
    #[clap(long, default_value = "target/rootfs")]
    out: PathBuf,
    #[clap(long)]
    skip_build: bool,
}

impl RootfsArgs {
    pub fn stage(&self) -> anyhow::Result<()> {
        if !self.skip_build {
            self.build.build()?;
        }
        for dir in ["sbin", "etc/init.d", "proc", "dev"] {
            create_dir(&self.out.join(dir))?;
        }
        let binary_dir = self.build.binary_dir();
        for bin in USER_BINS {
            let src = Path::new(&binary_dir).join(bin);
            let dst = self.out.join("sbin").join(bin);
            fs::copy(&src, &dst)
                .with_context(|| format!("copy {} to {}", src.display(), dst.display()))?;
        }
        write_file(&self.out.join("etc/init.d/rcS"), RCS, 0o755)?;
        write_file(&self.out.join("etc/fstab"), FSTAB, 0o644)?;
        println!("Root filesystem staged at {}", self.out.display());
        Ok(())
    }
}

fn create_dir(path: &Path) -> anyhow::Result<()> {
    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(path)
        .with_context(|| format!("mkdir {}", path.display()))
}

fn write_file(path: &Path, content: &str, mode: u32) -> anyhow::Result<()> {
    fs::write(path, content).with_context(|| format!("write {}", path.display()))?;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("chmod {}", path.display()))
}
