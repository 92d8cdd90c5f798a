use core::fmt;
use std::path::PathBuf;

use defines::config::{
    DEFAULT_FSTAB_PATH, DEFAULT_PROC_DIR, DEFAULT_SCRIPT_PATH, DEFAULT_SEARCH_DIR,
    DEFAULT_SERVICE, MAX_ARGS,
};

use crate::tokenizer::{tokenize, Invocation};

/// 挂载阶段之后依次执行的一步
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// 逐行解释一个脚本
    Script(PathBuf),
    /// 直接运行一条命令
    Service(Invocation),
}

impl Stage {
    /// 按脚本的规则切分 `cmdline`，空命令返回 `None`
    pub fn service(cmdline: &str, max_args: usize) -> Option<Self> {
        let invocation = tokenize(cmdline, max_args);
        (!invocation.is_empty()).then_some(Self::Service(invocation))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script(path) => write!(f, "script {}", path.display()),
            Self::Service(invocation) => write!(f, "service `{invocation}`"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InitConfig {
    /// 裸命令名的搜索目录
    pub search_dir: PathBuf,
    pub fstab: PathBuf,
    /// 需要在挂载前保证存在的目录
    pub proc_dir: PathBuf,
    pub max_args: usize,
    pub stages: Vec<Stage>,
    /// 结束前回收所有子进程，作为 PID 1 运行时需要
    pub reap: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        let mut stages = vec![Stage::Script(PathBuf::from(DEFAULT_SCRIPT_PATH))];
        stages.extend(Stage::service(DEFAULT_SERVICE, MAX_ARGS));
        Self {
            search_dir: PathBuf::from(DEFAULT_SEARCH_DIR),
            fstab: PathBuf::from(DEFAULT_FSTAB_PATH),
            proc_dir: PathBuf::from(DEFAULT_PROC_DIR),
            max_args: MAX_ARGS,
            stages,
            reap: false,
        }
    }
}
