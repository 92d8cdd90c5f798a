//! 一个最小的 init。
//!
//! 内核把控制权交给用户态之后：先挂载必要的文件系统，然后逐行解释启动脚本，
//! 把每一行解析成命令、解析出可执行文件路径、作为子进程运行并等待其结束，最后拉起辅助服务。
//! 整个过程是严格串行的，每个子进程结束之后才会处理下一行。

#[macro_use]
extern crate log;

pub mod config;
pub mod harness;
pub mod launcher;
pub mod mount;
pub mod resolve;
pub mod script;
pub mod supervisor;
pub mod tokenizer;

#[cfg(test)]
mod test_util;

pub use config::{InitConfig, Stage};
pub use harness::{Harness, HarnessError, Results, Verdict};
pub use launcher::{ChildOutcome, LaunchError, Launcher, ProcessLauncher};
pub use mount::{MountEntry, MountError, Mounter, SysMounter};
pub use resolve::{PathError, ResolvedCommand};
pub use script::{Interpreter, LineOutcome, ScriptError, ScriptReport};
pub use supervisor::{BootSummary, StageOutcome, Supervisor};
pub use tokenizer::Invocation;
