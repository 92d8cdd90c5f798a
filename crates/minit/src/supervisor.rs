//! init 的主流程：挂载、依次执行各个阶段、回收孤儿进程。
//!
//! 任何一步失败都只记日志，然后继续下一步。

use crate::{
    config::{InitConfig, Stage},
    launcher::{reap_orphans, Launcher},
    mount::{ensure_dir, mount_all, DirStatus, Mounter},
    script::{Interpreter, LineOutcome, ScriptReport},
};

/// 一个阶段的执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Script(ScriptReport),
    /// 脚本打不开或者读取出错
    ScriptFailed,
    Service(LineOutcome),
}

/// 整个启动过程的记录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootSummary {
    /// `None` 表示创建失败
    pub proc_dir: Option<DirStatus>,
    /// 挂载表中挂载成功的条数，`None` 表示挂载阶段中止
    pub mounted: Option<usize>,
    pub stages: Vec<StageOutcome>,
    pub reaped: usize,
}

pub struct Supervisor<M, L> {
    config: InitConfig,
    mounter: M,
    interpreter: Interpreter<L>,
}

impl<M: Mounter, L: Launcher> Supervisor<M, L> {
    pub fn new(config: InitConfig, mounter: M, launcher: L) -> Self {
        let interpreter = Interpreter::new(config.search_dir.clone(), config.max_args, launcher);
        Self {
            config,
            mounter,
            interpreter,
        }
    }

    pub fn config(&self) -> &InitConfig {
        &self.config
    }

    pub fn mounter(&self) -> &M {
        &self.mounter
    }

    pub fn launcher(&self) -> &L {
        self.interpreter.launcher()
    }

    pub fn run(&mut self) -> BootSummary {
        let mut summary = BootSummary {
            proc_dir: self.prepare_proc_dir(),
            mounted: self.mount_table(),
            ..Default::default()
        };
        info!("mount phase done");

        for stage in &self.config.stages {
            info!("starting {stage}");
            let outcome = match stage {
                Stage::Script(path) => match self.interpreter.run_file(path) {
                    Ok(report) => StageOutcome::Script(report),
                    Err(err) => {
                        error!("{err}");
                        StageOutcome::ScriptFailed
                    }
                },
                Stage::Service(invocation) => {
                    StageOutcome::Service(self.interpreter.execute(invocation))
                }
            };
            summary.stages.push(outcome);
        }

        if self.config.reap {
            summary.reaped = reap_orphans();
        }
        info!("init sequence finished");
        summary
    }

    fn prepare_proc_dir(&self) -> Option<DirStatus> {
        match ensure_dir(&self.config.proc_dir) {
            Ok(status) => Some(status),
            Err(err) => {
                error!("mkdir {} failed: {err}", self.config.proc_dir.display());
                None
            }
        }
    }

    fn mount_table(&mut self) -> Option<usize> {
        match mount_all(&mut self.mounter, &self.config.fstab) {
            Ok(mounted) => {
                info!("mounted {mounted} file system(s) from {}", self.config.fstab.display());
                Some(mounted)
            }
            Err(err) => {
                error!("{err}");
                None
            }
        }
    }
}
