//! 系统的第一个用户态进程。
//!
//! 挂载 `/etc/fstab` 中的文件系统，逐行执行 `/etc/init.d/rcS`，然后拉起 procfs 服务。

use std::{path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, Parser};
use defines::config::{DEFAULT_SCRIPT_PATH, DEFAULT_SERVICE};
use init_logger::{parse_level, LoggerConfig};
use log::LevelFilter;
use minit::{InitConfig, ProcessLauncher, Stage, Supervisor, SysMounter};

#[derive(Parser, Debug, Default)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// 启动脚本
    #[clap(long)]
    script: Option<PathBuf>,
    /// 不执行启动脚本
    #[clap(long, conflicts_with = "script")]
    no_script: bool,
    /// 脚本之后运行的命令，可以给多次
    #[clap(long)]
    service: Vec<String>,
    /// 不运行任何服务
    #[clap(long, conflicts_with = "service")]
    no_service: bool,
    /// 挂载表
    #[clap(long)]
    fstab: Option<PathBuf>,
    /// 挂载前需要保证存在的 proc 目录
    #[clap(long)]
    proc_dir: Option<PathBuf>,
    /// 裸命令名的搜索目录
    #[clap(long)]
    search_dir: Option<PathBuf>,
    /// 每行最多保留的参数个数
    #[clap(long)]
    max_args: Option<usize>,
    /// 结束前回收所有子进程。作为 PID 1 运行时总是开启
    #[clap(long)]
    reap: bool,
    /// 控制台日志级别
    #[clap(long, value_parser = parse_level_arg)]
    clog: Option<LevelFilter>,
    /// 文件日志级别
    #[clap(long, value_parser = parse_level_arg)]
    flog: Option<LevelFilter>,
    /// 日志文件
    #[clap(long)]
    log_file: Option<PathBuf>,
}

fn parse_level_arg(level: &str) -> Result<LevelFilter, String> {
    parse_level(level).ok_or_else(|| format!("unknown log level `{level}`"))
}

impl Cli {
    fn logger_config(&self) -> LoggerConfig {
        let mut config = LoggerConfig::default();
        if let Some(clog) = self.clog {
            config.clog = clog;
        }
        if let Some(flog) = self.flog {
            config.flog = flog;
        }
        config.log_file.clone_from(&self.log_file);
        config
    }

    fn init_config(self) -> InitConfig {
        let mut config = InitConfig::default();
        if let Some(dir) = self.search_dir {
            config.search_dir = dir;
        }
        if let Some(fstab) = self.fstab {
            config.fstab = fstab;
        }
        if let Some(proc_dir) = self.proc_dir {
            config.proc_dir = proc_dir;
        }
        if let Some(max_args) = self.max_args {
            config.max_args = max_args;
        }

        config.stages.clear();
        if !self.no_script {
            let script = self
                .script
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT_PATH));
            config.stages.push(Stage::Script(script));
        }
        if !self.no_service {
            let services = if self.service.is_empty() {
                vec![DEFAULT_SERVICE.to_owned()]
            } else {
                self.service
            };
            let max_args = config.max_args;
            config.stages.extend(
                services
                    .iter()
                    .filter_map(|cmdline| Stage::service(cmdline, max_args)),
            );
        }
        config.reap = self.reap || rustix::process::getpid().is_init();
        config
    }
}

fn main() -> ExitCode {
    // 内核可能会传给 init 任意参数，解析失败时按默认配置继续启动
    let (cli, parse_error) = match Cli::try_parse() {
        Ok(cli) => (cli, None),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => (Cli::default(), Some(err)),
    };
    if let Err(err) = init_logger::init(cli.logger_config()) {
        eprintln!("init: logger unavailable: {err}");
    }
    if let Some(err) = parse_error {
        log::warn!("ignoring command line: {}", err.kind());
    }

    let config = cli.init_config();
    log::info!("init started, {} stage(s)", config.stages.len());
    let summary = Supervisor::new(config, SysMounter, ProcessLauncher).run();
    log::info!("reaped {} orphan(s), bye", summary.reaped);
    ExitCode::SUCCESS
}
