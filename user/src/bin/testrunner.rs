//! 逐个运行测试用例列表中的程序，最后打印通过和失败的个数。

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use defines::config::{DEFAULT_CASE_DIR, DEFAULT_TEST_LIST};
use init_logger::LoggerConfig;
use minit::{Harness, HarnessError, ProcessLauncher};

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    /// 用例列表，每行一个用例名
    #[clap(long, default_value = DEFAULT_TEST_LIST)]
    list: PathBuf,
    /// 用例可执行文件所在的目录
    #[clap(long, default_value = DEFAULT_CASE_DIR)]
    case_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logger::init(LoggerConfig::default()) {
        eprintln!("testrunner: logger unavailable: {err}");
    }

    println!("Test syscalls ...");
    let mut harness = Harness::new(cli.case_dir, ProcessLauncher);
    match harness.run_list(&cli.list) {
        Ok(results) => {
            println!();
            println!("{results}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            if let HarnessError::Read { results, .. } = err {
                println!();
                println!("{results}");
            }
            ExitCode::FAILURE
        }
    }
}
