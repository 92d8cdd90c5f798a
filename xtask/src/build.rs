use clap::Parser;
use tap::Tap;

use crate::cmd_util::Cmd;

/// 构建 init、mount 和 testrunner
#[derive(Parser)]
pub struct BuildArgs {
    /// 是否以 release 构建
    #[clap(long)]
    pub release: bool,
    /// 控制台日志级别
    #[clap(long, default_value_t = String::from("INFO"))]
    clog: String,
    /// 文件日志级别
    #[clap(long, default_value_t = String::from("NONE"))]
    flog: String,
    /// 目标三元组，不指定时为宿主机
    #[clap(long)]
    pub target: Option<String>,
}

impl BuildArgs {
    pub fn build(&self) -> anyhow::Result<()> {
        println!("Building user programs...");
        Cmd::parse("cargo build --package user")
            .optional_arg(self.release.then_some("--release"))
            .tap_mut(|cmd| {
                if let Some(target) = &self.target {
                    cmd.args(["--target", target]);
                }
            })
            .envs([("INIT_CLOG", &self.clog), ("INIT_FLOG", &self.flog)])
            .tap(|cmd| println!("Invoking {:?}", cmd.info()))
            .invoke()
    }

    /// 构建产物所在的目录
    pub fn binary_dir(&self) -> String {
        let profile = if self.release { "release" } else { "debug" };
        match &self.target {
            Some(target) => format!("target/{target}/{profile}"),
            None => format!("target/{profile}"),
        }
    }
}
