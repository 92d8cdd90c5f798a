use std::{
    ffi::{OsStr, OsString},
    process,
};

use anyhow::{bail, Context};

pub struct Cmd(process::Command);

impl Cmd {
    pub fn new(name: &str) -> Self {
        Self(process::Command::new(name))
    }

    /// 按空白切分命令行，第一个分量是程序名
    pub fn parse(cmd_line: &str) -> Self {
        let mut component = cmd_line.split_whitespace();
        let name = component.next().unwrap_or_default();
        let mut cmd = Self::new(name);
        cmd.0.args(component);
        cmd
    }

    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.0.arg(s);
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.0.args(args);
        self
    }

    pub fn optional_arg(&mut self, option: Option<impl AsRef<OsStr>>) -> &mut Self {
        if let Some(arg) = option {
            self.0.arg(arg);
        }
        self
    }

    pub fn envs(
        &mut self,
        vars: impl IntoIterator<Item = (impl AsRef<OsStr>, impl AsRef<OsStr>)>,
    ) -> &mut Self {
        self.0.envs(vars);
        self
    }

    pub fn info(&self) -> OsString {
        let mut msg = OsString::new();
        for (k, v) in self.0.get_envs() {
            msg.push(k);
            if let Some(v) = v {
                msg.push("=");
                msg.push(v);
            }
            msg.push(" ");
        }
        msg.push(self.0.get_program());
        for a in self.0.get_args() {
            msg.push(" ");
            msg.push(a);
        }
        msg
    }

    /// 运行命令，非零退出视为错误
    pub fn invoke(&mut self) -> anyhow::Result<()> {
        let status = self
            .0
            .status()
            .with_context(|| format!("Failed calling {:?}", self.info()))?;
        if !status.success() {
            bail!("Failed with {status}: {:?}", self.info());
        }
        Ok(())
    }
}
