use tap::Tap;

use crate::cmd_util::Cmd;

pub fn clean() -> anyhow::Result<()> {
    Cmd::parse("cargo clean")
        .tap(|cmd| println!("Invoking {:?}", cmd.info()))
        .invoke()
}

pub fn lint() -> anyhow::Result<()> {
    Cmd::parse("cargo clippy --workspace --exclude xtask --all-targets").invoke()?;
    Cmd::parse("cargo clippy --package xtask").invoke()
}
