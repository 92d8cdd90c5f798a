//! 一个简化的 `mount`。
//!
//! `mount -a` 挂载 `/etc/fstab` 中的所有条目，`mount -t TYPE DEVICE NODE` 挂载单个文件系统。
//! `--` 开头的长选项会被合并成一个选项串，在 `-t` 模式下作为 data 传给文件系统。

use std::{env, ffi::OsString, path::Path, process::ExitCode};

use clap::{
    error::{ContextKind, ContextValue, ErrorKind},
    Parser,
};
use defines::config::DEFAULT_FSTAB_PATH;
use init_logger::LoggerConfig;
use minit::{
    mount::{fold_long_options, mount_all, mount_targeted},
    MountError, SysMounter,
};

#[derive(Parser, Debug)]
#[clap(about = "Mount a file system.")]
struct Cli {
    /// 挂载 /etc/fstab 中的所有文件系统
    #[clap(short = 'a')]
    all: bool,
    /// 文件系统类型
    #[clap(short = 't', value_name = "TYPE")]
    fs_type: Option<String>,
    /// DEVICE NODE
    positional: Vec<String>,
}

fn main() -> ExitCode {
    let args = env::args_os().collect::<Vec<_>>();
    if args.len() <= 1 {
        let prog = args
            .first()
            .map_or_else(|| "mount".into(), |arg| arg.to_string_lossy());
        println!("Usage: {prog} [OPTION]... DEVICE NODE");
        println!("Mount a file system.");
        return ExitCode::SUCCESS;
    }
    if let Err(err) = init_logger::init(LoggerConfig::default()) {
        eprintln!("mount: logger unavailable: {err}");
    }

    let (args, cmdopts) = fold_long_options(args);
    let cli = match parse(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };
    let mut mounter = SysMounter;
    if cli.all {
        if let Err(err) = mount_all(&mut mounter, Path::new(DEFAULT_FSTAB_PATH)) {
            return fail(&err);
        }
    }
    if let Some(fs_type) = &cli.fs_type {
        let [.., source, target] = cli.positional.as_slice() else {
            eprintln!("mount: -t {fs_type} needs DEVICE and NODE");
            return ExitCode::FAILURE;
        };
        let data = (!cmdopts.is_empty()).then_some(cmdopts.as_str());
        if let Err(err) = mount_targeted(&mut mounter, source, Path::new(target), fs_type, data) {
            return fail(&err);
        }
    }
    ExitCode::SUCCESS
}

fn fail(err: &MountError) -> ExitCode {
    log::error!("mount: {err}");
    ExitCode::FAILURE
}

/// 和 getopt 一样，不认识的短选项报一句然后跳过，不影响其余选项
fn parse(mut args: Vec<OsString>) -> Result<Cli, clap::Error> {
    loop {
        match Cli::try_parse_from(args.clone()) {
            Err(err) if err.kind() == ErrorKind::UnknownArgument => {
                let Some(ContextValue::String(invalid)) = err.get(ContextKind::InvalidArg) else {
                    return Err(err);
                };
                eprintln!("mount: invalid option -- '{}'", invalid.trim_start_matches('-'));
                let before = args.len();
                args.retain(|arg| arg.to_str() != Some(invalid.as_str()));
                if args.len() == before {
                    return Err(err);
                }
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn unknown_short_option_is_skipped() {
        let cli = parse(args(&["mount", "-x", "-t", "proc", "proc", "/proc"])).unwrap();
        assert_eq!(cli.fs_type.as_deref(), Some("proc"));
        assert_eq!(cli.positional, ["proc", "/proc"]);
        assert!(!cli.all);
    }

    #[test]
    fn help_is_not_a_failure() {
        let err = parse(args(&["mount", "-h"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn all_flag() {
        assert!(parse(args(&["mount", "-a"])).unwrap().all);
    }
}
