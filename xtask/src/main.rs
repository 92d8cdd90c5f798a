mod build;
mod cmd_util;
mod rootfs;
mod tool;

use build::BuildArgs;
use clap::{Parser, Subcommand};
use rootfs::RootfsArgs;

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Build(BuildArgs),
    Rootfs(RootfsArgs),
    Clean,
    Lint,
}

fn main() -> anyhow::Result<()> {
    use Commands::*;
    match Cli::parse().command {
        Build(args) => args.build(),
        Rootfs(args) => args.stage(),
        Clean => tool::clean(),
        Lint => tool::lint(),
    }
}
