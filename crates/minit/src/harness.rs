//! 测试用例驱动：从列表文件读出用例名，逐个运行并统计结果。

use core::fmt;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use defines::config::TEST_WARN_CODE;
use derive_more::{Display, Error};

use crate::{
    launcher::{ChildOutcome, Launcher},
    resolve::resolve_under,
};

#[derive(Debug, Display, Error)]
pub enum HarnessError {
    #[display("cannot open test list {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    /// 读取中途出错，`results` 是出错之前已经跑完的用例
    #[display("failed reading test list {} after {} case(s): {source}", path.display(), results.total())]
    Read {
        path: PathBuf,
        results: Results,
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Results {
    pub passed: usize,
    pub failed: usize,
}

impl Results {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

impl fmt::Display for Results {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========")?;
        writeln!(f, "Passed: {}", self.passed)?;
        writeln!(f, "Failed: {}", self.failed)?;
        writeln!(f, "Total: {}", self.total())?;
        write!(f, "==========")
    }
}

/// 单个用例的判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    PassedWithWarnings,
    Failed(i32),
    /// 子进程没能创建出来
    LaunchFailed,
}

impl Verdict {
    pub fn classify(outcome: ChildOutcome) -> Self {
        match outcome.code() {
            0 => Self::Passed,
            TEST_WARN_CODE => Self::PassedWithWarnings,
            code => Self::Failed(code),
        }
    }

    pub fn passed(self) -> bool {
        matches!(self, Self::Passed | Self::PassedWithWarnings)
    }
}

pub struct Harness<L> {
    case_dir: PathBuf,
    launcher: L,
}

impl<L: Launcher> Harness<L> {
    pub fn new(case_dir: impl Into<PathBuf>, launcher: L) -> Self {
        Self {
            case_dir: case_dir.into(),
            launcher,
        }
    }

    /// 运行 `case_dir` 下名为 `name` 的用例，`argv[0]` 就是用例名
    pub fn run_case(&mut self, name: &str, results: &mut Results) -> Verdict {
        info!("[{name}] ...");
        let verdict = match resolve_under(&self.case_dir, name) {
            Ok(command) => match self.launcher.spawn_and_wait(&command, &[]) {
                Ok(outcome) => Verdict::classify(outcome),
                Err(err) => {
                    error!("[{name}] {err}");
                    Verdict::LaunchFailed
                }
            },
            Err(err) => {
                error!("[{name}] {err}");
                Verdict::LaunchFailed
            }
        };
        match verdict {
            Verdict::Passed => info!("[{name}] ok!"),
            Verdict::PassedWithWarnings => info!("[{name}] ok with warnings!"),
            Verdict::Failed(code) => warn!("[{name}] err [{code}]!"),
            Verdict::LaunchFailed => {}
        }
        if verdict.passed() {
            results.passed += 1;
        } else {
            results.failed += 1;
        }
        verdict
    }

    /// 依次运行 `list` 中的每个用例，空行跳过。非 UTF-8 的用例名按替换字符处理
    pub fn run_list(&mut self, list: &Path) -> Result<Results, HarnessError> {
        let file = File::open(list).map_err(|source| HarnessError::Open {
            path: list.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let mut results = Results::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(HarnessError::Read {
                        path: list.to_path_buf(),
                        results,
                        source,
                    })
                }
            }
            let line = String::from_utf8_lossy(&buf);
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            self.run_case(name, &mut results);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{RecordingLauncher, TempDir};

    #[test]
    fn verdicts() {
        assert_eq!(Verdict::classify(ChildOutcome::Exited(0)), Verdict::Passed);
        assert_eq!(
            Verdict::classify(ChildOutcome::Exited(4)),
            Verdict::PassedWithWarnings
        );
        assert_eq!(Verdict::classify(ChildOutcome::Exited(1)), Verdict::Failed(1));
        assert_eq!(
            Verdict::classify(ChildOutcome::Signaled(11)),
            Verdict::Failed(139)
        );
    }

    #[test]
    fn list_is_run_in_order() {
        let dir = TempDir::new("harness-list");
        let list = dir.write("syscalls", "read\n\nwrite\r\nmmap\nfork\n");
        let mut launcher = RecordingLauncher::default();
        launcher.fail_with.push(("/testcases/write".into(), 4));
        launcher.fail_with.push(("/testcases/mmap".into(), 1));
        launcher.refuse.push("/testcases/fork".into());
        let mut harness = Harness::new("/testcases", launcher);

        let results = harness.run_list(&list).unwrap();
        assert_eq!(results, Results { passed: 2, failed: 2 });
        assert_eq!(results.total(), 4);
        assert_eq!(
            harness.launcher.paths(),
            ["/testcases/read", "/testcases/write", "/testcases/mmap"]
        );
        assert_eq!(harness.launcher.calls[0].name, "read");
        assert!(harness.launcher.calls[0].args.is_empty());
    }

    #[test]
    fn invalid_utf8_name_does_not_stop_the_list() {
        let dir = TempDir::new("harness-utf8");
        let list = dir.join("syscalls");
        std::fs::write(&list, b"read\nwr\xffite\nmmap\n").unwrap();
        let mut harness = Harness::new("/testcases", RecordingLauncher::default());

        let results = harness.run_list(&list).unwrap();
        assert_eq!(results.total(), 3);
        assert_eq!(
            harness.launcher.paths(),
            ["/testcases/read", "/testcases/wr\u{fffd}ite", "/testcases/mmap"]
        );
    }

    #[test]
    fn missing_list_runs_nothing() {
        let dir = TempDir::new("harness-missing");
        let mut harness = Harness::new("/testcases", RecordingLauncher::default());
        let err = harness.run_list(&dir.join("syscalls")).unwrap_err();
        assert!(matches!(err, HarnessError::Open { .. }));
        assert!(harness.launcher.calls.is_empty());
    }

    #[test]
    fn summary_block() {
        let results = Results { passed: 3, failed: 1 };
        assert_eq!(
            results.to_string(),
            "==========\nPassed: 3\nFailed: 1\nTotal: 4\n=========="
        );
    }
}
