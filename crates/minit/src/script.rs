//! 启动脚本解释器。
//!
//! 每一行是一条命令，逐行执行，每条命令结束后才会读下一行。
//! 某一行失败不会影响后面的行，脚本是尽力而为的。

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use derive_more::{Display, Error};

use crate::{
    launcher::{ChildOutcome, Launcher},
    resolve::resolve,
    tokenizer::{tokenize, Invocation},
};

#[derive(Debug, Display, Error)]
pub enum ScriptError {
    #[display("cannot open script {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("failed reading script {} after {lines} lines: {source}", path.display())]
    Read {
        path: PathBuf,
        lines: usize,
        source: io::Error,
    },
}

/// 一个脚本执行下来的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptReport {
    /// 读到的行数
    pub lines: usize,
    /// 空行
    pub skipped: usize,
    /// 成功创建了子进程（或者 exec 失败）的行
    pub launched: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 子进程没能创建出来的行
    pub launch_errors: usize,
    /// 命令名无法解析的行
    pub unresolved: usize,
    /// 因为超出参数上限而丢掉的 token 总数
    pub truncated_tokens: usize,
}

/// 执行一条命令的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Skipped,
    Unresolved,
    LaunchFailed,
    Finished(ChildOutcome),
}

impl ScriptReport {
    fn record(&mut self, outcome: LineOutcome) {
        match outcome {
            LineOutcome::Skipped => self.skipped += 1,
            LineOutcome::Unresolved => self.unresolved += 1,
            LineOutcome::LaunchFailed => self.launch_errors += 1,
            LineOutcome::Finished(child) => {
                self.launched += 1;
                if child.success() {
                    self.succeeded += 1;
                } else {
                    self.failed += 1;
                }
            }
        }
    }

    /// 有没有任何一行没有成功
    pub fn has_failures(&self) -> bool {
        self.failed + self.launch_errors + self.unresolved > 0
    }
}

pub struct Interpreter<L> {
    search_dir: PathBuf,
    max_args: usize,
    launcher: L,
}

impl<L: Launcher> Interpreter<L> {
    pub fn new(search_dir: impl Into<PathBuf>, max_args: usize, launcher: L) -> Self {
        Self {
            search_dir: search_dir.into(),
            max_args,
            launcher,
        }
    }

    pub fn max_args(&self) -> usize {
        self.max_args
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// 打开并执行脚本。打不开时不会运行任何命令
    pub fn run_file(&mut self, path: &Path) -> Result<ScriptReport, ScriptError> {
        let file = File::open(path).map_err(|source| ScriptError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!("running script {}", path.display());
        let report = self.run_reader(BufReader::new(file), path)?;
        info!(
            "script {} done: {} launched, {} ok, {} failed",
            path.display(),
            report.launched,
            report.succeeded,
            report.failed + report.launch_errors + report.unresolved,
        );
        Ok(report)
    }

    /// 从 `reader` 逐行读取并执行，`path` 只用于报错
    pub fn run_reader(
        &mut self,
        mut reader: impl BufRead,
        path: &Path,
    ) -> Result<ScriptReport, ScriptError> {
        let mut report = ScriptReport::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ScriptError::Read {
                        path: path.to_path_buf(),
                        lines: report.lines,
                        source,
                    })
                }
            }
            report.lines += 1;
            // 非 UTF-8 的内容按替换字符处理，不让整个脚本失败
            let line = String::from_utf8_lossy(&buf);
            let invocation = tokenize(&line, self.max_args);
            if invocation.truncated() > 0 {
                warn!(
                    "{}:{}: dropped {} token(s) beyond {} arguments",
                    path.display(),
                    report.lines,
                    invocation.truncated(),
                    self.max_args,
                );
                report.truncated_tokens += invocation.truncated();
            }
            let outcome = self.execute(&invocation);
            report.record(outcome);
        }
        Ok(report)
    }

    /// 解析并运行一条命令，等待其结束。失败只记日志
    pub fn execute(&mut self, invocation: &Invocation) -> LineOutcome {
        let Some(name) = invocation.command() else {
            return LineOutcome::Skipped;
        };
        let command = match resolve(name, &self.search_dir) {
            Ok(command) => command,
            Err(err) => {
                warn!("cannot resolve `{name}`: {err}");
                return LineOutcome::Unresolved;
            }
        };
        info!("[{name}] ...");
        match self.launcher.spawn_and_wait(&command, invocation.args()) {
            Ok(child) if child.success() => {
                info!("[{name}] ok!");
                LineOutcome::Finished(child)
            }
            Ok(child) => {
                warn!("[{name}] err: {child}");
                LineOutcome::Finished(child)
            }
            Err(err) => {
                error!("[{name}] {err}");
                LineOutcome::LaunchFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use compact_str::CompactString;
    use defines::config::MAX_ARGS;

    use super::*;
    use crate::test_util::{RecordingLauncher, TempDir};

    fn interpreter() -> Interpreter<RecordingLauncher> {
        Interpreter::new("/sbin", MAX_ARGS, RecordingLauncher::default())
    }

    fn run(script: &str) -> (ScriptReport, RecordingLauncher) {
        let mut interpreter = interpreter();
        let report = interpreter
            .run_reader(Cursor::new(script.as_bytes()), Path::new("rcS"))
            .unwrap();
        (report, interpreter.launcher)
    }

    #[test]
    fn every_line_launches_once_in_order() {
        let (report, launcher) = run("echo one\n/bin/echo two\n./three\nfour");
        assert_eq!(report.lines, 4);
        assert_eq!(report.launched, 4);
        assert_eq!(report.succeeded, 4);
        assert_eq!(
            launcher.paths(),
            ["/sbin/echo", "/bin/echo", "./three", "/sbin/four"]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (report, launcher) = run("\n  \t\nmount -a\n\n");
        assert_eq!(report.lines, 4);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.launched, 1);
        assert_eq!(launcher.paths(), ["/sbin/mount"]);
        assert_eq!(launcher.calls[0].args, ["-a"]);
    }

    #[test]
    fn failure_does_not_stop_the_script() {
        let mut interpreter = interpreter();
        interpreter.launcher.fail_with.push(("/bin/false".into(), 1));
        let report = interpreter
            .run_reader(Cursor::new("/bin/false\n/bin/true\n"), Path::new("rcS"))
            .unwrap();
        assert_eq!(report.launched, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.succeeded, 1);
        assert!(report.has_failures());
        assert_eq!(interpreter.launcher.paths(), ["/bin/false", "/bin/true"]);
    }

    #[test]
    fn launch_error_does_not_stop_the_script() {
        let mut interpreter = interpreter();
        interpreter.launcher.refuse.push("/sbin/hog".into());
        let report = interpreter
            .run_reader(Cursor::new("hog\nok\n"), Path::new("rcS"))
            .unwrap();
        assert_eq!(report.launch_errors, 1);
        assert_eq!(report.launched, 1);
        assert_eq!(report.succeeded, 1);
    }

    #[test]
    fn truncated_tokens_never_reach_argv() {
        let (report, launcher) = run("cmd a1 a2 a3 a4 a5 a6 a7 a8 a9 a10 a11\n");
        assert_eq!(report.truncated_tokens, 2);
        let args = &launcher.calls[0].args;
        assert_eq!(args.len(), MAX_ARGS);
        assert_eq!(args.last().map(CompactString::as_str), Some("a9"));
        assert!(!args.iter().any(|arg| arg == "a10" || arg == "a11"));
    }

    #[test]
    fn overlong_command_name_is_unresolved() {
        let script = format!("{}\nnext\n", "x".repeat(300));
        let (report, launcher) = run(&script);
        assert_eq!(report.unresolved, 1);
        assert_eq!(launcher.paths(), ["/sbin/next"]);
    }

    #[test]
    fn invalid_utf8_line_still_runs() {
        let mut interpreter = interpreter();
        let report = interpreter
            .run_reader(Cursor::new(b"echo \xff\xfe\nnext\n".to_vec()), Path::new("rcS"))
            .unwrap();
        assert_eq!(report.launched, 2);
    }

    #[test]
    fn unreadable_script_launches_nothing() {
        let dir = TempDir::new("script-missing");
        let mut interpreter = interpreter();
        let err = interpreter.run_file(&dir.join("rcS")).unwrap_err();
        assert!(matches!(err, ScriptError::Open { .. }));
        assert!(interpreter.launcher.calls.is_empty());
    }

    #[test]
    fn script_file_is_read_from_disk() {
        let dir = TempDir::new("script-file");
        let path = dir.write("rcS", "mount -a\nprocfs\n");
        let mut interpreter = interpreter();
        let report = interpreter.run_file(&path).unwrap();
        assert_eq!(report.launched, 2);
        assert_eq!(interpreter.launcher.paths(), ["/sbin/mount", "/sbin/procfs"]);
    }
}
