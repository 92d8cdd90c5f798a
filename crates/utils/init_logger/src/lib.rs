//! init 的日志后端。
//!
//! 控制台和日志文件各自有独立的级别（`clog` 和 `flog`），默认值在编译期由
//! `INIT_CLOG`、`INIT_FLOG` 两个环境变量决定，运行时可以覆盖。

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    sync::Mutex,
};

use anstyle::{AnsiColor, Reset};
use derive_more::{Display, Error, From};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

pub const CLOG: LevelFilter = decide_log_level(option_env!("INIT_CLOG"), LevelFilter::Info);
pub const FLOG: LevelFilter = decide_log_level(option_env!("INIT_FLOG"), LevelFilter::Off);

const fn decide_log_level(level_str: Option<&str>, default: LevelFilter) -> LevelFilter {
    const fn str_eq(lhs: &str, rhs: &str) -> bool {
        let lhs = lhs.as_bytes();
        let rhs = rhs.as_bytes();

        if lhs.len() != rhs.len() {
            return false;
        }
        let mut i = 0;
        while i < lhs.len() {
            if lhs[i] != rhs[i] {
                return false;
            }
            i += 1;
        }
        true
    }

    if let Some(level_str) = level_str {
        if str_eq(level_str, "TRACE") {
            LevelFilter::Trace
        } else if str_eq(level_str, "DEBUG") {
            LevelFilter::Debug
        } else if str_eq(level_str, "INFO") {
            LevelFilter::Info
        } else if str_eq(level_str, "WARN") {
            LevelFilter::Warn
        } else if str_eq(level_str, "ERROR") {
            LevelFilter::Error
        } else {
            LevelFilter::Off
        }
    } else {
        default
    }
}

/// 运行时解析日志级别，大小写不敏感。`NONE` 等同于 `OFF`
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    if level.eq_ignore_ascii_case("NONE") {
        return Some(LevelFilter::Off);
    }
    level.parse().ok()
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// 控制台日志级别
    pub clog: LevelFilter,
    /// 文件日志级别，只有设置了 `log_file` 才生效
    pub flog: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            clog: CLOG,
            flog: FLOG,
            log_file: None,
        }
    }
}

#[derive(Debug, Display, Error, From)]
pub enum LoggerError {
    #[display("cannot open log file: {_0}")]
    OpenFile(io::Error),
    #[display("logger already installed: {_0}")]
    SetLogger(SetLoggerError),
}

struct InitLogger {
    clog: LevelFilter,
    flog: LevelFilter,
    file: Option<Mutex<File>>,
}

impl Log for InitLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.clog || (self.file.is_some() && metadata.level() <= self.flog)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // 日志写失败了也没有别的地方可以报告，直接忽略
        if record.level() <= self.clog {
            let _ = write_log(&mut io::stdout().lock(), record, true);
        }
        if record.level() <= self.flog {
            if let Some(file) = &self.file {
                if let Ok(mut file) = file.lock() {
                    let _ = write_log(&mut *file, record, false);
                }
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

fn write_log(writer: &mut impl Write, record: &Record<'_>, colored: bool) -> io::Result<()> {
    // 开头部分，即日志级别，如 `[ INFO]`
    if colored {
        let color = match record.level() {
            Level::Error => AnsiColor::Red,
            Level::Warn => AnsiColor::BrightYellow,
            Level::Info => AnsiColor::Blue,
            Level::Debug => AnsiColor::Green,
            Level::Trace => AnsiColor::BrightBlack,
        };
        write!(
            writer,
            "{}[{:>5}]{} ",
            color.render_fg(),
            record.level(),
            Reset.render()
        )?;
    } else {
        write!(writer, "[{:>5}] ", record.level())?;
    }

    // 日志信息部分
    writeln!(writer, "{}", record.args())
}

/// 安装全局 logger，整个进程只能调用一次
pub fn init(config: LoggerConfig) -> Result<(), LoggerError> {
    let file = match &config.log_file {
        Some(path) if config.flog != LevelFilter::Off => Some(Mutex::new(
            OpenOptions::new().create(true).append(true).open(path)?,
        )),
        _ => None,
    };
    let max_level = if file.is_some() {
        config.clog.max(config.flog)
    } else {
        config.clog
    };
    log::set_boxed_logger(Box::new(InitLogger {
        clog: config.clog,
        flog: config.flog,
        file,
    }))?;
    log::set_max_level(max_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_level_strings() {
        assert_eq!(decide_log_level(Some("TRACE"), LevelFilter::Off), LevelFilter::Trace);
        assert_eq!(decide_log_level(Some("WARN"), LevelFilter::Off), LevelFilter::Warn);
        assert_eq!(decide_log_level(Some("NONE"), LevelFilter::Info), LevelFilter::Off);
        assert_eq!(decide_log_level(None, LevelFilter::Info), LevelFilter::Info);
    }

    #[test]
    fn runtime_level_strings() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("INFO"), Some(LevelFilter::Info));
        assert_eq!(parse_level("none"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn plain_record_layout() {
        let mut buf = Vec::new();
        write_log(
            &mut buf,
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("mount {} failed", "/proc"))
                .build(),
            false,
        )
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[ WARN] mount /proc failed\n");
    }

    #[test]
    fn colored_record_keeps_message() {
        let mut buf = Vec::new();
        write_log(
            &mut buf,
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("mount phase done"))
                .build(),
            true,
        )
        .unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert!(line.contains("[ INFO]"));
        assert!(line.ends_with("mount phase done\n"));
        assert!(line.starts_with('\u{1b}'));
    }
}
