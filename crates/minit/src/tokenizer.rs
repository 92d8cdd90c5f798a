use core::fmt;

use compact_str::CompactString;
use defines::config::MAX_ARGS;
use smallvec::SmallVec;

/// 一行启动脚本解析出的命令：第一个 token 是命令名，其余是参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    argv: SmallVec<[CompactString; 1 + MAX_ARGS]>,
    /// 超出参数上限而被丢弃的 token 数
    truncated: usize,
}

impl Invocation {
    /// 空行或者只有空白的行
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    pub fn command(&self) -> Option<&str> {
        self.argv.first().map(CompactString::as_str)
    }

    /// 命令名之后的参数
    pub fn args(&self) -> &[CompactString] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn argv(&self) -> &[CompactString] {
        &self.argv
    }

    pub fn truncated(&self) -> usize {
        self.truncated
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.argv.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

/// 把一行切分成 [`Invocation`]。
///
/// 分隔符是任意长度的空格和制表符，行尾的 `\n`（或 `\r\n`）会先被去掉。
/// 只保留命令名和前 `max_args` 个参数，多出来的直接丢弃，丢弃的个数记录在 [`Invocation::truncated`]。
/// 没有引号、注释、续行和变量展开。
pub fn tokenize(line: &str, max_args: usize) -> Invocation {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut tokens = line
        .split(|ch| ch == ' ' || ch == '\t')
        .filter(|token| !token.is_empty());
    let argv = tokens
        .by_ref()
        .take(max_args.saturating_add(1))
        .map(CompactString::from)
        .collect();
    Invocation {
        argv,
        truncated: tokens.count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_spaces_and_tabs() {
        let inv = tokenize("mount  -t\tproc proc /proc\n", MAX_ARGS);
        assert_eq!(inv.command(), Some("mount"));
        assert_eq!(inv.args(), ["-t", "proc", "proc", "/proc"]);
        assert_eq!(inv.truncated(), 0);
        assert_eq!(inv.to_string(), "mount -t proc proc /proc");
    }

    #[test]
    fn blank_lines_are_empty() {
        for line in ["", "\n", "   \t \n", "\r\n"] {
            let inv = tokenize(line, MAX_ARGS);
            assert!(inv.is_empty(), "{line:?}");
            assert_eq!(inv.command(), None);
            assert!(inv.args().is_empty());
        }
    }

    #[test]
    fn crlf_terminator_is_stripped() {
        let inv = tokenize("echo hi\r\n", MAX_ARGS);
        assert_eq!(inv.argv(), ["echo", "hi"]);
    }

    #[test]
    fn excess_tokens_are_dropped() {
        let line = "cmd 1 2 3 4 5 6 7 8 9 10 11 12";
        let inv = tokenize(line, MAX_ARGS);
        assert_eq!(inv.argv().len(), 1 + MAX_ARGS);
        assert_eq!(inv.args().last().map(CompactString::as_str), Some("9"));
        assert_eq!(inv.truncated(), 3);
        assert!(!inv.argv().iter().any(|token| token == "10"));
    }

    #[test]
    fn truncation_is_deterministic() {
        let line = "a b c d e f";
        assert_eq!(tokenize(line, 2), tokenize(line, 2));
        assert_eq!(tokenize(line, 2).argv(), ["a", "b", "c"]);
        assert_eq!(tokenize(line, 0).argv(), ["a"]);
    }

    #[test]
    fn unbounded_max_args_keeps_every_token() {
        let inv = tokenize("echo hi there", usize::MAX);
        assert_eq!(inv.argv(), ["echo", "hi", "there"]);
        assert_eq!(inv.truncated(), 0);
    }
}
