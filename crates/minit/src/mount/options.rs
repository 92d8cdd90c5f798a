use std::ffi::OsString;

/// 把逗号分隔的 `new` 合并进 `acc`。
///
/// 已经存在的键不会重复加入，空键直接忽略。`key=value` 形式按整个字符串比较。
pub fn append_mount_options(acc: &mut String, new: &str) {
    for key in new.split(',') {
        if key.is_empty() || acc.split(',').any(|existing| existing == key) {
            continue;
        }
        if !acc.is_empty() {
            acc.push(',');
        }
        acc.push_str(key);
    }
}

/// 从命令行参数中取出所有 `--` 开头的长选项，去掉前缀后合并成一个选项串。
///
/// 返回剩下的参数以及合并后的选项串。非 UTF-8 的长选项无法作为选项串传递，原样保留在参数里。
pub fn fold_long_options(args: Vec<OsString>) -> (Vec<OsString>, String) {
    let mut opts = String::new();
    let mut rest = Vec::with_capacity(args.len());
    for arg in args {
        match arg.to_str().and_then(|s| s.strip_prefix("--")) {
            Some(opt) => append_mount_options(&mut opts, opt),
            None => rest.push(arg),
        }
    }
    (rest, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_skips_existing_keys() {
        let mut acc = String::from("noexec");
        append_mount_options(&mut acc, "rw,noexec");
        assert_eq!(acc, "noexec,rw");
        append_mount_options(&mut acc, "rw,noexec");
        assert_eq!(acc, "noexec,rw");
    }

    #[test]
    fn empty_keys_are_ignored() {
        let mut acc = String::new();
        append_mount_options(&mut acc, ",ro,,size=1m,");
        assert_eq!(acc, "ro,size=1m");
        append_mount_options(&mut acc, "");
        assert_eq!(acc, "ro,size=1m");
    }

    #[test]
    fn long_options_are_removed_from_args() {
        let args = ["mount", "--ro", "-t", "tmpfs", "--size=1m,ro", "none", "/tmp"]
            .into_iter()
            .map(OsString::from)
            .collect();
        let (rest, opts) = fold_long_options(args);
        assert_eq!(rest, ["mount", "-t", "tmpfs", "none", "/tmp"]);
        assert_eq!(opts, "ro,size=1m");
    }
}
