//! fstab 格式的挂载表。
//!
//! 每行 `source target fstype [options [freq [passno]]]`，字段之间是任意空白。
//! options 字段按十进制数字解析成挂载标志，和 `atoi` 一样遇到非数字就停下。

use std::{
    borrow::Cow,
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use compact_str::CompactString;
use defines::fs::MountFlags;

use super::{MountEntry, MountError};

/// 一行挂载表的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRecord {
    /// 空行或者注释
    Blank,
    Entry(MountEntry),
    /// 字段不足三个
    Malformed,
}

/// 解码 getmntent 风格的八进制转义，比如 `\040` 表示空格
fn unescape(field: &str) -> Cow<'_, str> {
    if !field.contains('\\') {
        return Cow::Borrowed(field);
    }
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let decoded = match tail.get(..3) {
            Some("040") => Some(' '),
            Some("011") => Some('\t'),
            Some("012") => Some('\n'),
            Some("134") => Some('\\'),
            _ => None,
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &tail[3..];
            }
            None => {
                out.push('\\');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

pub fn parse_record(line: &str) -> TableRecord {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return TableRecord::Blank;
    }
    let mut fields = line.split_whitespace();
    let (Some(source), Some(target), Some(fs_type)) = (fields.next(), fields.next(), fields.next())
    else {
        return TableRecord::Malformed;
    };
    let options = fields.next().unwrap_or("defaults");
    let flags = MountFlags::from_numeric_options(options);
    TableRecord::Entry(MountEntry {
        source: CompactString::from(unescape(source)),
        target: PathBuf::from(unescape(target).into_owned()),
        fs_type: CompactString::from(unescape(fs_type)),
        flags,
        data: None,
    })
}

/// 逐条产出挂载表中的记录，跳过空行和注释
pub struct MountTable<R> {
    reader: R,
    path: PathBuf,
    line_no: usize,
}

impl<R: BufRead> MountTable<R> {
    pub fn new(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for MountTable<R> {
    type Item = Result<MountEntry, MountError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Some(Err(MountError::ReadTable {
                        path: self.path.clone(),
                        source,
                    }))
                }
            }
            self.line_no += 1;
            let line = String::from_utf8_lossy(&buf);
            match parse_record(&line) {
                TableRecord::Blank => continue,
                TableRecord::Entry(entry) => return Some(Ok(entry)),
                TableRecord::Malformed => {
                    return Some(Err(MountError::Malformed {
                        path: self.path.clone(),
                        line_no: self.line_no,
                        line: line.trim_end().to_owned(),
                    }))
                }
            }
        }
    }
}
