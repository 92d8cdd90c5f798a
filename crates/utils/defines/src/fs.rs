use bitflags::bitflags;

bitflags! {
    /// `mount(2)` 的 flags
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MountFlags : u32 {
        const MS_RDONLY         = 1 <<  0;
        const MS_NOSUID         = 1 <<  1;
        const MS_NODEV          = 1 <<  2;
        const MS_NOEXEC         = 1 <<  3;
        const MS_SYNCHRONOUS    = 1 <<  4;
        const MS_REMOUNT        = 1 <<  5;
        const MS_MANDLOCK       = 1 <<  6;
        const MS_DIRSYNC        = 1 <<  7;
        const MS_NOSYMFOLLOW    = 1 <<  8;
        const MS_NOATIME        = 1 <<  9;
        const MS_NODIRATIME     = 1 << 10;
        const MS_BIND           = 1 << 11;
        const MS_MOVE           = 1 << 12;
        const MS_REC            = 1 << 13;
        const MS_SILENT         = 1 << 14;
        const MS_RELATIME       = 1 << 21;
        const MS_STRICTATIME    = 1 << 24;
        const MS_LAZYTIME       = 1 << 25;

        // 旧内核要求高 16 位带上的魔数，现在的内核会直接忽略
        const MS_MGC_VAL        = 0xC0ED_0000;
    }
}

impl MountFlags {
    /// 把挂载表中的 options 字段直接按数字解释。
    ///
    /// 和 C 的 `atoi` 一样只认开头的十进制数字，`defaults`、`rw` 之类的符号选项都会得到空 flags
    pub fn from_numeric_options(options: &str) -> Self {
        let options = options.trim_start();
        let (negative, digits) = match options.as_bytes().first() {
            Some(b'-') => (true, &options[1..]),
            Some(b'+') => (false, &options[1..]),
            _ => (false, options),
        };
        let mut value: u32 = 0;
        for ch in digits.bytes().take_while(u8::is_ascii_digit) {
            value = value.wrapping_mul(10).wrapping_add(u32::from(ch - b'0'));
        }
        if negative {
            value = value.wrapping_neg();
        }
        Self::from_bits_retain(value)
    }
}
