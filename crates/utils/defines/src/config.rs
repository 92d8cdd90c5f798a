//! init 及其配套程序使用的默认值和限制

/// 裸命令名会被拼接到这个目录下
pub const DEFAULT_SEARCH_DIR: &str = "/sbin";
/// 启动脚本
pub const DEFAULT_SCRIPT_PATH: &str = "/etc/init.d/rcS";
/// 批量挂载时读取的挂载表
pub const DEFAULT_FSTAB_PATH: &str = "/etc/fstab";
/// procfs 的挂载点
pub const DEFAULT_PROC_DIR: &str = "/proc";
/// 挂载阶段结束后默认拉起的虚拟文件系统服务
pub const DEFAULT_SERVICE: &str = "procfs";

/// 启动脚本中一行最多保留的参数个数（不含命令名本身）
pub const MAX_ARGS: usize = 9;

/// 新建挂载点目录时使用的权限
pub const MOUNT_POINT_MODE: u32 = 0o755;

/// 单个路径分量的最大长度
pub const NAME_MAX: usize = 255;
/// 整个路径的最大长度，包括结尾的 `\0`
pub const PATH_MAX: usize = 4096;

/// 找不到可执行文件时子进程的退出码，与 shell 保持一致
pub const EXIT_NOT_FOUND: i32 = 127;
/// 找到了文件但无法执行时子进程的退出码
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// 测试用例列表
pub const DEFAULT_TEST_LIST: &str = "/opt/syscalls";
/// 测试用例所在目录
pub const DEFAULT_CASE_DIR: &str = "/testcases";
/// LTP 的 `TWARN`，视为带警告的通过
pub const TEST_WARN_CODE: i32 = 4;
