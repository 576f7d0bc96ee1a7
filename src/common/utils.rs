use nanoid::nanoid;

// ==========================================
// ID 生成工具 (Identity Utilities)
// ==========================================

/// 生成全局唯一的任务 ID (NanoID)
///
/// - 长度: 21 字符
/// - 字符集: 0-9a-zA-Z (去掉 `-` 和 `_`，方便双击选中)
#[inline]
pub fn new_task_id() -> String {
    const ALPHABET: [char; 62] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
        'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
        'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
        'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    ];
    nanoid!(21, &ALPHABET)
}

/// 默认工作池名称：`主机名-随机串`
///
/// 只用于日志区分同一台机器上的多个池。
pub fn default_pool_name() -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "aosfs".to_string());
    format!("{}-{}", host, nanoid!(5, &nanoid::alphabet::SAFE))
}
