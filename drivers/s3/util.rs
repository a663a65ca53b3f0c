//! 对象键转换

use crate::utils::base_name;

/// Storage path separator / 路径分隔符
pub const DELIMITER: char = '/';

/// Convert a logical path into a storage key / 逻辑路径转换为对象键
///
/// One leading separator is stripped. Directories end with exactly one
/// separator and files with none; the bucket root stays `""`.
pub fn get_key(path: &str, is_dir: bool) -> String {
    let key = path.strip_prefix(DELIMITER).unwrap_or(path);
    let key = key.trim_end_matches(DELIMITER);
    if key.is_empty() || !is_dir {
        return key.to_string();
    }
    format!("{}{}", key, DELIMITER)
}

/// Display name of an object key or common prefix / 对象键或公共前缀的显示名
pub fn entry_name(key: &str) -> &str {
    base_name(key.trim_matches(DELIMITER))
}
