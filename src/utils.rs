/// Path processing utility functions / 路径处理工具函数

/// Clean and normalize path / 清理和规范化路径
/// 1. Replace backslashes with forward slashes / 将反斜杠替换为正斜杠
/// 2. Ensure path starts with / / 确保路径以 / 开头
/// 3. Clean . and .. in path / 清理路径中的 . 和 ..
pub fn fix_and_clean_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    };

    clean_path(&path)
}

/// Clean path, handle ., .. and duplicate / / 清理路径，处理 . 和 .. 和重复的 /
fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Join a driver root with a path inside it / 拼接根目录和相对路径
/// "/data" + "a/b" -> "/data/a/b"
pub fn join_path(root: &str, path: &str) -> String {
    let root = fix_and_clean_path(root);
    let path = fix_and_clean_path(path);

    if root == "/" {
        path
    } else if path == "/" {
        root
    } else {
        format!("{}{}", root, path)
    }
}

/// Last segment of a slash separated path, trailing slashes ignored / 获取路径最后一段
/// "a/b/" -> "b", "a/f.txt" -> "f.txt", "/" -> "/"
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// 从挂载路径中提取实际路径
/// mount_path: 挂载点路径，如 "/s3"
/// raw_path: 请求的完整路径，如 "/s3/documents"
/// 返回实际路径: "/documents"
pub fn get_actual_path(mount_path: &str, raw_path: &str) -> String {
    let mount_path = fix_and_clean_path(mount_path);
    let raw_path = fix_and_clean_path(raw_path);

    let actual = raw_path.strip_prefix(&mount_path).unwrap_or(&raw_path);
    fix_and_clean_path(actual)
}

/// Check if sub_path is a subpath of path / 判断 sub_path 是否是 path 的子路径
pub fn is_sub_path(path: &str, sub_path: &str) -> bool {
    let path = fix_and_clean_path(path);
    let sub_path = fix_and_clean_path(sub_path);

    if path == sub_path || path == "/" {
        return true;
    }

    sub_path.starts_with(&format!("{}/", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_and_clean_path() {
        assert_eq!(fix_and_clean_path(""), "/");
        assert_eq!(fix_and_clean_path("."), "/");
        assert_eq!(fix_and_clean_path("../.."), "/");
        assert_eq!(fix_and_clean_path("a/b/c"), "/a/b/c");
        assert_eq!(fix_and_clean_path("a\\b\\c"), "/a/b/c");
        assert_eq!(fix_and_clean_path("/a//b///c/"), "/a/b/c");
        assert_eq!(fix_and_clean_path("/a/./b/../c"), "/a/c");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "/a/b"), "/a/b");
        assert_eq!(join_path("", "a"), "/a");
        assert_eq!(join_path("/data/", "/"), "/data");
        assert_eq!(join_path("data", "x/y"), "/data/x/y");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("a/b/"), "b");
        assert_eq!(base_name("a/f.txt"), "f.txt");
        assert_eq!(base_name("f.txt"), "f.txt");
        assert_eq!(base_name("a/.placeholder"), ".placeholder");
        assert_eq!(base_name("/"), "/");
    }

    #[test]
    fn test_get_actual_path() {
        assert_eq!(get_actual_path("/s3", "/s3/documents"), "/documents");
        assert_eq!(get_actual_path("/s3", "/s3"), "/");
        assert_eq!(get_actual_path("/", "/documents"), "/documents");
    }

    #[test]
    fn test_is_sub_path() {
        assert!(is_sub_path("/s3", "/s3/a"));
        assert!(is_sub_path("/s3", "/s3"));
        assert!(is_sub_path("/", "/anything"));
        assert!(!is_sub_path("/s3", "/s3x/a"));
    }
}
