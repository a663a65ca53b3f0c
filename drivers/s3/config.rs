//! S3驱动配置

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder object name used when none is configured / 默认目录占位文件名
pub const DEFAULT_PLACEHOLDER: &str = ".placeholder";

/// Which list protocol the store speaks / 列表协议版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListObjectVersion {
    /// ListObjects, paginated by marker / 基于marker分页
    #[default]
    V1,
    /// ListObjectsV2, paginated by continuation token / 基于continuation token分页
    V2,
}

/// S3配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// 存储桶名称
    pub bucket: String,
    /// S3端点地址
    /// AWS: https://s3.{region}.amazonaws.com
    /// MinIO: http://localhost:9000
    #[serde(default)]
    pub endpoint: String,
    /// 区域
    #[serde(default = "default_region")]
    pub region: String,
    /// Access Key ID
    pub access_key_id: String,
    /// Secret Access Key
    pub secret_access_key: String,
    /// Session Token（用于临时凭证）
    #[serde(default)]
    pub session_token: String,
    /// 根目录路径
    #[serde(default = "default_root")]
    pub root_path: String,
    /// 自定义域名（只作用于读取类请求生成的链接）
    #[serde(default)]
    pub custom_host: String,
    /// 预签名URL过期时间（小时）
    #[serde(default = "default_sign_expire")]
    pub sign_url_expire: u32,
    /// 强制使用路径风格（而非虚拟主机风格）
    #[serde(default)]
    pub force_path_style: bool,
    /// 目录占位文件名，为空时使用 `.placeholder`
    #[serde(default)]
    pub placeholder: String,
    /// 列表协议版本
    #[serde(default)]
    pub list_object_version: ListObjectVersion,
    /// 目录条目的修改时间（对象存储没有目录元数据）
    #[serde(default)]
    pub folder_modified: Option<DateTime<Utc>>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_root() -> String {
    "/".to_string()
}

fn default_sign_expire() -> u32 {
    4
}

impl S3Config {
    /// 获取占位文件名
    pub fn placeholder_name(&self) -> &str {
        if self.placeholder.is_empty() {
            DEFAULT_PLACEHOLDER
        } else {
            &self.placeholder
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            endpoint: String::new(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            session_token: String::new(),
            root_path: default_root(),
            custom_host: String::new(),
            sign_url_expire: default_sign_expire(),
            force_path_style: false,
            placeholder: String::new(),
            list_object_version: ListObjectVersion::default(),
            folder_modified: None,
        }
    }
}
