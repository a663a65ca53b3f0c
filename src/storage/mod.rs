use async_trait::async_trait;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One setting a driver accepts in its mount config / 驱动配置项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    /// string / password / number / bool / select
    #[serde(rename = "type")]
    pub kind: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Comma separated choices of a `select` item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ConfigItem {
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            required: false,
            default: None,
            options: None,
            help: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, val: &str) -> Self {
        self.default = Some(val.to_string());
        self
    }

    pub fn options(mut self, val: &str) -> Self {
        self.options = Some(val.to_string());
        self
    }

    pub fn help(mut self, val: &str) -> Self {
        self.help = Some(val.to_string());
        self
    }
}

/// What the `drivers` listing shows for one driver type / 驱动类型说明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverInfo {
    pub name: String,
    /// Mount items followed by the driver's own items
    pub items: Vec<ConfigItem>,
}

/// Items every mount carries regardless of driver / 挂载通用配置项
pub fn mount_items() -> Vec<ConfigItem> {
    vec![
        ConfigItem::new("mount_path", "string")
            .required()
            .help("Mount path, must be unique"),
        ConfigItem::new("order", "number")
            .default("0")
            .help("Mount order"),
    ]
}

/// File entry information / 文件条目信息
///
/// Identity is positional within one listing; `path` is the logical path
/// the entry was listed under, not a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<String>,
}

/// Driver capability declaration / 驱动能力声明
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capability {
    /// Support direct link download (302 redirect) / 支持直链下载
    pub can_direct_link: bool,
    /// Support server-side copy (no download needed) / 支持服务端复制
    pub can_server_side_copy: bool,
    /// Copy of a directory also copies its children / 目录复制包含子项
    pub can_recursive_copy: bool,
}

/// Storage driver interface (provides only primitive operations) / 存储驱动接口
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Driver name / 驱动名称
    fn name(&self) -> &str;

    /// Driver version / 驱动版本
    fn version(&self) -> &str;

    /// Driver capabilities / 驱动能力
    fn capabilities(&self) -> Capability;

    /// List directory contents / 列出目录内容
    async fn list(&self, path: &str) -> Result<Vec<Entry>>;

    /// Copy a single file or directory marker / 复制文件或目录
    async fn copy_item(&self, old_path: &str, new_path: &str, is_dir: bool) -> Result<()>;

    /// Get direct link URL (if supported) / 获取直链 URL
    async fn get_direct_link(&self, _path: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

pub mod manager;

pub use manager::{StorageManager, DriverFactory, DriverBox};
