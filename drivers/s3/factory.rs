//! S3驱动工厂

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::storage::{ConfigItem, DriverFactory, StorageDriver};
use super::config::S3Config;
use super::driver::S3Driver;

/// S3驱动工厂
pub struct S3DriverFactory;

impl DriverFactory for S3DriverFactory {
    fn driver_type(&self) -> &'static str {
        "s3"
    }

    fn display_name(&self) -> &'static str {
        "S3"
    }

    fn config_items(&self) -> Vec<ConfigItem> {
        vec![
            ConfigItem::new("bucket", "string")
                .help("S3存储桶名称")
                .required(),
            ConfigItem::new("endpoint", "string")
                .help("S3端点URL，留空使用AWS默认端点"),
            ConfigItem::new("region", "string")
                .help("S3区域，如 us-east-1、cn-hangzhou")
                .default("us-east-1"),
            ConfigItem::new("access_key_id", "string").required(),
            ConfigItem::new("secret_access_key", "password").required(),
            ConfigItem::new("session_token", "password")
                .help("临时凭证的会话令牌（可选）"),
            ConfigItem::new("root_path", "string")
                .help("存储桶内的根目录路径")
                .default("/"),
            ConfigItem::new("custom_host", "string")
                .help("CDN加速域名（可选），只用于下载链接"),
            ConfigItem::new("sign_url_expire", "number")
                .help("预签名URL过期时间（小时）")
                .default("4"),
            ConfigItem::new("force_path_style", "bool")
                .help("MinIO等需要开启此选项")
                .default("false"),
            ConfigItem::new("placeholder", "string")
                .help("用于模拟空目录的占位文件名")
                .default(".placeholder"),
            ConfigItem::new("list_object_version", "select")
                .help("v1: ListObjects + NextMarker, v2: ListObjectsV2")
                .options("v1,v2")
                .default("v1"),
            ConfigItem::new("folder_modified", "string")
                .help("RFC 3339时间，留空使用挂载时间"),
        ]
    }

    fn create_driver(&self, config: Value) -> Result<Box<dyn StorageDriver>> {
        let config: S3Config = serde_json::from_value(config)
            .map_err(|e| anyhow!("配置解析失败: {}", e))?;
        Ok(Box::new(S3Driver::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_info() {
        let info = S3DriverFactory.driver_info();
        assert_eq!(info.name, "S3");
        assert_eq!(info.items[0].name, "mount_path");

        let required: Vec<&str> = info
            .items
            .iter()
            .filter(|i| i.required)
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["mount_path", "bucket", "access_key_id", "secret_access_key"]
        );

        let version = info
            .items
            .iter()
            .find(|i| i.name == "list_object_version")
            .unwrap();
        assert_eq!(version.options.as_deref(), Some("v1,v2"));
        assert_eq!(version.default.as_deref(), Some("v1"));
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let err = S3DriverFactory
            .create_driver(serde_json::json!({ "bucket": "media" }))
            .err()
            .unwrap();
        assert!(err.to_string().contains("配置解析失败"));
    }
}
