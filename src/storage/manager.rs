use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use anyhow::{anyhow, Result};
use serde_json::Value;

use super::{mount_items, ConfigItem, DriverInfo, StorageDriver};
use crate::utils::{fix_and_clean_path, get_actual_path, is_sub_path};

pub type DriverBox = Arc<Box<dyn StorageDriver>>;

/// Driver factory trait / 驱动工厂 trait
pub trait DriverFactory: Send + Sync {
    /// Driver type name / 驱动类型名称
    fn driver_type(&self) -> &'static str;

    /// 创建驱动实例
    fn create_driver(&self, config: Value) -> Result<Box<dyn StorageDriver>>;

    /// Human readable driver name / 驱动显示名称
    fn display_name(&self) -> &'static str;

    /// Return driver specific config items / 返回驱动特有配置项
    fn config_items(&self) -> Vec<ConfigItem>;

    /// Mount items followed by the driver's own / 生成完整的驱动信息
    fn driver_info(&self) -> DriverInfo {
        let mut items = mount_items();
        items.extend(self.config_items());
        DriverInfo {
            name: self.display_name().to_string(),
            items,
        }
    }
}

/// Storage manager (manages all driver instances, keyed by mount path) / 存储管理器
#[derive(Clone)]
pub struct StorageManager {
    drivers: Arc<RwLock<HashMap<String, DriverBox>>>,
    factories: Arc<RwLock<HashMap<String, Arc<Box<dyn DriverFactory>>>>>,
    /// Driver error status (mount path -> error message) / 驱动错误状态
    driver_errors: Arc<RwLock<HashMap<String, String>>>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self {
            drivers: Arc::new(RwLock::new(HashMap::new())),
            factories: Arc::new(RwLock::new(HashMap::new())),
            driver_errors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register driver factory / 注册驱动工厂
    pub async fn register_factory(&self, factory: Box<dyn DriverFactory>) -> Result<()> {
        let driver_type = factory.driver_type().to_string();
        let factory_box = Arc::new(factory);

        let mut factories = self.factories.write().await;
        factories.insert(driver_type.clone(), factory_box);

        tracing::info!("Driver factory registered: {}", driver_type);
        Ok(())
    }

    /// Create driver instance (verify on success, record error on failure) / 创建驱动实例
    pub async fn create_driver(&self, mount_path: &str, driver_type: &str, config: Value) -> Result<String> {
        let id = fix_and_clean_path(mount_path);
        let factory = {
            let factories = self.factories.read().await;
            factories.get(driver_type)
                .cloned()
                .ok_or_else(|| anyhow!("Driver type not found: {}", driver_type))?
        };

        match factory.create_driver(config) {
            Ok(driver) => {
                let driver_box: DriverBox = Arc::new(driver);

                // Verify driver validity: try list root directory / 验证驱动有效性
                let validation_result = driver_box.list("/").await;

                let mut drivers = self.drivers.write().await;
                drivers.insert(id.clone(), driver_box);
                drop(drivers);

                match validation_result {
                    Ok(_) => {
                        self.clear_driver_error(&id).await;
                        tracing::info!("Driver created and verified: {} ({})", id, driver_type);
                    }
                    Err(e) => {
                        // Verification failed, driver still mounted / 验证失败
                        let error_msg = e.to_string();
                        self.set_driver_error(&id, error_msg.clone()).await;
                        tracing::warn!("Driver created but verification failed: {} ({}) - {}", id, driver_type, error_msg);
                    }
                }

                Ok(id)
            }
            Err(e) => {
                let error_msg = e.to_string();
                self.set_driver_error(&id, error_msg.clone()).await;
                tracing::error!("Driver creation failed: {} ({}) - {}", id, driver_type, error_msg);
                Err(e)
            }
        }
    }

    /// Set driver error status / 设置驱动错误状态
    pub async fn set_driver_error(&self, id: &str, error: String) {
        let mut errors = self.driver_errors.write().await;
        errors.insert(id.to_string(), error);
    }

    /// Clear driver error status / 清除驱动错误状态
    pub async fn clear_driver_error(&self, id: &str) {
        let mut errors = self.driver_errors.write().await;
        errors.remove(id);
    }

    /// Get driver error status / 获取驱动错误状态
    pub async fn get_driver_error(&self, id: &str) -> Option<String> {
        let errors = self.driver_errors.read().await;
        errors.get(id).cloned()
    }

    /// Get driver instance / 获取驱动实例
    pub async fn get_driver(&self, mount_path: &str) -> Option<DriverBox> {
        let drivers = self.drivers.read().await;
        drivers.get(&fix_and_clean_path(mount_path)).cloned()
    }

    /// Remove driver instance / 移除驱动实例
    pub async fn remove_driver(&self, mount_path: &str) -> Result<()> {
        let id = fix_and_clean_path(mount_path);
        let mut drivers = self.drivers.write().await;
        drivers.remove(&id)
            .ok_or_else(|| anyhow!("Driver not found: {}", id))?;
        drop(drivers);
        self.clear_driver_error(&id).await;

        tracing::info!("Driver removed: {}", id);
        Ok(())
    }

    /// List all mount paths / 列出所有挂载路径
    pub async fn list_drivers(&self) -> Vec<String> {
        let drivers = self.drivers.read().await;
        let mut mounts: Vec<String> = drivers.keys().cloned().collect();
        mounts.sort();
        mounts
    }

    /// Get info of all registered driver types / 获取所有驱动类型信息
    pub async fn list_driver_infos(&self) -> Vec<(String, DriverInfo)> {
        let factories = self.factories.read().await;
        let mut infos: Vec<(String, DriverInfo)> = factories
            .iter()
            .map(|(k, f)| (k.clone(), f.driver_info()))
            .collect();
        infos.sort_by(|a, b| a.0.cmp(&b.0));
        infos
    }

    /// Resolve path to corresponding driver and relative path
    /// Returns (driver instance, relative path) / 根据路径解析到对应的驱动
    pub async fn resolve_path(&self, path: &str) -> Option<(DriverBox, String)> {
        let drivers = self.drivers.read().await;
        let path = fix_and_clean_path(path);

        // Longest matching mount point wins / 找到最长匹配的挂载点
        drivers
            .iter()
            .filter(|(mount, _)| is_sub_path(mount, &path))
            .max_by_key(|(mount, _)| mount.len())
            .map(|(mount, driver)| (driver.clone(), get_actual_path(mount, &path)))
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Capability, Entry};
    use async_trait::async_trait;

    struct EchoDriver {
        label: String,
        fail_list: bool,
    }

    #[async_trait]
    impl StorageDriver for EchoDriver {
        fn name(&self) -> &str {
            &self.label
        }

        fn version(&self) -> &str {
            "test"
        }

        fn capabilities(&self) -> Capability {
            Capability::default()
        }

        async fn list(&self, _path: &str) -> Result<Vec<Entry>> {
            if self.fail_list {
                return Err(anyhow!("bucket unreachable"));
            }
            Ok(Vec::new())
        }

        async fn copy_item(&self, _old_path: &str, _new_path: &str, _is_dir: bool) -> Result<()> {
            Ok(())
        }
    }

    struct EchoFactory;

    impl DriverFactory for EchoFactory {
        fn driver_type(&self) -> &'static str {
            "echo"
        }

        fn create_driver(&self, config: Value) -> Result<Box<dyn StorageDriver>> {
            let label = config["label"]
                .as_str()
                .ok_or_else(|| anyhow!("missing label"))?
                .to_string();
            let fail_list = config["fail_list"].as_bool().unwrap_or(false);
            Ok(Box::new(EchoDriver { label, fail_list }))
        }

        fn display_name(&self) -> &'static str {
            "Echo"
        }

        fn config_items(&self) -> Vec<ConfigItem> {
            vec![ConfigItem::new("label", "string").required()]
        }
    }

    async fn manager() -> StorageManager {
        let manager = StorageManager::new();
        manager.register_factory(Box::new(EchoFactory)).await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_resolve_longest_mount() {
        let manager = manager().await;
        manager.create_driver("/", "echo", serde_json::json!({"label": "root"})).await.unwrap();
        manager.create_driver("/s3/", "echo", serde_json::json!({"label": "s3"})).await.unwrap();

        let (driver, rel) = manager.resolve_path("/s3/docs/a.txt").await.unwrap();
        assert_eq!(driver.name(), "s3");
        assert_eq!(rel, "/docs/a.txt");

        let (driver, rel) = manager.resolve_path("/s3x/a").await.unwrap();
        assert_eq!(driver.name(), "root");
        assert_eq!(rel, "/s3x/a");
    }

    #[tokio::test]
    async fn test_verification_failure_is_recorded() {
        let manager = manager().await;
        let id = manager
            .create_driver("/broken", "echo", serde_json::json!({"label": "b", "fail_list": true}))
            .await
            .unwrap();

        assert!(manager.get_driver(&id).await.is_some());
        assert_eq!(manager.get_driver_error("/broken").await.as_deref(), Some("bucket unreachable"));

        manager.remove_driver("/broken").await.unwrap();
        assert!(manager.get_driver_error("/broken").await.is_none());
        assert!(manager.list_drivers().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_driver_type() {
        let manager = manager().await;
        let err = manager
            .create_driver("/x", "ftp", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Driver type not found"));
    }

    #[tokio::test]
    async fn test_factory_error_is_recorded() {
        let manager = manager().await;
        assert!(manager.create_driver("/x", "echo", serde_json::json!({})).await.is_err());
        assert_eq!(manager.get_driver_error("/x").await.as_deref(), Some("missing label"));
    }

    #[tokio::test]
    async fn test_driver_info_lists_mount_items_first() {
        let manager = manager().await;
        let infos = manager.list_driver_infos().await;
        assert_eq!(infos.len(), 1);

        let (driver_type, info) = &infos[0];
        assert_eq!(driver_type, "echo");
        assert_eq!(info.name, "Echo");
        let names: Vec<&str> = info.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["mount_path", "order", "label"]);

        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["items"][2]["type"], "string");
        assert!(json["items"][2].get("default").is_none());
        assert!(json.get("local_sort").is_none());
    }
}
