//! Application configuration module / 应用配置模块
//!
//! Storages are loaded from config.json. A default config file is created on
//! first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mounted storages / 挂载的存储
    #[serde(default)]
    pub storages: Vec<StorageConfig>,
}

/// One mounted storage / 存储挂载配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Mount path, must be unique / 挂载路径
    pub mount_path: String,
    /// Driver type / 驱动类型
    #[serde(default = "default_driver")]
    pub driver: String,
    /// Sort order / 排序
    #[serde(default)]
    pub order: i32,
    /// Driver specific config / 驱动配置
    #[serde(default)]
    pub config: Value,
}

fn default_driver() -> String {
    "s3".to_string()
}

impl AppConfig {
    /// Storages in mount order / 按顺序排列的存储
    pub fn ordered_storages(&self) -> Vec<&StorageConfig> {
        let mut storages: Vec<&StorageConfig> = self.storages.iter().collect();
        storages.sort_by_key(|s| s.order);
        storages
    }
}

/// Get the default config file path / 获取配置文件路径
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config(config_path: &Path) -> Result<AppConfig, String> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(config_path, &config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config_path: &Path, config: &AppConfig) -> Result<(), String> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}
