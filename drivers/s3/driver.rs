//! S3驱动核心实现
//!
//! - list: 分页列出目录（ListObjects / ListObjectsV2）
//! - copy_item: 单次服务端CopyObject，目录只复制目录标记本身
//! - get_direct_link: 预签名URL，可选自定义域名

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::client::{BucketClient, ObjectStoreClient};
use super::config::S3Config;
use super::list::{lister_for, ListError, ListOptions, PagedLister};
use super::util::get_key;
use crate::storage::{Capability, Entry, StorageDriver};
use crate::utils::{fix_and_clean_path, get_actual_path, join_path};

/// S3驱动
pub struct S3Driver {
    config: S3Config,
    client: Arc<dyn ObjectStoreClient>,
    lister: Box<dyn PagedLister>,
    folder_modified: DateTime<Utc>,
}

impl S3Driver {
    /// 创建新的S3驱动实例
    pub fn new(config: S3Config) -> Result<Self> {
        let client = BucketClient::from_config(&config)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Use an already built store client / 使用已有的存储客户端
    pub fn with_client(config: S3Config, client: Arc<dyn ObjectStoreClient>) -> Self {
        let lister = lister_for(config.list_object_version);
        let folder_modified = config.folder_modified.unwrap_or_else(Utc::now);
        Self {
            config,
            client,
            lister,
            folder_modified,
        }
    }

    /// Logical path inside the bucket, root applied / 拼接根目录
    fn bucket_path(&self, path: &str) -> String {
        join_path(&self.config.root_path, path)
    }

    fn list_options(&self) -> ListOptions {
        ListOptions {
            placeholder: self.config.placeholder_name().to_string(),
            folder_modified: self.folder_modified,
        }
    }
}

#[async_trait]
impl StorageDriver for S3Driver {
    fn name(&self) -> &str {
        "S3"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn capabilities(&self) -> Capability {
        Capability {
            can_direct_link: true,
            can_server_side_copy: true,
            can_recursive_copy: false,
        }
    }

    async fn list(&self, path: &str) -> Result<Vec<Entry>> {
        let dir = self.bucket_path(path);
        let mut entries = self
            .lister
            .list(self.client.as_ref(), &dir, &self.list_options())
            .await
            .map_err(ListError::into_anyhow)?;

        let root = fix_and_clean_path(&self.config.root_path);
        if root != "/" {
            for entry in &mut entries {
                entry.path = get_actual_path(&root, &entry.path);
            }
        }
        Ok(entries)
    }

    async fn copy_item(&self, old_path: &str, new_path: &str, is_dir: bool) -> Result<()> {
        let src_key = get_key(&self.bucket_path(old_path), is_dir);
        let dst_key = get_key(&self.bucket_path(new_path), is_dir);

        tracing::debug!("S3 CopyObject: src_key={}, dst_key={}", src_key, dst_key);

        self.client.copy_object(&src_key, &dst_key).await
    }

    async fn get_direct_link(&self, path: &str) -> Result<Option<String>> {
        let key = get_key(&self.bucket_path(path), false);
        let expire_secs = self.config.sign_url_expire.max(1).saturating_mul(3600);

        let url = self.client.presign_get(&key, expire_secs).await?;
        Ok(Some(url))
    }
}
