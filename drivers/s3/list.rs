//! 目录列表
//!
//! Pages through a delimited list API and folds every page into one
//! sequence of entries. Common prefixes become folders, objects become
//! files, the placeholder object is dropped. Entries keep store order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::client::{ListPage, ObjectStoreClient};
use super::config::ListObjectVersion;
use super::util::{entry_name, get_key, DELIMITER};
use crate::storage::Entry;
use crate::utils::fix_and_clean_path;

#[derive(Debug, Error)]
pub enum ListError {
    /// Error returned by the store client, untouched
    #[error(transparent)]
    Store(#[from] anyhow::Error),
    /// Truncated ListObjects page without a NextMarker
    #[error("list of {prefix:?} is truncated but the store returned no next marker")]
    MissingNextMarker { prefix: String },
}

impl ListError {
    /// Hand store errors back as they were, keep contract violations typed
    pub fn into_anyhow(self) -> anyhow::Error {
        match self {
            ListError::Store(e) => e,
            other => anyhow::Error::new(other),
        }
    }
}

/// Per-driver listing settings / 列表参数
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub placeholder: String,
    /// Modified time reported for folders
    pub folder_modified: DateTime<Utc>,
}

/// One list protocol / 分页列表协议
#[async_trait]
pub trait PagedLister: Send + Sync {
    async fn list(
        &self,
        client: &dyn ObjectStoreClient,
        dir: &str,
        options: &ListOptions,
    ) -> Result<Vec<Entry>, ListError>;
}

/// ListObjects, resumed by NextMarker
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerLister;

/// ListObjectsV2, resumed by continuation token or start-after
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuationLister;

/// Pick the lister for the configured protocol / 根据配置选择协议
pub fn lister_for(version: ListObjectVersion) -> Box<dyn PagedLister> {
    match version {
        ListObjectVersion::V1 => Box::new(MarkerLister),
        ListObjectVersion::V2 => Box::new(ContinuationLister),
    }
}

struct PageCollector<'a> {
    dir: String,
    options: &'a ListOptions,
    folder_modified: String,
    entries: Vec<Entry>,
}

impl<'a> PageCollector<'a> {
    fn new(dir: &str, options: &'a ListOptions) -> Self {
        Self {
            dir: fix_and_clean_path(dir),
            options,
            folder_modified: options.folder_modified.to_rfc3339(),
            entries: Vec::new(),
        }
    }

    fn child_path(&self, name: &str) -> String {
        if self.dir == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", self.dir, name)
        }
    }

    fn collect(&mut self, page: &ListPage) {
        for prefix in &page.common_prefixes {
            let name = entry_name(prefix).to_string();
            self.entries.push(Entry {
                path: self.child_path(&name),
                name,
                is_dir: true,
                size: 0,
                modified: Some(self.folder_modified.clone()),
            });
        }
        for object in &page.objects {
            let name = entry_name(&object.key);
            if name == self.options.placeholder {
                continue;
            }
            self.entries.push(Entry {
                path: self.child_path(name),
                name: name.to_string(),
                is_dir: false,
                size: object.size,
                modified: Some(object.last_modified.clone()),
            });
        }
    }
}

#[async_trait]
impl PagedLister for MarkerLister {
    async fn list(
        &self,
        client: &dyn ObjectStoreClient,
        dir: &str,
        options: &ListOptions,
    ) -> Result<Vec<Entry>, ListError> {
        let prefix = get_key(dir, true);
        tracing::debug!("list: {}", prefix);

        let mut collector = PageCollector::new(dir, options);
        let mut marker = String::new();
        loop {
            let page = client.list_objects_v1(&prefix, DELIMITER, &marker).await?;
            collector.collect(&page);
            if !page.is_truncated {
                break;
            }
            match page.next_cursor {
                Some(next) if !next.is_empty() => marker = next,
                _ => return Err(ListError::MissingNextMarker { prefix }),
            }
        }
        Ok(collector.entries)
    }
}

#[async_trait]
impl PagedLister for ContinuationLister {
    async fn list(
        &self,
        client: &dyn ObjectStoreClient,
        dir: &str,
        options: &ListOptions,
    ) -> Result<Vec<Entry>, ListError> {
        let prefix = get_key(dir, true);
        tracing::debug!("list v2: {}", prefix);

        let mut collector = PageCollector::new(dir, options);
        let mut continuation_token: Option<String> = None;
        let mut start_after: Option<String> = None;
        loop {
            let page = client
                .list_objects_v2(
                    &prefix,
                    DELIMITER,
                    continuation_token.as_deref(),
                    start_after.as_deref(),
                )
                .await?;
            collector.collect(&page);
            if !page.is_truncated {
                break;
            }
            if let Some(token) = page.next_cursor.filter(|t| !t.is_empty()) {
                continuation_token = Some(token);
                continue;
            }
            // Stores without continuation tokens resume after the last key
            match page.objects.last() {
                Some(last) => start_after = Some(last.key.clone()),
                None => break,
            }
        }
        Ok(collector.entries)
    }
}
