//! In-memory store used by the driver tests

use std::collections::VecDeque;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::{ListPage, ObjectRecord, ObjectStoreClient};

/// A request as the store saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListV1 { prefix: String, delimiter: char, marker: String },
    ListV2 {
        prefix: String,
        delimiter: char,
        continuation_token: Option<String>,
        start_after: Option<String>,
    },
    Copy { src: String, dst: String },
    Presign { key: String, expire_secs: u32 },
}

/// Replays queued pages in order and records every request
#[derive(Default)]
pub struct MockStore {
    pages: Mutex<VecDeque<Result<ListPage>>>,
    copy_error: Mutex<Option<String>>,
    requests: Mutex<Vec<Request>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, page: ListPage) -> Self {
        self.pages.lock().push_back(Ok(page));
        self
    }

    pub fn with_error(self, message: &str) -> Self {
        self.pages.lock().push_back(Err(anyhow!(message.to_string())));
        self
    }

    pub fn failing_copy(self, message: &str) -> Self {
        *self.copy_error.lock() = Some(message.to_string());
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    fn next_page(&self) -> Result<ListPage> {
        self.pages
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no more pages queued")))
    }
}

#[async_trait]
impl ObjectStoreClient for MockStore {
    async fn list_objects_v1(&self, prefix: &str, delimiter: char, marker: &str) -> Result<ListPage> {
        self.requests.lock().push(Request::ListV1 {
            prefix: prefix.to_string(),
            delimiter,
            marker: marker.to_string(),
        });
        self.next_page()
    }

    async fn list_objects_v2(
        &self,
        prefix: &str,
        delimiter: char,
        continuation_token: Option<&str>,
        start_after: Option<&str>,
    ) -> Result<ListPage> {
        self.requests.lock().push(Request::ListV2 {
            prefix: prefix.to_string(),
            delimiter,
            continuation_token: continuation_token.map(str::to_string),
            start_after: start_after.map(str::to_string),
        });
        self.next_page()
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.requests.lock().push(Request::Copy {
            src: src_key.to_string(),
            dst: dst_key.to_string(),
        });
        match self.copy_error.lock().clone() {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }

    async fn presign_get(&self, key: &str, expire_secs: u32) -> Result<String> {
        self.requests.lock().push(Request::Presign {
            key: key.to_string(),
            expire_secs,
        });
        Ok(format!("https://store.test/bucket/{}?expires={}", key, expire_secs))
    }
}

pub fn object(key: &str, size: u64) -> ObjectRecord {
    ObjectRecord {
        key: key.to_string(),
        size,
        last_modified: "2024-05-01T10:00:00.000Z".to_string(),
    }
}

pub fn page(prefixes: &[&str], objects: Vec<ObjectRecord>, is_truncated: bool, next_cursor: Option<&str>) -> ListPage {
    ListPage {
        common_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        objects,
        is_truncated,
        next_cursor: next_cursor.map(str::to_string),
    }
}
