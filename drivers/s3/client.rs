//! 对象存储客户端
//!
//! The listing engine and copy adapter only see [`ObjectStoreClient`]; the
//! rust-s3 session lives behind [`BucketClient`], built once from the config
//! and shared immutably.

use std::borrow::Borrow;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::command::HttpMethod;
use s3::creds::Credentials;
use s3::serde_types::ListBucketResult;
use s3::Region;
use url::Url;

use super::config::S3Config;

/// One object record of a list page / 列表页中的对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub key: String,
    pub size: u64,
    pub last_modified: String,
}

/// One page of a delimited list request / 一页列表结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Common prefixes, i.e. candidate subfolders
    pub common_prefixes: Vec<String>,
    pub objects: Vec<ObjectRecord>,
    pub is_truncated: bool,
    /// NextMarker for ListObjects, NextContinuationToken for ListObjectsV2
    pub next_cursor: Option<String>,
}

/// Store operations used by the driver / 驱动使用的存储原语
///
/// A client is bound to one bucket. Each call is a single request; no retry
/// happens at this level.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// ListObjects, resumed by `marker` (empty for the first page)
    async fn list_objects_v1(&self, prefix: &str, delimiter: char, marker: &str) -> Result<ListPage>;

    /// ListObjectsV2, resumed by continuation token or start-after key
    async fn list_objects_v2(
        &self,
        prefix: &str,
        delimiter: char,
        continuation_token: Option<&str>,
        start_after: Option<&str>,
    ) -> Result<ListPage>;

    /// Server side CopyObject within the bucket
    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()>;

    /// Presigned GET url for `key`
    async fn presign_get(&self, key: &str, expire_secs: u32) -> Result<String>;
}

/// Hook on the endpoint a request is signed for / 签名前的请求改写钩子
///
/// Runs before signing, so whatever it changes is covered by the signature.
pub trait RequestDecorator: Send + Sync {
    fn decorate(&self, method: &HttpMethod, endpoint: &mut Url);
}

/// Replace the host of read requests with a custom (CDN) host / 自定义域名改写
#[derive(Debug, Clone)]
pub struct CustomHostRewrite {
    scheme: Option<String>,
    host: String,
    port: Option<u16>,
}

impl CustomHostRewrite {
    /// Accepts `cdn.example.com`, `cdn.example.com:8443` or `https://cdn.example.com`
    pub fn new(custom_host: &str) -> Result<Self> {
        let raw = custom_host.trim().trim_end_matches('/');
        let has_scheme = raw.contains("://");
        let parsed = if has_scheme {
            Url::parse(raw)
        } else {
            Url::parse(&format!("https://{}", raw))
        }
        .map_err(|e| anyhow!("invalid custom host {:?}: {}", custom_host, e))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| anyhow!("invalid custom host {:?}: no host", custom_host))?
            .to_string();

        Ok(Self {
            scheme: has_scheme.then(|| parsed.scheme().to_string()),
            host,
            port: parsed.port(),
        })
    }
}

impl RequestDecorator for CustomHostRewrite {
    fn decorate(&self, method: &HttpMethod, endpoint: &mut Url) {
        if !matches!(method, HttpMethod::Get) {
            return;
        }
        if let Some(scheme) = &self.scheme {
            if endpoint.set_scheme(scheme).is_err() {
                tracing::debug!("custom host: cannot switch scheme to {}", scheme);
            }
        }
        if endpoint.set_host(Some(self.host.as_str())).is_ok() && endpoint.set_port(self.port).is_err() {
            tracing::debug!("custom host: cannot set port on {}", endpoint);
        }
    }
}

/// rust-s3 backed client / 基于rust-s3的客户端
pub struct BucketClient {
    bucket: Bucket,
    legacy: Bucket,
    /// Signs download links, endpoint already passed through the GET decorators
    link: Bucket,
}

impl BucketClient {
    /// Build the bucket session from config / 根据配置创建会话
    pub fn from_config(config: &S3Config) -> Result<Self> {
        let mut decorators: Vec<Arc<dyn RequestDecorator>> = Vec::new();
        if !config.custom_host.is_empty() {
            decorators.push(Arc::new(CustomHostRewrite::new(&config.custom_host)?));
        }
        Self::with_decorators(config, &decorators)
    }

    pub fn with_decorators(
        config: &S3Config,
        decorators: &[Arc<dyn RequestDecorator>],
    ) -> Result<Self> {
        let endpoint = Url::parse(&endpoint_of(config))
            .map_err(|e| anyhow!("invalid endpoint {:?}: {}", config.endpoint, e))?;
        let bucket = create_bucket(config, &endpoint)?;
        let legacy = unboxed(bucket.with_listobjects_v1());

        let mut link_endpoint = endpoint.clone();
        for decorator in decorators {
            decorator.decorate(&HttpMethod::Get, &mut link_endpoint);
        }
        let link = if link_endpoint == endpoint {
            bucket.clone()
        } else {
            tracing::debug!("download links signed for {}", link_endpoint);
            create_bucket(config, &link_endpoint)?
        };

        Ok(Self { bucket, legacy, link })
    }
}

fn endpoint_of(config: &S3Config) -> String {
    if config.endpoint.is_empty() {
        format!("https://s3.{}.amazonaws.com", config.region)
    } else {
        config.endpoint.clone()
    }
}

/// 创建S3 Bucket客户端
fn create_bucket(config: &S3Config, endpoint: &Url) -> Result<Bucket> {
    let credentials = Credentials::new(
        Some(&config.access_key_id),
        Some(&config.secret_access_key),
        if config.session_token.is_empty() { None } else { Some(&config.session_token) },
        None,
        None,
    )
    .map_err(|e| anyhow!("创建S3凭证失败: {}", e))?;

    let region = Region::Custom {
        region: config.region.clone(),
        endpoint: endpoint.as_str().trim_end_matches('/').to_string(),
    };

    let bucket = Bucket::new(&config.bucket, region, credentials)
        .map_err(|e| anyhow!("创建S3 Bucket失败: {}", e))?;

    let bucket = if config.force_path_style {
        unboxed(bucket.with_path_style())
    } else {
        unboxed(bucket)
    };
    Ok(bucket)
}

/// rust-s3 builders hand back either `Bucket` or `Box<Bucket>`
fn unboxed<B: Borrow<Bucket>>(bucket: B) -> Bucket {
    bucket.borrow().clone()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn into_page(result: ListBucketResult) -> ListPage {
    ListPage {
        common_prefixes: result
            .common_prefixes
            .unwrap_or_default()
            .into_iter()
            .map(|cp| cp.prefix)
            .collect(),
        objects: result
            .contents
            .into_iter()
            .map(|obj| ObjectRecord {
                key: obj.key,
                size: obj.size as u64,
                last_modified: obj.last_modified,
            })
            .collect(),
        is_truncated: result.is_truncated,
        // rust-s3 reads NextMarker into the same field for ListObjects
        next_cursor: result.next_continuation_token,
    }
}

#[async_trait]
impl ObjectStoreClient for BucketClient {
    async fn list_objects_v1(&self, prefix: &str, delimiter: char, marker: &str) -> Result<ListPage> {
        let (result, _) = self
            .legacy
            .list_page(
                prefix.to_string(),
                Some(delimiter.to_string()),
                non_empty(Some(marker)),
                None,
                None,
            )
            .await?;
        Ok(into_page(result))
    }

    async fn list_objects_v2(
        &self,
        prefix: &str,
        delimiter: char,
        continuation_token: Option<&str>,
        start_after: Option<&str>,
    ) -> Result<ListPage> {
        let (result, _) = self
            .bucket
            .list_page(
                prefix.to_string(),
                Some(delimiter.to_string()),
                non_empty(continuation_token),
                non_empty(start_after),
                None,
            )
            .await?;
        Ok(into_page(result))
    }

    async fn copy_object(&self, src_key: &str, dst_key: &str) -> Result<()> {
        // copy_object_internal的from参数需要URL编码（中文等非ASCII字符）
        let encoded_src = urlencoding::encode(src_key);
        self.bucket.copy_object_internal(&encoded_src, dst_key).await?;
        Ok(())
    }

    async fn presign_get(&self, key: &str, expire_secs: u32) -> Result<String> {
        Ok(self.link.presign_get(key, expire_secs, None).await?)
    }
}
