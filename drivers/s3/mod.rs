//! S3对象存储驱动
//!
//! Presents a flat bucket as a directory tree: keys are grouped one level
//! deep with the `/` delimiter, common prefixes become folders.

pub mod client;
pub mod config;
pub mod driver;
pub mod factory;
pub mod list;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{BucketClient, CustomHostRewrite, ObjectStoreClient, RequestDecorator};
pub use config::{ListObjectVersion, S3Config};
pub use driver::S3Driver;
pub use factory::S3DriverFactory;
pub use list::{ContinuationLister, ListError, MarkerLister, PagedLister};
