use anyhow::Result;
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::config::Config;
use crate::types::error::S3rbError;
use crate::types::{ObjectKey, ObjectVersion};

pub mod s3;

/// Type alias for a boxed Storage trait object.
pub type Storage = Box<dyn StorageTrait + Send + Sync>;

/// One page of a listing, plus the marker needed to fetch the next one.
///
/// `next_marker` is `None` on the last page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T, M> {
    pub items: Vec<T>,
    pub next_marker: Option<M>,
}

impl<T, M> ListPage<T, M> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_marker: None,
        }
    }

    pub fn with_next(items: Vec<T>, next_marker: M) -> Self {
        Self {
            items,
            next_marker: Some(next_marker),
        }
    }
}

/// Continuation state of a ListObjectVersions listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionMarker {
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
}

/// Storage operations needed to eradicate a bucket.
///
/// This is the seam between the eradication sequence and the remote
/// service: the S3 implementation lives in [`s3`], and tests substitute an
/// in-memory double. Every method performs exactly one remote call, except
/// `wait_until_bucket_not_exists`, which polls until the bucket is gone or
/// the configured wait elapses.
#[async_trait]
pub trait StorageTrait: DynClone {
    /// Apply a bucket policy document (JSON) via PutBucketPolicy.
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()>;

    /// Fetch one page of object keys via ListObjectsV2.
    ///
    /// A missing bucket is reported as
    /// [`StorageError::NoSuchBucket`](crate::types::error::StorageError::NoSuchBucket)
    /// so the caller can tell it apart from other failures.
    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage<ObjectKey, String>>;

    /// Fetch one page of object versions and delete markers whose key starts
    /// with `prefix` via ListObjectVersions.
    async fn list_object_versions(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<VersionMarker>,
    ) -> Result<ListPage<ObjectVersion, VersionMarker>>;

    /// Delete one specific object version via DeleteObject.
    async fn delete_object_version(&self, bucket: &str, key: &str, version_id: &str)
    -> Result<()>;

    /// Delete the bucket itself via DeleteBucket.
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Poll HeadBucket until the bucket no longer exists.
    async fn wait_until_bucket_not_exists(&self, bucket: &str) -> Result<()>;
}

dyn_clone::clone_trait_object!(StorageTrait);

/// Create the S3 storage used to eradicate the target bucket.
///
/// Fails with [`S3rbError::InvalidConfig`] when the configuration carries no
/// client settings.
pub async fn create_storage(config: &Config) -> Result<Storage> {
    let client_config = config.target_client_config.as_ref().ok_or_else(|| {
        anyhow::anyhow!(S3rbError::InvalidConfig(
            "no S3 client configuration was provided.".to_string()
        ))
    })?;

    Ok(s3::S3StorageFactory::create(
        client_config,
        config.max_keys,
        config.bucket_deletion_wait_timeout_seconds,
    )
    .await)
}
