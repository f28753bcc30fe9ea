//! Bucket eradication.
//!
//! [`BucketEradicator`] runs the whole sequence against one bucket:
//!
//! 1. Apply a deny-`s3:PutObject` bucket policy so nothing new lands in the
//!    bucket while it is being emptied.
//! 2. List every object key (all pages).
//! 3. List every version and delete marker of each object (all pages).
//! 4. Delete each discovered version, in discovery order.
//! 5. Delete the bucket.
//! 6. Wait until the bucket is reported absent.
//!
//! Every remote call is awaited before the next one is issued. The first
//! failure stops the run and is returned as the [`S3rbError`] variant of the
//! failing step. The deny-write policy is left in place on failure.
//!
//! A bucket that no longer exists when objects are listed is treated as
//! already eradicated.

use tracing::{debug, info};

use crate::lister::{ObjectKeySource, ObjectVersionSource, Paginator};
use crate::policy::deny_put_object_policy;
use crate::storage::Storage;
use crate::types::error::{S3rbError, is_no_such_bucket_error};
use crate::types::{ObjectKey, ObjectVersion};


pub struct BucketEradicator {
    storage: Storage,
    bucket: String,
}

impl BucketEradicator {
    pub fn new(storage: Storage, bucket: &str) -> Self {
        Self {
            storage,
            bucket: bucket.to_string(),
        }
    }

    /// Empty and delete the bucket, then wait until it is gone.
    ///
    /// Returns `Ok(())` when the bucket was deleted and confirmed absent, or
    /// when it did not exist at listing time.
    pub async fn eradicate(&self) -> Result<(), S3rbError> {
        info!(bucket = self.bucket.as_str(), "bucket eradication started.");

        self.deny_put_object().await?;

        let Some(keys) = self.list_object_keys().await? else {
            info!(
                bucket = self.bucket.as_str(),
                "bucket does not exist. nothing to delete."
            );
            return Ok(());
        };

        let versions = self.list_object_versions(&keys).await?;
        self.delete_object_versions(&versions).await?;
        self.delete_bucket().await?;
        self.wait_until_bucket_not_exists().await?;

        info!(
            bucket = self.bucket.as_str(),
            objects = keys.len(),
            versions = versions.len(),
            "bucket eradication completed."
        );

        Ok(())
    }

    async fn deny_put_object(&self) -> Result<(), S3rbError> {
        let policy_failed = |source| S3rbError::PolicyApplyFailed {
            bucket: self.bucket.clone(),
            source,
        };

        let policy = deny_put_object_policy(&self.bucket).map_err(policy_failed)?;
        self.storage
            .put_bucket_policy(&self.bucket, &policy)
            .await
            .map_err(policy_failed)?;

        info!(
            bucket = self.bucket.as_str(),
            "deny PutObject bucket policy applied."
        );

        Ok(())
    }

    /// `Ok(None)` means the bucket does not exist.
    async fn list_object_keys(&self) -> Result<Option<Vec<ObjectKey>>, S3rbError> {
        let mut paginator = Paginator::new(ObjectKeySource::new(&self.storage, &self.bucket));
        let mut keys = Vec::new();

        loop {
            match paginator.next_page().await {
                Ok(Some(page)) => keys.extend(page),
                Ok(None) => break,
                Err(e) if is_no_such_bucket_error(&e) => return Ok(None),
                Err(e) => {
                    return Err(S3rbError::ListObjectsFailed {
                        bucket: self.bucket.clone(),
                        source: e,
                    });
                }
            }
        }

        info!(
            bucket = self.bucket.as_str(),
            objects = keys.len(),
            pages = paginator.pages_fetched(),
            "object listing completed."
        );

        Ok(Some(keys))
    }

    async fn list_object_versions(
        &self,
        keys: &[ObjectKey],
    ) -> Result<Vec<ObjectVersion>, S3rbError> {
        let mut versions = Vec::new();

        for key in keys {
            let source = ObjectVersionSource::new(&self.storage, &self.bucket, key);
            let listed = Paginator::new(source).collect_all().await.map_err(|e| {
                S3rbError::ListVersionsFailed {
                    bucket: self.bucket.clone(),
                    key: key.clone(),
                    source: e,
                }
            })?;

            // The key is used as a prefix, so longer keys sharing it come back too.
            let before = versions.len();
            versions.extend(listed.into_iter().filter(|version| version.key == *key));

            debug!(
                bucket = self.bucket.as_str(),
                key = key.as_str(),
                versions = versions.len() - before,
                "object versions listed."
            );
        }

        info!(
            bucket = self.bucket.as_str(),
            versions = versions.len(),
            "object version listing completed."
        );

        Ok(versions)
    }

    async fn delete_object_versions(&self, versions: &[ObjectVersion]) -> Result<(), S3rbError> {
        for version in versions {
            self.storage
                .delete_object_version(&self.bucket, &version.key, &version.version_id)
                .await
                .map_err(|e| S3rbError::DeleteVersionFailed {
                    bucket: self.bucket.clone(),
                    key: version.key.clone(),
                    version_id: version.version_id.clone(),
                    source: e,
                })?;

            debug!(
                bucket = self.bucket.as_str(),
                key = version.key.as_str(),
                version_id = version.version_id.as_str(),
                delete_marker = version.is_delete_marker,
                "object version deleted."
            );
        }

        info!(
            bucket = self.bucket.as_str(),
            deleted = versions.len(),
            "all object versions deleted."
        );

        Ok(())
    }

    async fn delete_bucket(&self) -> Result<(), S3rbError> {
        self.storage
            .delete_bucket(&self.bucket)
            .await
            .map_err(|e| S3rbError::DeleteBucketFailed {
                bucket: self.bucket.clone(),
                source: e,
            })?;

        info!(bucket = self.bucket.as_str(), "bucket deleted.");

        Ok(())
    }

    async fn wait_until_bucket_not_exists(&self) -> Result<(), S3rbError> {
        self.storage
            .wait_until_bucket_not_exists(&self.bucket)
            .await
            .map_err(|e| S3rbError::BucketConfirmationFailed {
                bucket: self.bucket.clone(),
                source: e,
            })?;

        info!(bucket = self.bucket.as_str(), "bucket deletion confirmed.");

        Ok(())
    }
}
