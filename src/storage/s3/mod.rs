pub mod client_builder;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::client::Waiters;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::list_object_versions::ListObjectVersionsOutput;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::storage::{ListPage, Storage, StorageTrait, VersionMarker};
use crate::types::error::StorageError;
use crate::types::{ObjectKey, ObjectVersion};

/// Version id S3 reports for objects written while versioning was off.
const NULL_VERSION_ID: &str = "null";

/// Extracts the S3 error code and message from an AWS SDK error.
///
/// For service errors (S3 API responses), returns the S3 error code
/// (e.g. "AccessDenied", "BucketNotEmpty") and the message from the
/// response. For other error types (network, timeout, construction
/// failure), returns "N/A" as the code and the full error description.
fn extract_sdk_error_details<E: std::fmt::Display + ProvideErrorMetadata>(
    e: &SdkError<E>,
) -> (String, String) {
    if let Some(service_err) = e.as_service_error() {
        (
            service_err.code().unwrap_or("unknown").to_string(),
            service_err.message().unwrap_or("no message").to_string(),
        )
    } else {
        ("N/A".to_string(), e.to_string())
    }
}

/// Factory for creating S3 storage instances.
pub struct S3StorageFactory;

impl S3StorageFactory {
    pub async fn create(
        client_config: &ClientConfig,
        max_keys: i32,
        bucket_deletion_wait_timeout_seconds: u64,
    ) -> Storage {
        let client = Arc::new(client_config.create_client().await);

        Box::new(S3Storage {
            client,
            max_keys,
            bucket_deletion_wait_timeout: Duration::from_secs(
                bucket_deletion_wait_timeout_seconds,
            ),
        })
    }
}

/// S3 storage backed by the AWS SDK.
#[derive(Clone)]
struct S3Storage {
    client: Arc<Client>,
    max_keys: i32,
    bucket_deletion_wait_timeout: Duration,
}

#[async_trait]
impl StorageTrait for S3Storage {
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                error!(
                    bucket = bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 PutBucketPolicy API call failed for bucket '{}': {} ({}).",
                    bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow!(e).context("aws_sdk_s3::client::put_bucket_policy() failed.")
            })?;

        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage<ObjectKey, String>> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token)
            .max_keys(self.max_keys)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|service_err| service_err.is_no_such_bucket())
                {
                    debug!(bucket = bucket, "ListObjectsV2 reported NoSuchBucket.");
                    return anyhow!(StorageError::NoSuchBucket(bucket.to_string()));
                }

                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                error!(
                    bucket = bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 ListObjectsV2 API call failed for s3://{}: {} ({}).",
                    bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow!(e).context("aws_sdk_s3::client::list_objects_v2() failed.")
            })?;

        Ok(object_keys_page(&output))
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        prefix: &str,
        marker: Option<VersionMarker>,
    ) -> Result<ListPage<ObjectVersion, VersionMarker>> {
        let marker = marker.unwrap_or_default();

        let output = self
            .client
            .list_object_versions()
            .bucket(bucket)
            .prefix(prefix)
            .set_key_marker(marker.key_marker)
            .set_version_id_marker(marker.version_id_marker)
            .max_keys(self.max_keys)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                error!(
                    bucket = bucket,
                    prefix = prefix,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 ListObjectVersions API call failed for s3://{}/{}: {} ({}).",
                    bucket,
                    prefix,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow!(e).context("aws_sdk_s3::client::list_object_versions() failed.")
            })?;

        Ok(object_versions_page(&output))
    }

    async fn delete_object_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .version_id(version_id)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                error!(
                    bucket = bucket,
                    key = key,
                    version_id = version_id,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 DeleteObject API call failed for s3://{}/{}: {} ({}).",
                    bucket,
                    key,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow!(e).context("aws_sdk_s3::client::delete_object() failed.")
            })?;

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                let (s3_error_code, s3_error_message) = extract_sdk_error_details(&e);
                error!(
                    bucket = bucket,
                    s3_error_code = s3_error_code,
                    s3_error_message = s3_error_message,
                    "S3 DeleteBucket API call failed for bucket '{}': {} ({}).",
                    bucket,
                    s3_error_code,
                    s3_error_message,
                );
                anyhow!(e).context("aws_sdk_s3::client::delete_bucket() failed.")
            })?;

        Ok(())
    }

    async fn wait_until_bucket_not_exists(&self, bucket: &str) -> Result<()> {
        self.client
            .wait_until_bucket_not_exists()
            .bucket(bucket)
            .wait(self.bucket_deletion_wait_timeout)
            .await
            .map_err(|e| {
                error!(
                    bucket = bucket,
                    max_wait_seconds = self.bucket_deletion_wait_timeout.as_secs(),
                    "waiting for bucket '{}' to be deleted failed: {}.",
                    bucket,
                    e,
                );
                anyhow!(e).context("aws_sdk_s3::client::wait_until_bucket_not_exists() failed.")
            })?;

        Ok(())
    }
}

fn object_keys_page(output: &ListObjectsV2Output) -> ListPage<ObjectKey, String> {
    let items = output
        .contents()
        .iter()
        .filter_map(|object| {
            let key = object.key();
            if key.is_none() {
                warn!("ListObjectsV2 returned an object without a key. skipped.");
            }
            key.map(String::from)
        })
        .collect();

    let next_marker = if output.is_truncated() == Some(true) {
        let token = output.next_continuation_token().map(String::from);
        if token.is_none() {
            warn!("ListObjectsV2 response is truncated but has no continuation token.");
        }
        token
    } else {
        None
    };

    ListPage { items, next_marker }
}

/// Versions come before delete markers within a page.
fn object_versions_page(
    output: &ListObjectVersionsOutput,
) -> ListPage<ObjectVersion, VersionMarker> {
    let versions = output.versions().iter().filter_map(|version| {
        version.key().map(|key| {
            ObjectVersion::new(key, version.version_id().unwrap_or(NULL_VERSION_ID))
        })
    });
    let delete_markers = output.delete_markers().iter().filter_map(|marker| {
        marker.key().map(|key| {
            ObjectVersion::delete_marker(key, marker.version_id().unwrap_or(NULL_VERSION_ID))
        })
    });
    let items = versions.chain(delete_markers).collect();

    let next_marker = if output.is_truncated() == Some(true) {
        let marker = VersionMarker {
            key_marker: output.next_key_marker().map(String::from),
            version_id_marker: output.next_version_id_marker().map(String::from),
        };
        if marker.key_marker.is_none() && marker.version_id_marker.is_none() {
            warn!("ListObjectVersions response is truncated but has no markers.");
            None
        } else {
            Some(marker)
        }
    } else {
        None
    };

    ListPage { items, next_marker }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_dummy_tracing_subscriber;
    use aws_sdk_s3::types::{DeleteMarkerEntry, Object, ObjectVersion as SdkObjectVersion};

    #[test]
    fn object_keys_page_last_page() {
        init_dummy_tracing_subscriber();

        let output = ListObjectsV2Output::builder()
            .contents(Object::builder().key("a").build())
            .contents(Object::builder().key("b").build())
            .is_truncated(false)
            .build();

        let page = object_keys_page(&output);
        assert_eq!(page.items, vec!["a".to_string(), "b".to_string()]);
        assert!(page.next_marker.is_none());
    }

    #[test]
    fn object_keys_page_truncated() {
        init_dummy_tracing_subscriber();

        let output = ListObjectsV2Output::builder()
            .contents(Object::builder().key("a").build())
            .is_truncated(true)
            .next_continuation_token("token-1")
            .build();

        let page = object_keys_page(&output);
        assert_eq!(page.next_marker.as_deref(), Some("token-1"));
    }

    #[test]
    fn object_keys_page_truncated_without_token_ends_listing() {
        init_dummy_tracing_subscriber();

        let output = ListObjectsV2Output::builder().is_truncated(true).build();

        let page = object_keys_page(&output);
        assert!(page.items.is_empty());
        assert!(page.next_marker.is_none());
    }

    #[test]
    fn object_keys_page_skips_objects_without_key() {
        init_dummy_tracing_subscriber();

        let output = ListObjectsV2Output::builder()
            .contents(Object::builder().build())
            .contents(Object::builder().key("a").build())
            .build();

        assert_eq!(object_keys_page(&output).items, vec!["a".to_string()]);
    }

    #[test]
    fn object_versions_page_includes_delete_markers_after_versions() {
        init_dummy_tracing_subscriber();

        let output = ListObjectVersionsOutput::builder()
            .versions(SdkObjectVersion::builder().key("a").version_id("v2").build())
            .versions(SdkObjectVersion::builder().key("a").version_id("v1").build())
            .delete_markers(
                DeleteMarkerEntry::builder()
                    .key("a")
                    .version_id("m1")
                    .build(),
            )
            .is_truncated(false)
            .build();

        let page = object_versions_page(&output);
        assert_eq!(
            page.items,
            vec![
                ObjectVersion::new("a", "v2"),
                ObjectVersion::new("a", "v1"),
                ObjectVersion::delete_marker("a", "m1"),
            ]
        );
        assert!(page.next_marker.is_none());
    }

    #[test]
    fn object_versions_page_missing_version_id_is_null_version() {
        init_dummy_tracing_subscriber();

        let output = ListObjectVersionsOutput::builder()
            .versions(SdkObjectVersion::builder().key("a").build())
            .build();

        assert_eq!(
            object_versions_page(&output).items,
            vec![ObjectVersion::new("a", "null")]
        );
    }

    #[test]
    fn object_versions_page_truncated() {
        init_dummy_tracing_subscriber();

        let output = ListObjectVersionsOutput::builder()
            .versions(SdkObjectVersion::builder().key("a").version_id("v1").build())
            .is_truncated(true)
            .next_key_marker("a")
            .next_version_id_marker("v1")
            .build();

        let page = object_versions_page(&output);
        assert_eq!(
            page.next_marker,
            Some(VersionMarker {
                key_marker: Some("a".to_string()),
                version_id_marker: Some("v1".to_string()),
            })
        );
    }

    #[test]
    fn object_versions_page_truncated_without_markers_ends_listing() {
        init_dummy_tracing_subscriber();

        let output = ListObjectVersionsOutput::builder()
            .is_truncated(true)
            .build();

        assert!(object_versions_page(&output).next_marker.is_none());
    }
}
