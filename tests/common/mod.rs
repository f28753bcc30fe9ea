//! Shared E2E test infrastructure for s3rb-rs.
//!
//! Provides `TestHelper` for bucket management, object operations, and
//! eradication runs against real AWS S3. All helpers use the `s3rb-e2e-test`
//! AWS profile.

#![allow(dead_code)]

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{
    BucketLocationConstraint, BucketVersioningStatus, CreateBucketConfiguration,
    VersioningConfiguration,
};
use s3rb_rs::config::args::build_config_from_args;
use s3rb_rs::storage::create_storage;
use s3rb_rs::{BucketEradicator, Config, S3rbError};
use uuid::Uuid;

/// AWS profile used for all E2E tests.
const AWS_PROFILE: &str = "s3rb-e2e-test";

/// Default region for E2E tests (used when creating buckets).
/// The actual region is determined by the AWS profile, but we need a
/// location constraint for bucket creation outside us-east-1.
const DEFAULT_REGION: &str = "us-east-1";

/// RAII guard that deletes all object versions and the bucket when dropped.
///
/// A passing test has already removed the bucket; the guard only matters
/// when eradication fails part-way or the test panics.
pub struct BucketGuard {
    helper: Arc<TestHelper>,
    bucket: String,
}

impl BucketGuard {
    pub async fn cleanup(self) {
        self.helper.delete_bucket_cascade(&self.bucket).await;
    }
}

impl Drop for BucketGuard {
    fn drop(&mut self) {
        let helper = self.helper.clone();
        let bucket = self.bucket.clone();
        // block_on() panics inside a runtime that is shutting down; the
        // cleanup is best-effort.
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            tokio::runtime::Handle::current().block_on(async move {
                helper.delete_bucket_cascade(&bucket).await;
            });
        }));
    }
}

/// Shared test helper for E2E tests.
pub struct TestHelper {
    client: Client,
    region: String,
}

impl TestHelper {
    /// Create a new TestHelper with an S3 client configured via the e2e test profile.
    pub async fn new() -> Arc<Self> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(AWS_PROFILE)
            .load()
            .await;

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let client = Client::new(&sdk_config);

        Arc::new(Self { client, region })
    }

    pub fn bucket_guard(self: &Arc<Self>, bucket: &str) -> BucketGuard {
        BucketGuard {
            helper: Arc::clone(self),
            bucket: bucket.to_string(),
        }
    }

    /// Generate a unique bucket name like `s3rb-e2e-<uuid>`.
    pub fn generate_bucket_name(&self) -> String {
        format!("s3rb-e2e-{}", Uuid::new_v4())
    }

    // -----------------------------------------------------------------------
    // Bucket management
    // -----------------------------------------------------------------------

    pub async fn create_bucket(&self, bucket: &str) {
        let mut builder = self.client.create_bucket().bucket(bucket);

        // us-east-1 must NOT specify a location constraint
        if self.region != "us-east-1" {
            let constraint = BucketLocationConstraint::from(self.region.as_str());
            let config = CreateBucketConfiguration::builder()
                .location_constraint(constraint)
                .build();
            builder = builder.create_bucket_configuration(config);
        }

        builder
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to create bucket {bucket}: {e}"));
    }

    pub async fn create_versioned_bucket(&self, bucket: &str) {
        self.create_bucket(bucket).await;

        let versioning_config = VersioningConfiguration::builder()
            .status(BucketVersioningStatus::Enabled)
            .build();

        self.client
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(versioning_config)
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to enable versioning on {bucket}: {e}"));
    }

    pub async fn bucket_exists(&self, bucket: &str) -> bool {
        self.client.head_bucket().bucket(bucket).send().await.is_ok()
    }

    /// Delete every version and delete marker, then the bucket. Errors are ignored.
    pub async fn delete_bucket_cascade(&self, bucket: &str) {
        let _ = self.client.delete_bucket_policy().bucket(bucket).send().await;

        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;
        loop {
            let resp = match self
                .client
                .list_object_versions()
                .bucket(bucket)
                .set_key_marker(key_marker.clone())
                .set_version_id_marker(version_id_marker.clone())
                .send()
                .await
            {
                Ok(r) => r,
                Err(_) => return, // Bucket may not exist or no permission
            };

            let versions = resp
                .versions()
                .iter()
                .filter_map(|v| v.key().zip(v.version_id()));
            let markers = resp
                .delete_markers()
                .iter()
                .filter_map(|m| m.key().zip(m.version_id()));
            for (key, version_id) in versions.chain(markers) {
                let _ = self
                    .client
                    .delete_object()
                    .bucket(bucket)
                    .key(key)
                    .version_id(version_id)
                    .send()
                    .await;
            }

            if resp.is_truncated() == Some(true) {
                key_marker = resp.next_key_marker().map(|s| s.to_string());
                version_id_marker = resp.next_version_id_marker().map(|s| s.to_string());
            } else {
                break;
            }
        }

        let _ = self.client.delete_bucket().bucket(bucket).send().await;
    }

    // -----------------------------------------------------------------------
    // Object operations
    // -----------------------------------------------------------------------

    pub async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to put object {key} in {bucket}: {e}"));
    }

    /// Count versions plus delete markers in the bucket (first page only).
    pub async fn count_versions(&self, bucket: &str) -> usize {
        let resp = self
            .client
            .list_object_versions()
            .bucket(bucket)
            .send()
            .await
            .unwrap_or_else(|e| panic!("Failed to list object versions in {bucket}: {e}"));
        resp.versions().len() + resp.delete_markers().len()
    }

    // -----------------------------------------------------------------------
    // Eradication helpers
    // -----------------------------------------------------------------------

    /// Build a `Config` from the given CLI-style arguments.
    ///
    /// Automatically prepends the binary name ("s3rb") and appends
    /// `--target-profile s3rb-e2e-test` unless the args already contain
    /// `--target-profile` or `--target-access-key`.
    pub fn build_config(args: Vec<&str>) -> Config {
        let mut full_args: Vec<String> = vec!["s3rb".to_string()];
        full_args.extend(args.iter().map(|s| s.to_string()));

        let has_profile = full_args.iter().any(|a| a.starts_with("--target-profile"));
        let has_access_key = full_args
            .iter()
            .any(|a| a.starts_with("--target-access-key"));
        if !has_profile && !has_access_key {
            full_args.push("--target-profile".to_string());
            full_args.push(AWS_PROFILE.to_string());
        }

        build_config_from_args(full_args)
            .unwrap_or_else(|e| panic!("Failed to build config from args: {e}"))
    }

    pub async fn run_eradication(config: Config) -> Result<(), S3rbError> {
        let storage = create_storage(&config)
            .await
            .unwrap_or_else(|e| panic!("Failed to create storage: {e}"));

        BucketEradicator::new(storage, &config.bucket)
            .eradicate()
            .await
    }
}

/// Default timeout for E2E tests (5 minutes).
///
/// Covers bucket setup, eradication including the deletion wait, and cleanup.
pub const E2E_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(300);

/// Wraps an async E2E test body with a timeout.
///
/// Usage:
/// ```ignore
/// #[tokio::test]
/// async fn e2e_my_test() {
///     e2e_timeout!(async {
///         // test body here
///     });
/// }
/// ```
#[macro_export]
macro_rules! e2e_timeout {
    ($body:expr) => {
        tokio::time::timeout(common::E2E_TIMEOUT, $body)
            .await
            .expect("E2E test timed out")
    };
}
