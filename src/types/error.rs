use anyhow::Error;
use thiserror::Error;

/// Errors surfaced by s3rb.
///
/// The eradication variants name the step that failed and, for per-item
/// steps, the item. The underlying SDK error is kept as the `source`.
///
/// ## Exit Codes
///
/// Each variant maps to an exit code (via `exit_code()`):
/// - 0: Non-error conditions (Cancelled)
/// - 1: Eradication failures (any step of the deletion sequence)
/// - 2: Configuration errors (InvalidConfig)
#[derive(Error, Debug)]
pub enum S3rbError {
    /// The deny-write bucket policy could not be applied.
    #[error("failed to apply deny-write policy to bucket {bucket}")]
    PolicyApplyFailed {
        bucket: String,
        #[source]
        source: Error,
    },

    /// Listing the objects of the bucket failed.
    #[error("failed to list objects in bucket {bucket}")]
    ListObjectsFailed {
        bucket: String,
        #[source]
        source: Error,
    },

    /// Listing the versions of one object failed.
    #[error("failed to list object versions of {key} in bucket {bucket}")]
    ListVersionsFailed {
        bucket: String,
        key: String,
        #[source]
        source: Error,
    },

    /// Deleting one object version failed.
    #[error("failed to delete object {key} (version_id: {version_id}) in bucket {bucket}")]
    DeleteVersionFailed {
        bucket: String,
        key: String,
        version_id: String,
        #[source]
        source: Error,
    },

    /// Deleting the emptied bucket failed.
    #[error("failed to delete bucket {bucket}")]
    DeleteBucketFailed {
        bucket: String,
        #[source]
        source: Error,
    },

    /// The bucket could not be confirmed absent after deletion.
    #[error("failed to confirm deletion of bucket {bucket}")]
    BucketConfirmationFailed {
        bucket: String,
        #[source]
        source: Error,
    },

    /// Configuration error (non-retryable).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Operation cancelled by user.
    #[error("Operation cancelled by user")]
    Cancelled,
}

impl S3rbError {
    /// Get the appropriate process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            S3rbError::Cancelled => 0,
            S3rbError::InvalidConfig(_) => 2,
            _ => 1,
        }
    }

    /// Name of the eradication step this error belongs to, used as a log field.
    pub fn step(&self) -> &'static str {
        match self {
            S3rbError::PolicyApplyFailed { .. } => "put_bucket_policy",
            S3rbError::ListObjectsFailed { .. } => "list_objects",
            S3rbError::ListVersionsFailed { .. } => "list_object_versions",
            S3rbError::DeleteVersionFailed { .. } => "delete_object_version",
            S3rbError::DeleteBucketFailed { .. } => "delete_bucket",
            S3rbError::BucketConfirmationFailed { .. } => "wait_until_bucket_not_exists",
            S3rbError::InvalidConfig(_) => "configuration",
            S3rbError::Cancelled => "confirmation",
        }
    }
}

/// Conditions reported by the storage layer that callers may want to
/// recover from instead of failing.
#[derive(Error, Debug, PartialEq)]
pub enum StorageError {
    #[error("the bucket {0} does not exist")]
    NoSuchBucket(String),
}

/// Check if an anyhow::Error wraps a "no such bucket" condition.
pub fn is_no_such_bucket_error(e: &Error) -> bool {
    matches!(
        e.downcast_ref::<StorageError>(),
        Some(StorageError::NoSuchBucket(_))
    )
}

/// Check if an anyhow::Error wraps a cancellation error.
pub fn is_cancelled_error(e: &Error) -> bool {
    matches!(e.downcast_ref::<S3rbError>(), Some(S3rbError::Cancelled))
}

/// Extract the exit code from an anyhow::Error, defaulting to 1.
pub fn exit_code_from_error(e: &Error) -> i32 {
    if let Some(err) = e.downcast_ref::<S3rbError>() {
        return err.exit_code();
    }
    1
}
