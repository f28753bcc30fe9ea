pub mod args;

use crate::types::{ClientConfigLocation, S3Credentials};

/// Default upper bound on the post-deletion existence polling, in seconds.
pub const DEFAULT_BUCKET_DELETION_WAIT_TIMEOUT_SECONDS: u64 = 100;

/// Default number of keys requested per listing page (S3 maximum).
pub const DEFAULT_MAX_KEYS: i32 = 1000;

/// Main configuration for a bucket eradication run.
///
/// # Quick Start
///
/// ```
/// use s3rb_rs::Config;
///
/// let config = Config::for_bucket("my-bucket");
/// assert_eq!(config.bucket, "my-bucket");
/// assert!(config.force);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub bucket: String,
    pub target_client_config: Option<ClientConfig>,
    pub tracing_config: Option<TracingConfig>,
    pub max_keys: i32,
    pub bucket_deletion_wait_timeout_seconds: u64,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
    pub force: bool,
}

impl Config {
    /// Create a `Config` with defaults for the given bucket.
    ///
    /// `force` is set so library callers are never prompted. No client
    /// configuration is set; supply `target_client_config` before creating
    /// storage from this config.
    pub fn for_bucket(bucket: &str) -> Self {
        Config {
            bucket: bucket.to_string(),
            force: true,
            ..Config::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bucket: String::new(),
            target_client_config: None,
            tracing_config: None,
            max_keys: DEFAULT_MAX_KEYS,
            bucket_deletion_wait_timeout_seconds: DEFAULT_BUCKET_DELETION_WAIT_TIMEOUT_SECONDS,
            auto_complete_shell: None,
            force: false,
        }
    }
}

/// AWS S3 client configuration.
///
/// Credential loading, region, endpoint, SDK retry and timeout settings.
/// The client itself is built by `create_client()` in
/// `storage::s3::client_builder`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_config_location: ClientConfigLocation,
    pub credential: S3Credentials,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub retry_config: RetryConfig,
    pub cli_timeout_config: CLITimeoutConfig,
    pub disable_stalled_stream_protection: bool,
}

/// Retry configuration handed to the AWS SDK.
///
/// s3rb itself never retries; these settings only shape the SDK's standard
/// retry strategy for each individual call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

/// Timeout configuration for AWS SDK operations.
#[derive(Debug, Clone)]
pub struct CLITimeoutConfig {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

/// Tracing (logging) configuration.
#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}
