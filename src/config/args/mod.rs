use crate::config::{
    CLITimeoutConfig, ClientConfig, Config, DEFAULT_BUCKET_DELETION_WAIT_TIMEOUT_SECONDS,
    DEFAULT_MAX_KEYS, RetryConfig, TracingConfig,
};
use crate::types::{AccessKeys, ClientConfigLocation, S3Credentials};
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::ffi::OsString;
use std::path::PathBuf;


// ---------------------------------------------------------------------------
// Default constants
// ---------------------------------------------------------------------------

const S3_SCHEME: &str = "s3://";

const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_FORCE_PATH_STYLE: bool = false;
const DEFAULT_DISABLE_STALLED_STREAM_PROTECTION: bool = false;
const DEFAULT_FORCE: bool = false;

const MAX_KEYS_LIMIT: i32 = 1000;

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

const ERROR_MESSAGE_INVALID_TARGET: &str =
    "Target must be a bucket name or s3://<BUCKET_NAME> without a key prefix.";
const ERROR_MESSAGE_MAX_KEYS_OUT_OF_RANGE: &str = "Max keys must be between 1 and 1000.";
const ERROR_MESSAGE_WAIT_TIMEOUT_ZERO: &str =
    "Bucket deletion wait timeout must be at least 1 second.";

// ---------------------------------------------------------------------------
// Value parser helpers
// ---------------------------------------------------------------------------

/// Accepts `s3://bucket`, `s3://bucket/` or `bucket`; anything with a key
/// prefix is rejected since the whole bucket is always deleted.
fn check_s3_target(s: &str) -> Result<String, String> {
    parse_bucket_name(s).map(|_| s.to_string())
}

fn parse_bucket_name(s: &str) -> Result<String, String> {
    let without_scheme = s.strip_prefix(S3_SCHEME).unwrap_or(s);
    let bucket = without_scheme.strip_suffix('/').unwrap_or(without_scheme);

    if bucket.is_empty() || bucket.contains('/') || bucket.chars().any(char::is_whitespace) {
        return Err(ERROR_MESSAGE_INVALID_TARGET.to_string());
    }

    Ok(bucket.to_string())
}

// ---------------------------------------------------------------------------
// CLIArgs (clap-derived argument struct)
// ---------------------------------------------------------------------------

/// s3rb - Permanently empty and delete a versioned Amazon S3 bucket.
///
/// Applies a deny-write bucket policy, deletes every version of every
/// object, deletes the bucket and waits until it is gone.
/// This cannot be undone.
///
/// Example:
///   s3rb s3://my-bucket --target-region us-west-2
///   s3rb my-bucket --target-profile admin --force
#[derive(Parser, Clone, Debug)]
#[command(name = "s3rb", version, about, long_about = None)]
pub struct CLIArgs {
    /// Target bucket: s3://<BUCKET_NAME> or <BUCKET_NAME>
    #[arg(
        env,
        help = "s3://<BUCKET_NAME>",
        value_parser = check_s3_target,
        default_value_if("auto_complete_shell", clap::builder::ArgPredicate::IsPresent, "s3://ignored"),
        required = false,
    )]
    pub target: String,

    // -----------------------------------------------------------------------
    // Safety options
    // -----------------------------------------------------------------------
    /// Skip the confirmation prompt before deleting.
    #[arg(short = 'f', long, visible_alias = "really", env, default_value_t = DEFAULT_FORCE, help_heading = "Safety")]
    pub force: bool,

    // -----------------------------------------------------------------------
    // Deletion options
    // -----------------------------------------------------------------------
    /// Maximum time to wait for the bucket to disappear after deletion.
    #[arg(long, env, default_value_t = DEFAULT_BUCKET_DELETION_WAIT_TIMEOUT_SECONDS, help_heading = "Deletion")]
    pub bucket_deletion_wait_timeout_seconds: u64,

    /// Max keys per listing request (1-1000). Default: 1000.
    #[arg(long, env, default_value_t = DEFAULT_MAX_KEYS, help_heading = "Deletion")]
    pub max_keys: i32,

    // -----------------------------------------------------------------------
    // Logging options
    // -----------------------------------------------------------------------
    /// Verbosity level. -q (quiet), default (normal), -v, -vv, -vvv.
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Output logs in JSON format.
    #[arg(long, env, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Logging")]
    pub json_tracing: bool,

    /// Enable AWS SDK tracing.
    #[arg(long, env, default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Logging")]
    pub aws_sdk_tracing: bool,

    /// Enable tracing span events.
    #[arg(long, env, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Logging")]
    pub span_events_tracing: bool,

    /// Disable colored output in logs.
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Logging")]
    pub disable_color_tracing: bool,

    // -----------------------------------------------------------------------
    // Retry options
    // -----------------------------------------------------------------------
    /// Maximum attempts per AWS SDK call. Default: 3.
    #[arg(long, env, default_value_t = DEFAULT_AWS_MAX_ATTEMPTS, help_heading = "Retry")]
    pub aws_max_attempts: u32,

    /// Initial backoff in milliseconds for SDK retries. Default: 100.
    #[arg(long, env, default_value_t = DEFAULT_INITIAL_BACKOFF_MILLISECONDS, help_heading = "Retry")]
    pub initial_backoff_milliseconds: u64,

    // -----------------------------------------------------------------------
    // Timeout options
    // -----------------------------------------------------------------------
    /// Overall operation timeout in milliseconds.
    #[arg(long, env, help_heading = "Timeout")]
    pub operation_timeout_milliseconds: Option<u64>,

    /// Per-attempt operation timeout in milliseconds.
    #[arg(long, env, help_heading = "Timeout")]
    pub operation_attempt_timeout_milliseconds: Option<u64>,

    /// Connection timeout in milliseconds.
    #[arg(long, env, help_heading = "Timeout")]
    pub connect_timeout_milliseconds: Option<u64>,

    /// Read timeout in milliseconds.
    #[arg(long, env, help_heading = "Timeout")]
    pub read_timeout_milliseconds: Option<u64>,

    // -----------------------------------------------------------------------
    // AWS configuration
    // -----------------------------------------------------------------------
    /// AWS config file path.
    #[arg(long, env, help_heading = "AWS")]
    pub aws_config_file: Option<PathBuf>,

    /// AWS shared credentials file path.
    #[arg(long, env, help_heading = "AWS")]
    pub aws_shared_credentials_file: Option<PathBuf>,

    /// AWS profile for the target. If not set, uses the default profile.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), conflicts_with_all = ["target_access_key", "target_secret_key", "target_session_token"], help_heading = "AWS")]
    pub target_profile: Option<String>,

    /// AWS access key ID for the target.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), requires = "target_secret_key", help_heading = "AWS")]
    pub target_access_key: Option<String>,

    /// AWS secret access key for the target.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), requires = "target_access_key", help_heading = "AWS")]
    pub target_secret_key: Option<String>,

    /// AWS session token for the target.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), requires = "target_access_key", help_heading = "AWS")]
    pub target_session_token: Option<String>,

    /// AWS region for the target.
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub target_region: Option<String>,

    /// Custom S3-compatible endpoint URL (e.g. MinIO, Wasabi).
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub target_endpoint_url: Option<String>,

    /// Force path-style access (required for some S3-compatible services).
    #[arg(long, env, default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "AWS")]
    pub target_force_path_style: bool,

    /// Disable stalled stream protection.
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_STALLED_STREAM_PROTECTION, help_heading = "AWS")]
    pub disable_stalled_stream_protection: bool,

    // -----------------------------------------------------------------------
    // Advanced options
    // -----------------------------------------------------------------------
    /// Generate shell completions.
    #[arg(long, env, help_heading = "Advanced")]
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

// ---------------------------------------------------------------------------
// parse_from_args (public API)
// ---------------------------------------------------------------------------

/// Parse command-line arguments into a `CLIArgs` struct.
///
/// # Example
///
/// ```
/// use s3rb_rs::config::args::parse_from_args;
///
/// let args = vec!["s3rb", "s3://my-bucket", "--force"];
/// let cli_args = parse_from_args(args).unwrap();
/// assert!(cli_args.force);
/// ```
pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

/// Parse arguments and build a Config in one step.
pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    Config::try_from(cli_args)
}

// ---------------------------------------------------------------------------
// Validation and Config conversion
// ---------------------------------------------------------------------------

impl CLIArgs {
    fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_KEYS_LIMIT).contains(&self.max_keys) {
            return Err(ERROR_MESSAGE_MAX_KEYS_OUT_OF_RANGE.to_string());
        }
        if self.bucket_deletion_wait_timeout_seconds == 0 {
            return Err(ERROR_MESSAGE_WAIT_TIMEOUT_ZERO.to_string());
        }
        Ok(())
    }

    fn build_client_config(&self) -> ClientConfig {
        let credential = if let Some(ref profile) = self.target_profile {
            S3Credentials::Profile(profile.clone())
        } else if let Some(ref access_key) = self.target_access_key {
            let secret_key = self.target_secret_key.clone().unwrap_or_default();
            S3Credentials::Credentials {
                access_keys: AccessKeys {
                    access_key: access_key.clone(),
                    secret_access_key: secret_key,
                    session_token: self.target_session_token.clone(),
                },
            }
        } else {
            S3Credentials::FromEnvironment
        };

        ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: self.aws_config_file.clone(),
                aws_shared_credentials_file: self.aws_shared_credentials_file.clone(),
            },
            credential,
            region: self.target_region.clone(),
            endpoint_url: self.target_endpoint_url.clone(),
            force_path_style: self.target_force_path_style,
            retry_config: RetryConfig {
                aws_max_attempts: self.aws_max_attempts,
                initial_backoff_milliseconds: self.initial_backoff_milliseconds,
            },
            cli_timeout_config: CLITimeoutConfig {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
            disable_stalled_stream_protection: self.disable_stalled_stream_protection,
        }
    }

    fn build_tracing_config(&self) -> Option<TracingConfig> {
        let log_level = self.verbosity.log_level()?;

        Some(TracingConfig {
            tracing_level: log_level,
            json_tracing: self.json_tracing,
            aws_sdk_tracing: self.aws_sdk_tracing,
            span_events_tracing: self.span_events_tracing,
            disable_color_tracing: self.disable_color_tracing,
        })
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(args: CLIArgs) -> Result<Self, Self::Error> {
        args.validate()?;

        let bucket = parse_bucket_name(&args.target)?;
        let target_client_config = Some(args.build_client_config());
        let tracing_config = args.build_tracing_config();

        Ok(Config {
            bucket,
            target_client_config,
            tracing_config,
            max_keys: args.max_keys,
            bucket_deletion_wait_timeout_seconds: args.bucket_deletion_wait_timeout_seconds,
            auto_complete_shell: args.auto_complete_shell,
            force: args.force,
        })
    }
}
