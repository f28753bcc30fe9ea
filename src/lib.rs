/*!
# Overview
s3rb-rs empties and deletes a versioned Amazon S3 bucket.

It first applies a bucket policy that denies `s3:PutObject`, so nothing new
lands in the bucket while it is being emptied. It then lists every object and
every version and delete marker of each object, deletes them one by one,
deletes the bucket, and waits until S3 reports the bucket gone.

## Features
- **Complete**: Removes every version and delete marker, not only current objects
- **Write Lockdown**: Denies PutObject before anything is deleted
- **Idempotent Finish**: A bucket that no longer exists is reported as success
- **Safety**: Confirmation prompt requiring exactly `yes`, skippable with `--force`
- **Library-First**: The s3rb CLI is a thin wrapper over the s3rb-rs library

## As a Library

Example usage
=============

```toml
[dependencies]
s3rb-rs = "0.1"
tokio = { version = "1", features = ["full"] }
```

```no_run
use s3rb_rs::config::Config;
use s3rb_rs::config::args::parse_from_args;
use s3rb_rs::storage::create_storage;
use s3rb_rs::BucketEradicator;

#[tokio::main]
async fn main() {
    let args = vec!["s3rb", "s3://my-bucket", "--force"];

    let parsed_args = parse_from_args(args).unwrap();
    let config = Config::try_from(parsed_args).unwrap();
    let storage = create_storage(&config).await.unwrap();

    let eradicator = BucketEradicator::new(storage, &config.bucket);
    if let Err(e) = eradicator.eradicate().await {
        eprintln!("{e}");
    }
}
```
*/

pub mod config;
pub mod eradicator;
pub mod lister;
pub mod policy;
pub mod safety;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use config::args::{CLIArgs, build_config_from_args, parse_from_args};
pub use eradicator::BucketEradicator;
pub use safety::{PromptHandler, SafetyChecker};
pub use types::error::{S3rbError, exit_code_from_error, is_cancelled_error};
