//! Deny-write bucket policy applied before a bucket is emptied.
//!
//! The policy denies `s3:PutObject` to every principal on the bucket and on
//! every key within it. Reads and deletes stay allowed, so the bucket can
//! still be listed and emptied, but nothing new can land in it while the
//! deletion is in progress. The policy is never removed on failure: a bucket
//! left half-emptied stays write-locked.

use anyhow::{Context, Result};
use serde::Serialize;

const POLICY_VERSION: &str = "2012-10-17";
const POLICY_ID: &str = "S3DenyAllPutObjectPolicy";
const DENIED_ACTION: &str = "s3:PutObject";
const S3_ARN_PREFIX: &str = "arn:aws:s3:::";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct BucketPolicyDocument {
    version: &'static str,
    id: &'static str,
    statement: Vec<PolicyStatement>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyStatement {
    effect: &'static str,
    principal: &'static str,
    action: &'static str,
    resource: Vec<String>,
}

/// Build the deny-all-PutObject policy document for `bucket` as JSON.
///
/// The output depends only on the bucket name.
pub fn deny_put_object_policy(bucket: &str) -> Result<String> {
    let document = BucketPolicyDocument {
        version: POLICY_VERSION,
        id: POLICY_ID,
        statement: vec![PolicyStatement {
            effect: "Deny",
            principal: "*",
            action: DENIED_ACTION,
            resource: vec![
                format!("{S3_ARN_PREFIX}{bucket}"),
                format!("{S3_ARN_PREFIX}{bucket}/*"),
            ],
        }],
    };

    serde_json::to_string(&document).context("serde_json::to_string() failed.")
}
