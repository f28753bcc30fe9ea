//! E2E tests for bucket eradication against real S3.

#![cfg(e2e_test)]

mod common;

use common::TestHelper;
use s3rb_rs::S3rbError;

#[tokio::test]
async fn e2e_eradicate_empty_versioned_bucket() {
    e2e_timeout!(async {
        let helper = TestHelper::new().await;
        let bucket = helper.generate_bucket_name();
        helper.create_versioned_bucket(&bucket).await;
        let guard = helper.bucket_guard(&bucket);

        let config = TestHelper::build_config(vec![&format!("s3://{bucket}"), "--force"]);
        TestHelper::run_eradication(config).await.unwrap();

        assert!(!helper.bucket_exists(&bucket).await);
        guard.cleanup().await;
    });
}

#[tokio::test]
async fn e2e_eradicate_all_versions() {
    e2e_timeout!(async {
        // "a" has two versions; "ab" shares its prefix and must still be
        // deleted exactly once.
        let helper = TestHelper::new().await;
        let bucket = helper.generate_bucket_name();
        helper.create_versioned_bucket(&bucket).await;
        let guard = helper.bucket_guard(&bucket);

        helper.put_object(&bucket, "a", b"first".to_vec()).await;
        helper.put_object(&bucket, "a", b"second".to_vec()).await;
        helper.put_object(&bucket, "ab", b"other".to_vec()).await;
        helper.put_object(&bucket, "dir/c", b"nested".to_vec()).await;
        assert_eq!(helper.count_versions(&bucket).await, 4);

        let config = TestHelper::build_config(vec![&format!("s3://{bucket}"), "--force"]);
        TestHelper::run_eradication(config).await.unwrap();

        assert!(!helper.bucket_exists(&bucket).await);
        guard.cleanup().await;
    });
}

#[tokio::test]
async fn e2e_eradicate_with_small_pages() {
    e2e_timeout!(async {
        let helper = TestHelper::new().await;
        let bucket = helper.generate_bucket_name();
        helper.create_versioned_bucket(&bucket).await;
        let guard = helper.bucket_guard(&bucket);

        for i in 0..5 {
            helper
                .put_object(&bucket, &format!("key{i}"), vec![b'x'; 10])
                .await;
        }
        for version in 0..3 {
            helper
                .put_object(&bucket, "many-versions", vec![version; 10])
                .await;
        }

        let config = TestHelper::build_config(vec![
            &format!("s3://{bucket}"),
            "--force",
            "--max-keys",
            "2",
        ]);
        TestHelper::run_eradication(config).await.unwrap();

        assert!(!helper.bucket_exists(&bucket).await);
        guard.cleanup().await;
    });
}

#[tokio::test]
async fn e2e_missing_bucket_fails_at_policy_step() {
    e2e_timeout!(async {
        // PutBucketPolicy runs before listing, so a bucket that never existed
        // is reported by the policy step.
        let helper = TestHelper::new().await;
        let bucket = helper.generate_bucket_name();

        let config = TestHelper::build_config(vec![&bucket, "--force"]);
        let e = TestHelper::run_eradication(config).await.unwrap_err();

        assert!(matches!(e, S3rbError::PolicyApplyFailed { .. }), "{e}");
        assert_eq!(e.exit_code(), 1);
    });
}
