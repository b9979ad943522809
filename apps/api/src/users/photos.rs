use std::future::Future;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

/// Profile photos larger than this are rejected.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

fn user_prefix(uid: &str) -> String {
    format!("profile-photos/{uid}/")
}

/// Object key for a new upload. A fresh name per upload keeps cached URLs
/// from showing a stale picture.
pub fn photo_key(uid: &str, content_type: &str) -> String {
    let extension = match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    };
    format!("{}{}.{extension}", user_prefix(uid), Uuid::new_v4())
}

pub fn public_url(public_base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{bucket}/{key}", public_base.trim_end_matches('/'))
}

/// Uploads a profile photo scoped to `uid` and returns its key.
pub async fn upload_profile_photo(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    uid: &str,
    content_type: &str,
    body: Bytes,
) -> Result<String, AppError> {
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation(
            "profile photo must be an image".to_string(),
        ));
    }
    if body.is_empty() || body.len() > MAX_PHOTO_BYTES {
        return Err(AppError::Validation(format!(
            "profile photo must be between 1 byte and {MAX_PHOTO_BYTES} bytes"
        )));
    }

    let key = photo_key(uid, content_type);
    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(body))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::ExternalService(format!("S3 upload failed: {e}")))?;

    info!("Uploaded profile photo to s3://{bucket}/{key}");
    Ok(key)
}

pub async fn delete_photo(s3: &aws_sdk_s3::Client, bucket: &str, key: &str) -> Result<(), AppError> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::ExternalService(format!("S3 delete failed: {e}")))?;
    info!("Deleted s3://{bucket}/{key}");
    Ok(())
}

/// Runs `discard` only when `result` is an error, then returns `result`.
/// A failing `discard` is logged; the original error wins.
pub async fn discard_on_error<T, F>(result: Result<T, AppError>, discard: F) -> Result<T, AppError>
where
    F: Future<Output = Result<(), AppError>>,
{
    if let Err(e) = &result {
        if let Err(cleanup) = discard.await {
            warn!("Cleanup after failed photo update did not complete ({e}): {cleanup}");
        }
    }
    result
}

/// Deletes every stored photo of `uid`. Returns the number of objects removed.
pub async fn delete_user_photos(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    uid: &str,
) -> Result<usize, AppError> {
    let listed = s3
        .list_objects_v2()
        .bucket(bucket)
        .prefix(user_prefix(uid))
        .send()
        .await
        .map_err(|e| AppError::ExternalService(format!("S3 list failed: {e}")))?;

    let objects = listed
        .contents()
        .iter()
        .filter_map(|o| o.key())
        .map(|key| ObjectIdentifier::builder().key(key).build())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("S3 object identifier: {e}")))?;

    if objects.is_empty() {
        return Ok(0);
    }
    let count = objects.len();

    let delete = Delete::builder()
        .set_objects(Some(objects))
        .build()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("S3 delete request: {e}")))?;

    s3.delete_objects()
        .bucket(bucket)
        .delete(delete)
        .send()
        .await
        .map_err(|e| AppError::ExternalService(format!("S3 delete failed: {e}")))?;

    info!("Deleted {count} profile photo(s) of user {uid}");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_key_is_scoped_to_user() {
        let key = photo_key("uid-1", "image/png");
        assert!(key.starts_with("profile-photos/uid-1/"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn test_unknown_image_type_defaults_to_jpg() {
        assert!(photo_key("u", "image/heic").ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_discard_runs_only_on_error() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = AtomicUsize::new(0);
        let discard = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };

        let ok = discard_on_error(Ok::<_, AppError>(7), discard()).await;
        assert_eq!(ok.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let failed: Result<(), AppError> = Err(AppError::NotFound("User u not found".into()));
        let failed = discard_on_error(failed, discard()).await;
        assert!(matches!(failed, Err(AppError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_discard_keeps_original_error() {
        let failed: Result<(), AppError> = Err(AppError::NotFound("User u not found".into()));
        let result = discard_on_error(failed, async {
            Err(AppError::ExternalService("S3 delete failed".into()))
        })
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_public_url_joins_without_double_slash() {
        assert_eq!(
            public_url("http://localhost:9000/", "gotop", "profile-photos/u/a.jpg"),
            "http://localhost:9000/gotop/profile-photos/u/a.jpg"
        );
    }
}
