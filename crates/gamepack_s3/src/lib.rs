use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use gamepack_core::prelude::*;
use tracing::{debug, error, instrument};

/// Publishes sheets as `<prefix><public_id>.png` objects in a bucket that is
/// served (directly or through a CDN) at `public_base_url`.
#[derive(Clone)]
pub struct S3SheetStore {
    client: Client,
    bucket: String,
    prefix: String,
    public_base_url: String,
}

impl S3SheetStore {
    pub fn new(
        client: Client,
        bucket: String,
        prefix: Option<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bucket,
            prefix: prefix.unwrap_or_default(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn key(&self, public_id: &str) -> String {
        format!("{}{public_id}.png", self.prefix)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

impl SheetUploader for S3SheetStore {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, key))]
    async fn upload_sheet(&self, public_id: &str, data: Bytes) -> Result<String, PublishError> {
        let key = self.key(public_id);
        tracing::Span::current().record("key", &key);

        debug!("Uploading sheet to S3...");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("image/png")
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload sheet: {e:?}");
                PublishError::Upload {
                    public_id: public_id.to_string(),
                    message: format!("S3 Upload Error: {e}"),
                }
            })?;

        debug!("Upload successful");
        Ok(self.public_url(&key))
    }
}
