use bytes::Bytes;
use gamepack_core::prelude::*;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// [`ImageFetcher`] over plain HTTP(S).
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("gamepack/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ImageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let transport = |e: reqwest::Error| {
            error!("Fetch failed: {e}");
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            error!("Upstream returned {status}");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await.map_err(transport)?;
        debug!(bytes = data.len(), "Fetched");
        Ok(data)
    }
}

/// Runs one fetch under `timeout`, whatever the fetcher's own bounds are.
pub async fn fetch_within<F: ImageFetcher>(
    fetcher: &F,
    url: &str,
    timeout: Duration,
) -> Result<Bytes, FetchError> {
    let outcome = tokio::time::timeout(timeout, fetcher.fetch(url)).await;
    match outcome {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
        }),
    }
}
