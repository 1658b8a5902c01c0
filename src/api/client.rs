use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use super::models::ClientConfig;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Server returned an error: {0}")]
    ApiError(String),

    #[error("Resource exceeds the {limit} byte download limit")]
    TooLarge { limit: u64 },

    #[error("File write failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct MediaClient {
    client: Client,
    config: ClientConfig,
}

impl MediaClient {
    pub fn new(config: ClientConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Starts a GET and returns (total_size, stream). Responses that announce a
    /// size above the ceiling are rejected before any body is read.
    pub async fn download_file_stream(
        &self,
        url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("Download request failed: {}", e)))?;

        let total_size = response.content_length();
        if let Some(total) = total_size {
            if total > self.config.max_download_bytes {
                return Err(ApiError::TooLarge {
                    limit: self.config.max_download_bytes,
                });
            }
        }

        let stream = response.bytes_stream().map_err(ApiError::RequestError);
        Ok((total_size, stream))
    }

    /// Streams `url` into `<path>.part`, then renames it to `path` once the
    /// whole body is on disk. Returns the number of bytes written.
    pub async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        let part = part_path_for(path);
        match self.write_part(url, &part).await {
            Ok(written) => {
                if let Err(e) = tokio::fs::rename(&part, path).await {
                    let _ = tokio::fs::remove_file(&part).await;
                    return Err(e.into());
                }
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(e)
            }
        }
    }

    async fn write_part(&self, url: &str, part: &Path) -> Result<u64> {
        let (_, stream) = self.download_file_stream(url).await?;
        let mut stream = stream.boxed();
        let mut file = tokio::fs::File::create(part).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > self.config.max_download_bytes {
                return Err(ApiError::TooLarge {
                    limit: self.config.max_download_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }

        file.sync_all().await?;
        Ok(written)
    }

    /// Whole body in memory, capped. Used for the cover preview.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let (total, mut stream) = self.download_file_stream(url).await.map(|(t, s)| (t, s.boxed()))?;
        let mut body = Vec::with_capacity(total.unwrap_or(0) as usize);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if (body.len() + chunk.len()) as u64 > self.config.max_download_bytes {
                return Err(ApiError::TooLarge {
                    limit: self.config.max_download_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

fn part_path_for(output: &Path) -> PathBuf {
    let mut part = output.as_os_str().to_owned();
    part.push(".part");
    PathBuf::from(part)
}
