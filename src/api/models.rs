/// Configuration for the media client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Ceiling for a single response body
    pub max_download_bytes: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_download_bytes: 512 * 1024 * 1024,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
