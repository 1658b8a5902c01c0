use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    api::{ApiError, MediaClient},
    domain::{AppError, DownloadRequest, DownloadResult, MediaTarget},
    shell::{Notification, Notifier, SaveDialog, SaveDialogOptions},
    utils::random_name,
};

#[derive(Debug, Clone)]
pub struct SaveSettings {
    pub download_dir: PathBuf,
    pub random_name_length: usize,
    pub notification_icon: PathBuf,
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::TooLarge { limit } => AppError::TooLarge { limit },
            ApiError::Io(e) => AppError::Io(e.to_string()),
            other => AppError::Api(other.to_string()),
        }
    }
}

/// Save dialog, download and notification for one cover click.
#[derive(Clone)]
pub struct DownloadCoordinator {
    client: MediaClient,
    dialog: Arc<dyn SaveDialog>,
    notifier: Arc<dyn Notifier>,
    settings: SaveSettings,
}

impl DownloadCoordinator {
    pub fn new(
        client: MediaClient,
        dialog: Arc<dyn SaveDialog>,
        notifier: Arc<dyn Notifier>,
        settings: SaveSettings,
    ) -> Self {
        Self {
            client,
            dialog,
            notifier,
            settings,
        }
    }

    pub fn save_dialog_options(&self, media: &MediaTarget) -> SaveDialogOptions {
        SaveDialogOptions {
            title: format!("save {}", media.file_type()),
            default_path: self
                .settings
                .download_dir
                .join(random_name(self.settings.random_name_length)),
        }
    }

    /// Asks for a destination and downloads `media` there. `None` means the
    /// dialog was dismissed and nothing happened.
    pub async fn save_media(&self, media: MediaTarget) -> Option<DownloadResult> {
        let options = self.save_dialog_options(&media);
        let title = options.title.clone();
        let chosen = self.dialog.choose_save_path(options).await?;

        let request = DownloadRequest::new(media.source_url, chosen, media.kind.file_type());
        let result = self.download(&request).await;

        self.notifier
            .notify(Notification {
                title,
                body: result.message.clone(),
                icon: self.settings.notification_icon.clone(),
                is_error: !result.success,
            })
            .await;
        Some(result)
    }

    pub async fn download(&self, request: &DownloadRequest) -> DownloadResult {
        let output = request.output_path();
        tracing::info!("Downloading {} to {}", request.source_url, output.display());

        match self.client.download_to_file(&request.source_url, &output).await {
            Ok(bytes) => {
                tracing::info!("Saved {} bytes to {}", bytes, output.display());
                DownloadResult::done(&output)
            }
            Err(e) => {
                let error = AppError::from(e);
                tracing::warn!("Download of {} failed: {}", request.source_url, error);
                DownloadResult::failed(&output, &error)
            }
        }
    }
}
