use std::fmt;
use std::path::{Path, PathBuf};

use super::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Picture,
}

impl MediaKind {
    pub fn file_type(self) -> FileType {
        match self {
            MediaKind::Video => FileType::Mp4,
            MediaKind::Picture => FileType::Jpg,
        }
    }
}

/// Media found behind a context-menu target.
///
/// Natural dimensions of `0` mean the size is unknown, the same as an image
/// element that has not loaded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTarget {
    pub kind: MediaKind,
    pub source_url: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl MediaTarget {
    pub fn new(kind: MediaKind, source_url: impl Into<String>) -> Self {
        Self {
            kind,
            source_url: source_url.into(),
            natural_width: 0,
            natural_height: 0,
        }
    }

    pub fn with_natural_size(mut self, width: u32, height: u32) -> Self {
        self.natural_width = width;
        self.natural_height = height;
        self
    }

    pub fn file_type(&self) -> FileType {
        self.kind.file_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Mp4,
    Jpg,
}

impl FileType {
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Mp4 => "mp4",
            FileType::Jpg => "jpg",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub source_url: String,
    /// Chosen save path without extension
    pub destination_path: PathBuf,
    pub file_type: FileType,
}

impl DownloadRequest {
    pub fn new(source_url: impl Into<String>, destination_path: PathBuf, file_type: FileType) -> Self {
        Self {
            source_url: source_url.into(),
            destination_path,
            file_type,
        }
    }

    /// `<destination_path>.<ext>`
    pub fn output_path(&self) -> PathBuf {
        let mut path = self.destination_path.as_os_str().to_owned();
        path.push(".");
        path.push(self.file_type.extension());
        PathBuf::from(path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub success: bool,
    pub message: String,
    pub destination_path: PathBuf,
}

impl DownloadResult {
    pub fn done(path: &Path) -> Self {
        Self {
            success: true,
            message: format!("save in {} was done", path.display()),
            destination_path: path.to_path_buf(),
        }
    }

    pub fn failed(path: &Path, error: &AppError) -> Self {
        Self {
            success: false,
            message: format!("save in {} failed: {}", path.display(), error),
            destination_path: path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_extension() {
        let request = DownloadRequest::new(
            "https://cdn.example.com/a.jpg",
            PathBuf::from("/tmp/abc123"),
            FileType::Jpg,
        );
        assert_eq!(request.output_path(), PathBuf::from("/tmp/abc123.jpg"));
    }

    #[test]
    fn test_output_path_keeps_dots_in_name() {
        let request = DownloadRequest::new("u", PathBuf::from("/tmp/my.clip"), FileType::Mp4);
        assert_eq!(request.output_path(), PathBuf::from("/tmp/my.clip.mp4"));
    }

    #[test]
    fn test_result_messages() {
        let path = PathBuf::from("/tmp/abc123.jpg");
        let ok = DownloadResult::done(&path);
        assert!(ok.success);
        assert_eq!(ok.message, "save in /tmp/abc123.jpg was done");

        let failed = DownloadResult::failed(&path, &AppError::Api("connection refused".into()));
        assert!(!failed.success);
        assert!(failed.message.contains("failed"));
        assert!(!failed.message.contains("was done"));
    }

    #[test]
    fn test_kind_maps_to_file_type() {
        assert_eq!(MediaKind::Video.file_type(), FileType::Mp4);
        assert_eq!(MediaKind::Picture.file_type(), FileType::Jpg);
        assert_eq!(FileType::Jpg.to_string(), "jpg");
    }
}
