//! Capabilities supplied by the native shell: save dialog, notifications and
//! menu commands.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub struct SaveDialogOptions {
    pub title: String,
    /// Suggested location, directory plus file name
    pub default_path: PathBuf,
}

#[async_trait]
pub trait SaveDialog: Send + Sync {
    /// `None` when the user dismisses the dialog.
    async fn choose_save_path(&self, options: SaveDialogOptions) -> Option<PathBuf>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: PathBuf,
    pub is_error: bool,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

pub struct NativeSaveDialog;

#[async_trait]
impl SaveDialog for NativeSaveDialog {
    async fn choose_save_path(&self, options: SaveDialogOptions) -> Option<PathBuf> {
        let mut dialog = rfd::AsyncFileDialog::new().set_title(&options.title);
        if let Some(dir) = options.default_path.parent() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(name) = options.default_path.file_name() {
            dialog = dialog.set_file_name(name.to_string_lossy());
        }
        dialog
            .save_file()
            .await
            .map(|handle| handle.path().to_path_buf())
    }
}

/// Shows notifications as native message boxes.
pub struct NativeNotifier;

#[async_trait]
impl Notifier for NativeNotifier {
    async fn notify(&self, notification: Notification) {
        let level = if notification.is_error {
            rfd::MessageLevel::Error
        } else {
            rfd::MessageLevel::Info
        };
        tracing::debug!(
            "Notification icon {} is not supported by message boxes",
            notification.icon.display()
        );
        rfd::AsyncMessageDialog::new()
            .set_title(&notification.title)
            .set_description(&notification.body)
            .set_level(level)
            .set_buttons(rfd::MessageButtons::Ok)
            .show()
            .await;
    }
}

type CommandHandler<M> = Box<dyn Fn() -> M + Send + Sync>;

/// Named shell commands (menu items, accelerators) mapped to app messages.
pub struct CommandRegistry<M> {
    handlers: HashMap<String, Vec<CommandHandler<M>>>,
}

impl<M> Default for CommandRegistry<M> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<M> CommandRegistry<M> {
    pub fn on_command(
        &mut self,
        name: impl Into<String>,
        handler: impl Fn() -> M + Send + Sync + 'static,
    ) -> &mut Self {
        self.handlers
            .entry(name.into())
            .or_default()
            .push(Box::new(handler));
        self
    }

    pub fn dispatch(&self, name: &str) -> Vec<M> {
        match self.handlers.get(name) {
            Some(handlers) => handlers.iter().map(|handler| handler()).collect(),
            None => {
                tracing::debug!("No handler for command {}", name);
                Vec::new()
            }
        }
    }
}
