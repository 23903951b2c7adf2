use crate::app::{App, Model};

/// Hands a URL to something outside the process, normally the browser.
pub trait LinkOpener {
    /// # Errors
    ///
    /// Returns the launcher's I/O error when the URL could not be opened.
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs with the platform default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> std::io::Result<()> {
        open::that(url)
    }
}

impl App {
    /// Run whatever the last update asked for outside the model.
    ///
    /// Opener failures are logged and otherwise ignored.
    pub(super) fn handle_message_side_effects(&self, model: &mut Model) {
        let Some(url) = model.pending_open.take() else {
            return;
        };
        match self.opener.open(&url) {
            Ok(()) => tracing::info!(url, "opened link"),
            Err(err) => tracing::warn!(url, error = %err, "failed to open link"),
        }
    }
}
