use crate::app::ports::TicketSink;
use crate::common::error::{Result, StageError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes exported tickets into a directory, like a browser's downloads folder
pub struct DirectoryTicketSink {
    dir: PathBuf,
}

impl DirectoryTicketSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl TicketSink for DirectoryTicketSink {
    async fn save(&self, file_name: &str, png: &[u8]) -> Result<PathBuf> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(StageError::validation(format!("invalid file name '{}'", file_name)));
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.dir.join(file_name);
        // a reader never sees a half-written PNG
        let partial = self.dir.join(format!("{}.part", file_name));
        let written = match tokio::fs::write(&partial, png).await {
            Ok(()) => tokio::fs::rename(&partial, &target).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                warn!("Could not remove {}: {}", partial.display(), cleanup);
            }
            return Err(e.into());
        }
        debug!("Wrote {} bytes to {}", png.len(), target.display());
        Ok(target)
    }
}
