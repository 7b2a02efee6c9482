use super::ApiClient;
use crate::common::error::{Result, StageError};
use crate::common::types::UploadFile;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use tracing::info;

/// Multipart part carrying the file's bytes and name
pub(crate) fn file_part(file: &UploadFile) -> Part {
    Part::bytes(file.bytes.clone()).file_name(file.file_name.clone())
}

impl ApiClient {
    /// Upload a file and return the URL the backend stored it under
    pub async fn upload_file(&self, file: &UploadFile) -> Result<String> {
        if file.bytes.is_empty() {
            return Err(StageError::validation(format!("{} is empty", file.file_name)));
        }
        let form = Form::new().part("file", file_part(file));
        let url = self
            .send_text(self.request(Method::POST, "/files/upload").multipart(form))
            .await?;
        info!("Uploaded {} ({} bytes) to {}", file.file_name, file.bytes.len(), url);
        Ok(url)
    }
}
