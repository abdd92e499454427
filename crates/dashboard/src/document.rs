use std::path::Path;

use agentdesk_core::ValidationError;
use agentdesk_core::validate::{PDF_CONTENT_TYPE, validate_document};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// A signed agreement selected for approve-with-document.
#[derive(Clone, PartialEq, Eq)]
pub struct AgreementDocument {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for AgreementDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgreementDocument")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl AgreementDocument {
    /// Content type is inferred from the extension.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = filename
            .to_ascii_lowercase()
            .ends_with(".pdf")
            .then(|| PDF_CONTENT_TYPE.to_string());
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(filename, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn validate(&self, limit: u64) -> Result<(), ValidationError> {
        validate_document(
            &self.filename,
            self.content_type.as_deref(),
            self.size(),
            limit,
        )
    }

    /// Standard base64 of the file bytes, as carried in `agreement_pdf`.
    pub fn encode(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}
