//! Attachment ingestion boundary.
//!
//! Validates a local file (size, extension) and produces the base64 payload
//! the provider expects. Rejection happens here, before any encoding and
//! before the provider is ever involved.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use thiserror::Error;

use crate::models::message::Attachment;

/// Hard cap on the source file size, checked before encoding.
pub const MAX_ATTACHMENT_SIZE: u64 = 20 * 1024 * 1024; // 20 MiB

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];
pub const PDF_EXTENSION: &str = "pdf";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("file is {size} bytes, limit is {max}")]
    FileTooLarge { size: u64, max: u64 },

    #[error("unsupported extension: {0}")]
    UnsupportedExtension(String),

    #[error("file has no extension")]
    NoExtension,

    #[error("file not found")]
    FileNotFound,

    #[error("could not read file: {0}")]
    Unreadable(String),
}

impl AttachmentError {
    /// Validation message shown inline to the user.
    pub fn user_notice(&self) -> String {
        match self {
            AttachmentError::FileTooLarge { .. } => {
                "El archivo es demasiado grande (máx. 20 MB).".to_string()
            }
            AttachmentError::UnsupportedExtension(ext) => {
                format!("Formato no admitido ({ext}). Adjunta un PDF o una imagen.")
            }
            AttachmentError::NoExtension => {
                "No se reconoce el tipo de archivo. Adjunta un PDF o una imagen.".to_string()
            }
            AttachmentError::FileNotFound => "No se encuentra el archivo.".to_string(),
            AttachmentError::Unreadable(_) => "No se pudo leer el archivo.".to_string(),
        }
    }
}

pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext_lower.as_str()) || ext_lower == PDF_EXTENSION
}

/// MIME type declared for a supported extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Validate a file without reading it: existence, size, extension.
pub fn validate_file(path: &Path) -> Result<&'static str, AttachmentError> {
    let metadata = std::fs::metadata(path).map_err(|_| AttachmentError::FileNotFound)?;

    let size = metadata.len();
    if size > MAX_ATTACHMENT_SIZE {
        return Err(AttachmentError::FileTooLarge {
            size,
            max: MAX_ATTACHMENT_SIZE,
        });
    }

    let ext = path
        .extension()
        .ok_or(AttachmentError::NoExtension)?
        .to_string_lossy()
        .to_lowercase();

    mime_for_extension(&ext).ok_or(AttachmentError::UnsupportedExtension(ext))
}

/// Ingest a local file into an attachment: validate, read, base64-encode.
pub async fn ingest_file(path: &Path) -> Result<Attachment, AttachmentError> {
    let mime_type = validate_file(path)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AttachmentError::Unreadable(e.to_string()))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "adjunto".to_string());

    Ok(Attachment {
        name,
        mime_type: mime_type.to_string(),
        data: BASE64.encode(&bytes),
    })
}

/// Ingest bytes the caller already holds (drag-and-drop, clipboard).
/// The size check still runs before encoding.
pub fn ingest_bytes(
    name: impl Into<String>,
    mime_type: impl Into<String>,
    bytes: &[u8],
) -> Result<Attachment, AttachmentError> {
    let size = bytes.len() as u64;
    if size > MAX_ATTACHMENT_SIZE {
        return Err(AttachmentError::FileTooLarge {
            size,
            max: MAX_ATTACHMENT_SIZE,
        });
    }
    Ok(Attachment {
        name: name.into(),
        mime_type: mime_type.into(),
        data: BASE64.encode(bytes),
    })
}
