//! Upload Storage Service
//!
//! Local-disk storage for payment proofs and hall images. Files are
//! content-addressed by SHA-256, so re-uploading the same proof is a no-op
//! and stored names carry no user input.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::utils::{AppError, AppResult};

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted upload extensions (images + PDF receipts)
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "pdf"];

#[derive(Clone, Debug)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    /// Create the service, ensuring the storage directory exists
    pub fn new(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let root: PathBuf = dir.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| AppError::internal(format!("Failed to create upload dir: {e}")))?;
        Ok(Self { root })
    }

    /// Validate and persist an upload; returns the stored filename.
    ///
    /// The name is `<sha256>.<ext>` — identical content maps to the same
    /// file. The original filename only contributes its extension.
    pub fn store(&self, data: &[u8], original_name: &str) -> AppResult<String> {
        if data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::validation(format!(
                "File too large. Maximum size is {}MB",
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::validation(format!(
                "Unsupported file format '{}'. Supported: {}",
                ext,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let mut hasher = Sha256::new();
        hasher.update(data);
        let filename = format!("{}.{}", hex::encode(hasher.finalize()), ext);

        let path = self.root.join(&filename);
        if !path.exists() {
            std::fs::write(&path, data)
                .map_err(|e| AppError::internal(format!("Failed to store upload: {e}")))?;
        }

        Ok(filename)
    }

    /// Read a stored file back. Rejects anything that is not a bare filename.
    pub fn read(&self, filename: &str) -> AppResult<Vec<u8>> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return Err(AppError::validation("Invalid filename"));
        }

        std::fs::read(self.root.join(filename))
            .map_err(|_| AppError::not_found(format!("File {} not found", filename)))
    }

    /// Guess the content type for serving a stored file
    pub fn content_type(filename: &str) -> String {
        mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string()
    }
}
