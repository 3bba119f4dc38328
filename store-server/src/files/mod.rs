//! Upload Storage
//!
//! Stores product images and payment proofs under work_dir/uploads.
//! Product images are content-addressed (SHA-256 prefix), so re-uploading
//! the same picture never duplicates the file. Payment proofs get a random
//! name per order and are never deduplicated.

use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::{AppError, ErrorCode};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Maximum product image size (5MB)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// Maximum payment proof size (2MB)
pub const MAX_PROOF_SIZE: usize = 2 * 1024 * 1024;

/// Supported product image formats
pub const IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Supported payment proof formats
pub const PROOF_FORMATS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// An uploaded file pulled out of a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A stored upload, as reported back to handlers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Filename on disk (no directory component)
    pub filename: String,
    /// Public URL path ("/uploads/{filename}")
    pub url: String,
    /// Stored size in bytes
    pub size: usize,
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Extract a lowercase file extension
fn file_extension(filename: &str) -> Result<String, AppError> {
    PathBuf::from(filename)
        .extension()
        .and_then(|ext| ext.to_str().map(|s| s.to_lowercase()))
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("Invalid file extension for: {}", filename),
            )
        })
}

/// File storage rooted at the uploads directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a stored file
    pub fn disk_path(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Validate and store a product image.
    ///
    /// The upload must carry a supported extension, stay under
    /// [`MAX_IMAGE_SIZE`] and decode as an actual image. The stored name
    /// is derived from the content hash, so identical uploads collapse
    /// into one file.
    pub async fn save_product_image(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<StoredFile, AppError> {
        let ext = file_extension(filename)?;

        if !IMAGE_FORMATS.contains(&ext.as_str()) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!(
                    "Unsupported image format '{}'. Supported: {}",
                    ext,
                    IMAGE_FORMATS.join(", ")
                ),
            ));
        }

        if data.len() > MAX_IMAGE_SIZE {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "Image too large. Maximum size is {}MB",
                    MAX_IMAGE_SIZE / 1024 / 1024
                ),
            ));
        }

        // Verify it is actually an image by decoding it
        if let Err(e) = image::load_from_memory(data) {
            return Err(AppError::with_message(
                ErrorCode::InvalidImageFile,
                format!("Invalid image file ({}): {}", ext, e),
            ));
        }

        let hash = calculate_hash(data);
        let stored_name = format!("{}.{}", &hash[..16], ext);
        let path = self.disk_path(&stored_name);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(
                original_name = %filename,
                existing_file = %stored_name,
                "Duplicate image detected, returning existing file"
            );
        } else {
            self.write(&path, data).await?;
            tracing::info!(
                original_name = %filename,
                stored_name = %stored_name,
                size = data.len(),
                "Product image stored"
            );
        }

        Ok(StoredFile {
            url: format!("/uploads/{}", stored_name),
            filename: stored_name,
            size: data.len(),
        })
    }

    /// Validate and store a payment proof.
    ///
    /// Accepts images and PDFs up to [`MAX_PROOF_SIZE`]. PDFs must carry
    /// the `%PDF` magic, images must decode.
    pub async fn save_payment_proof(
        &self,
        filename: &str,
        data: &[u8],
    ) -> Result<StoredFile, AppError> {
        let ext = file_extension(filename)?;

        if !PROOF_FORMATS.contains(&ext.as_str()) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!(
                    "Unsupported payment proof format '{}'. Supported: {}",
                    ext,
                    PROOF_FORMATS.join(", ")
                ),
            ));
        }

        if data.len() > MAX_PROOF_SIZE {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "Payment proof too large. Maximum size is {}MB",
                    MAX_PROOF_SIZE / 1024 / 1024
                ),
            ));
        }

        if ext == "pdf" {
            if !data.starts_with(b"%PDF") {
                return Err(AppError::with_message(
                    ErrorCode::InvalidImageFile,
                    "File does not look like a PDF document",
                ));
            }
        } else if let Err(e) = image::load_from_memory(data) {
            return Err(AppError::with_message(
                ErrorCode::InvalidImageFile,
                format!("Invalid image file ({}): {}", ext, e),
            ));
        }

        let stored_name = format!("{}-payment.{}", Uuid::new_v4(), ext);
        let path = self.disk_path(&stored_name);
        self.write(&path, data).await?;

        tracing::info!(
            original_name = %filename,
            stored_name = %stored_name,
            size = data.len(),
            "Payment proof stored"
        );

        Ok(StoredFile {
            url: format!("/uploads/{}", stored_name),
            filename: stored_name,
            size: data.len(),
        })
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to create uploads directory: {}", e),
            )
        })?;
        tokio::fs::write(path, data).await.map_err(|e| {
            AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to save file: {}", e),
            )
        })
    }
}
