use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use rocket::fs::TempFile;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AppError;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// Directory that uploaded assignment files are written to and served from.
#[derive(Debug, Clone)]
pub struct UploadDir(PathBuf);

impl UploadDir {
    pub fn new(path: PathBuf) -> Result<Self, AppError> {
        std::fs::create_dir_all(&path)?;
        Ok(Self(path))
    }

    /// Reads `UPLOAD_DIR` (default `uploads`), creating the directory if it
    /// doesn't exist yet.
    pub fn from_env() -> Result<Self, AppError> {
        let dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        Self::new(PathBuf::from(dir))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Reduces a client-supplied filename to a safe basename: path components
/// are stripped and anything outside [A-Za-z0-9._-] is collapsed to `_`.
pub fn sanitize_filename(raw: &str) -> String {
    let basename = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned = UNSAFE_CHARS.replace_all(basename, "_");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes the uploaded file into the upload directory under a
/// collision-resistant name and returns that name.
#[instrument(skip_all)]
pub async fn store_upload(file: &mut TempFile<'_>, dir: &UploadDir) -> Result<String, AppError> {
    let original = file
        .raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .unwrap_or_default();

    let unique_filename = format!(
        "{}_{}",
        Uuid::new_v4().simple(),
        sanitize_filename(&original)
    );

    file.copy_to(dir.path().join(&unique_filename)).await?;
    info!(filename = %unique_filename, "Stored uploaded file");

    Ok(unique_filename)
}
