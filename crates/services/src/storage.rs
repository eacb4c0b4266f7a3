//! On-disk storage for uploaded photos.
//!
//! Uploaded files land in a single flat directory. Stored names are
//! `{unix_timestamp}_{sanitized_original_name}` so the database only has to
//! carry the file name, never a path.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Characters allowed in a stored file name; everything else becomes `_`.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("valid regex"));

/// Flat directory of uploaded files.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an upload and return the stored file name.
    ///
    /// Creates the storage directory on first use.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, std::io::Error> {
        tokio::fs::create_dir_all(&self.root).await?;

        let name = format!(
            "{}_{}",
            chrono::Utc::now().timestamp(),
            sanitize_filename(original_name)
        );
        tokio::fs::write(self.root.join(&name), bytes).await?;
        Ok(name)
    }

    /// Absolute path of a stored file name.
    pub fn resolve(&self, stored_name: &str) -> PathBuf {
        self.root.join(stored_name)
    }
}

/// Reduce an arbitrary client-supplied file name to a safe flat name.
///
/// Directory components are dropped, disallowed characters become `_`, and
/// names with no usable characters collapse to `"upload"`.
pub fn sanitize_filename(name: &str) -> String {
    let basename = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned = DISALLOWED.replace_all(basename, "_").to_string();

    if cleaned.chars().all(|c| c == '.' || c == '_') {
        "upload".to_string()
    } else {
        cleaned
    }
}
