use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufReader};
use uuid::Uuid;

const ASSETS_DIR: &str = "Assets";
const PUBLIC_PREFIX: &str = "/api/Assets";
const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found")]
    NotFound,
    #[error("invalid asset name")]
    InvalidName,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetError {
    fn from_io(e: std::io::Error) -> Self {
        if e.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

/// Which entity an image belongs to. Doubles as the directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Artefacts,
    Categories,
}

impl AssetKind {
    pub const ALL: [Self; 2] = [Self::Artefacts, Self::Categories];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Artefacts => "Artefacts",
            Self::Categories => "Categories",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or(AssetError::InvalidName)
    }
}

/// An uploaded image as read from a multipart file part.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Lower-cased extension of the uploaded file name, or `bin` when there is
    /// no usable one.
    #[must_use]
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LEN
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .map_or_else(|| FALLBACK_EXTENSION.to_string(), str::to_ascii_lowercase)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

pub struct AssetStore {
    base_path: PathBuf,
}

impl AssetStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join(ASSETS_DIR),
        }
    }

    /// Creates the per-kind directories.
    pub async fn ensure_dirs(&self) -> Result<(), AssetError> {
        for kind in AssetKind::ALL {
            fs::create_dir_all(self.kind_dir(kind)).await?;
        }
        Ok(())
    }

    fn kind_dir(&self, kind: AssetKind) -> PathBuf {
        self.base_path.join(kind.as_str())
    }

    fn temp_path(&self, kind: AssetKind) -> PathBuf {
        self.kind_dir(kind).join(format!(".tmp-{}", Uuid::new_v4()))
    }

    /// The URL path an image for `entity_id` will be served from.
    #[must_use]
    pub fn public_path(kind: AssetKind, entity_id: &str, upload: &ImageUpload) -> String {
        format!("{PUBLIC_PREFIX}/{kind}/{entity_id}.{}", upload.extension())
    }

    /// Writes the image for `entity_id` and returns its public path.
    /// Returns `None` without touching the disk when the upload is empty.
    pub async fn store(
        &self,
        kind: AssetKind,
        entity_id: &str,
        upload: &ImageUpload,
    ) -> Result<Option<String>, AssetError> {
        if upload.is_empty() {
            return Ok(None);
        }
        validate_file_name(entity_id)?;

        let dir = self.kind_dir(kind);
        fs::create_dir_all(&dir).await?;

        let temp_path = self.temp_path(kind);
        let final_path = dir.join(format!("{entity_id}.{}", upload.extension()));
        if let Err(e) = write_then_rename(&temp_path, &final_path, &upload.data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AssetError::Io(e));
        }

        Ok(Some(Self::public_path(kind, entity_id, upload)))
    }

    /// Deletes every file whose stem matches `entity_id` (ignoring case).
    /// Returns false when there was nothing to delete.
    pub async fn delete(&self, kind: AssetKind, entity_id: &str) -> Result<bool, AssetError> {
        let mut entries = match fs::read_dir(self.kind_dir(kind)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(AssetError::Io(e)),
        };

        let mut deleted = false;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| stem.eq_ignore_ascii_case(entity_id));
            if !matches {
                continue;
            }
            match fs::remove_file(&path).await {
                Ok(()) => deleted = true,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(AssetError::Io(e)),
            }
        }

        Ok(deleted)
    }

    /// Opens a stored image for reading. Returns the reader and the file size.
    pub async fn open(
        &self,
        kind: AssetKind,
        file_name: &str,
    ) -> Result<(BufReader<File>, u64), AssetError> {
        validate_file_name(file_name)?;
        let path = self.kind_dir(kind).join(file_name);
        let file = File::open(&path).await.map_err(AssetError::from_io)?;

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(AssetError::NotFound);
        }

        Ok((BufReader::new(file), metadata.len()))
    }
}

/// The temp file is left behind on error; the caller removes it.
async fn write_then_rename(temp_path: &Path, final_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut temp_file = File::create(temp_path).await?;
    temp_file.write_all(data).await?;
    temp_file.sync_all().await?;
    drop(temp_file);
    fs::rename(temp_path, final_path).await
}

/// Rejects anything that is not a single, plain path segment.
fn validate_file_name(name: &str) -> Result<(), AssetError> {
    if name.is_empty()
        || name.len() > 255
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..")
    {
        return Err(AssetError::InvalidName);
    }
    Ok(())
}

/// Content type for a stored image, chosen by extension.
#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}
