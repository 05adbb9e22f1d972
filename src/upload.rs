use serde::{Deserialize, Serialize};

use crate::error::FileRejected;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Image types accepted for icons and thumbnails.
pub const IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/svg+xml",
];

/// Gate a picked file must pass before it is staged into a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileConstraints {
    pub allowed_types: Vec<String>,
    pub max_bytes: u64,
}

impl Default for FileConstraints {
    fn default() -> Self {
        Self {
            allowed_types: IMAGE_TYPES.iter().map(|mime| mime.to_string()).collect(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl FileConstraints {
    pub fn new<I, S>(allowed_types: I, max_bytes: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_types: allowed_types.into_iter().map(Into::into).collect(),
            max_bytes,
        }
    }

    /// Type is compared without parameters and case-insensitively.
    pub fn check(&self, mime: &str, size: u64) -> Result<(), FileRejected> {
        let essence = mime_essence(mime);
        if !self
            .allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&essence))
        {
            return Err(FileRejected::UnsupportedType {
                mime: mime.to_string(),
            });
        }
        if size == 0 {
            return Err(FileRejected::Empty);
        }
        if size > self.max_bytes {
            return Err(FileRejected::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    pub fn stage(&self, name: impl Into<String>, mime: &str, bytes: Vec<u8>) -> Result<StagedFile, FileRejected> {
        self.check(mime, bytes.len() as u64)?;
        Ok(StagedFile {
            name: name.into(),
            mime: mime_essence(mime),
            bytes,
        })
    }
}

fn mime_essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// A picked file that passed [`FileConstraints`] and waits for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl StagedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
