//! Fallible asset access.
//!
//! Every model, placard image and audio clip is loaded on its own and yields a
//! `Result`, so one bad file never takes the rest of the scene down with it.
//! Failures are collected in a [`LoadReport`] and handed back to the caller.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Model,
    Image,
    Audio,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetKind::Model => "model",
            AssetKind::Image => "image",
            AssetKind::Audio => "audio",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("{kind} asset '{name}' not found")]
    NotFound { kind: AssetKind, name: String },
    #[error("failed to read {kind} asset '{name}': {source}")]
    Io {
        kind: AssetKind,
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("{kind} asset '{name}' is malformed: {reason}")]
    Malformed {
        kind: AssetKind,
        name: String,
        reason: String,
    },
    #[error("failed to decode '{name}': {reason}")]
    Decode { name: String, reason: String },
}

/// Where asset bytes come from.
pub trait AssetSource {
    fn load(&self, kind: AssetKind, name: &str) -> Result<Vec<u8>, AssetError>;
}

/// Flat directory of assets addressed by file name.
#[derive(Clone, Debug)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssetSource {
    fn load(&self, kind: AssetKind, name: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.root.join(name);
        std::fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AssetError::NotFound {
                kind,
                name: name.to_string(),
            },
            _ => AssetError::Io {
                kind,
                name: name.to_string(),
                source: e,
            },
        })
    }
}

const GLB_MAGIC: &[u8; 4] = b"glTF";
const PNG_MAGIC: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8; 3] = b"\xFF\xD8\xFF";

/// Header information of a binary glTF model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub version: u32,
    pub length: u32,
}

/// Check the 12-byte binary glTF header: magic, version 2, declared length.
pub fn inspect_model(name: &str, bytes: &[u8]) -> Result<ModelInfo, AssetError> {
    let malformed = |reason: &str| AssetError::Malformed {
        kind: AssetKind::Model,
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if bytes.len() < 12 {
        return Err(malformed("shorter than a glb header"));
    }
    if &bytes[0..4] != GLB_MAGIC {
        return Err(malformed("missing glTF magic"));
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != 2 {
        return Err(malformed(&format!("unsupported glb version {version}")));
    }
    let length = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if length as usize > bytes.len() {
        return Err(malformed("declared length exceeds file size"));
    }
    Ok(ModelInfo {
        name: name.to_string(),
        version,
        length,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// Identify a placard image by its magic bytes.
pub fn inspect_image(name: &str, bytes: &[u8]) -> Result<ImageFormat, AssetError> {
    if bytes.starts_with(PNG_MAGIC) {
        Ok(ImageFormat::Png)
    } else if bytes.starts_with(JPEG_MAGIC) {
        Ok(ImageFormat::Jpeg)
    } else {
        Err(AssetError::Malformed {
            kind: AssetKind::Image,
            name: name.to_string(),
            reason: "not a PNG or JPEG image".to_string(),
        })
    }
}

#[derive(Debug)]
pub struct LoadFailure {
    pub object: String,
    pub kind: AssetKind,
    pub error: AssetError,
}

/// Outcome of loading a scene: how many objects were placed and what failed.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub objects: usize,
    pub channels: usize,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record(&mut self, object: &str, kind: AssetKind, error: AssetError) {
        log::warn!("[assets] {object}: {error}");
        self.failures.push(LoadFailure {
            object: object.to_string(),
            kind,
            error,
        });
    }

    pub fn failures_of(&self, kind: AssetKind) -> impl Iterator<Item = &LoadFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }
}
