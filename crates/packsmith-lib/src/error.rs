use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that stop a modpack extraction run.
///
/// Per-mod download failures and per-file override copy failures are not
/// represented here; they are collected into the stage reports instead.
#[derive(Debug, Error)]
pub enum ModpackError {
    // ── Manifest ────────────────────────────────────────
    #[error("Manifest not found at {0:?}")]
    ManifestNotFound(PathBuf),

    #[error("Manifest at {path:?} could not be decoded: {source}")]
    ManifestMalformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Manifest does not name a usable mod loader")]
    NoModLoader,

    #[error("Manifest has no file list")]
    MissingFileList,

    // ── Output ──────────────────────────────────────────
    #[error("Output directory {0:?} has no parent to write the archive into")]
    NoOutputParent(PathBuf),

    // ── Archive ─────────────────────────────────────────
    #[error("Archive error at {path:?}: {source}")]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ModpackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModpackError>;
