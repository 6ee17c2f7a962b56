//! Cache content and its on-disk form.
//!
//! A cache holds an ordered list of texts and a row-major embedding matrix
//! with one row per text. Row `i` is the embedding of `texts[i]`; insertion
//! order is the only link between the two.
//!
//! On disk the content is a single JSON document:
//!
//! ```json
//! { "texts": ["..."], "embeddings": { "rows": 1, "cols": 3, "data": [0.1, 0.2, 0.3] } }
//! ```
//!
//! Writes go to a sibling `.tmp` file that is synced and renamed over the
//! target, so an interrupted write leaves the previous file intact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use memory_embeddings::Embedding;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::VectorError;

/// Extension of cache files (`<cache_key>.json`)
pub const CACHE_FILE_EXTENSION: &str = "json";

/// Row-major matrix of embedding vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct EmbeddingMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl TryFrom<RawMatrix> for EmbeddingMatrix {
    type Error = String;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        let expected = raw
            .rows
            .checked_mul(raw.cols)
            .ok_or_else(|| format!("shape {}x{} overflows", raw.rows, raw.cols))?;
        if raw.data.len() != expected {
            return Err(format!(
                "shape {}x{} needs {} values, found {}",
                raw.rows,
                raw.cols,
                expected,
                raw.data.len()
            ));
        }
        if raw.rows > 0 && raw.cols == 0 {
            return Err(format!("{} rows of width 0", raw.rows));
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

impl EmbeddingMatrix {
    /// Zero-row matrix of the given width.
    pub fn empty(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Iterate rows in insertion order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.rows).map(move |i| {
            let start = i * self.cols;
            &self.data[start..start + self.cols]
        })
    }

    /// Append a row; its width must equal `cols` and every value must be
    /// finite.
    pub fn push_row(&mut self, values: &[f32]) -> Result<(), VectorError> {
        if values.len() != self.cols {
            return Err(VectorError::DimensionMismatch {
                expected: self.cols,
                actual: values.len(),
            });
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(VectorError::NonFinite { position });
        }
        self.data.extend_from_slice(values);
        self.rows += 1;
        Ok(())
    }

    /// Drop every row, keeping the width.
    pub fn clear(&mut self) {
        self.data.clear();
        self.rows = 0;
    }
}

/// Persisted state of one cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContent")]
pub struct CacheContent {
    texts: Vec<String>,
    embeddings: EmbeddingMatrix,
}

#[derive(Deserialize)]
struct RawContent {
    texts: Vec<String>,
    embeddings: EmbeddingMatrix,
}

impl TryFrom<RawContent> for CacheContent {
    type Error = String;

    fn try_from(raw: RawContent) -> Result<Self, Self::Error> {
        if raw.texts.len() != raw.embeddings.rows() {
            return Err(format!(
                "{} texts but {} embedding rows",
                raw.texts.len(),
                raw.embeddings.rows()
            ));
        }
        Ok(Self {
            texts: raw.texts,
            embeddings: raw.embeddings,
        })
    }
}

impl CacheContent {
    /// Empty content for embeddings of width `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            texts: Vec::new(),
            embeddings: EmbeddingMatrix::empty(dimension),
        }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn embeddings(&self) -> &EmbeddingMatrix {
        &self.embeddings
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Width of every stored embedding
    pub fn dimension(&self) -> usize {
        self.embeddings.cols()
    }

    /// Append a text and its embedding. Nothing changes when the row is
    /// rejected.
    pub fn push(&mut self, text: String, embedding: &Embedding) -> Result<(), VectorError> {
        self.embeddings.push_row(&embedding.values)?;
        self.texts.push(text);
        Ok(())
    }

    /// Remove every entry, keeping the embedding width.
    pub fn clear(&mut self) {
        self.texts.clear();
        self.embeddings.clear();
    }

    /// Load content from `path`.
    ///
    /// A missing or whitespace-only file yields empty content of width
    /// `dimension`. A stored matrix with rows of another width is a
    /// dimension mismatch; an empty stored matrix adopts `dimension`.
    pub fn load(path: &Path, dimension: usize) -> Result<Self, VectorError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?path, "No cache file, starting empty");
                return Ok(Self::new(dimension));
            }
            Err(source) => {
                return Err(VectorError::Load {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            warn!(path = ?path, "Cache file is empty, starting empty");
            return Ok(Self::new(dimension));
        }

        let content: CacheContent =
            serde_json::from_str(&raw).map_err(|e| VectorError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if content.is_empty() {
            return Ok(Self::new(dimension));
        }
        if content.dimension() != dimension {
            return Err(VectorError::DimensionMismatch {
                expected: dimension,
                actual: content.dimension(),
            });
        }
        Ok(content)
    }

    /// Atomically write content to `path`.
    pub fn persist(&self, path: &Path) -> Result<(), VectorError> {
        let bytes = serde_json::to_vec(self)?;
        let temp_path = temp_path_for(path);

        let result = write_synced(&temp_path, &bytes).and_then(|()| fs::rename(&temp_path, path));
        if let Err(source) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(VectorError::Persist {
                path: path.to_path_buf(),
                source,
            });
        }

        debug!(path = ?path, entries = self.len(), bytes = bytes.len(), "Persisted cache");
        Ok(())
    }
}

/// `<name>.json` -> `<name>.json.tmp`
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
