//! Document sources that feed the ingestion pipeline.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::{RagError, Result};

/// Supplies the documents of a corpus.
///
/// The pipeline only needs a stable name and a text payload per document;
/// how they are discovered is up to the implementation.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Enumerate every document in the source.
    ///
    /// Returning an empty `Vec` is allowed here; the retriever turns it into
    /// [`RagError::NoDocuments`].
    async fn documents(&self) -> Result<Vec<Document>>;

    /// Human-readable description used in logs and errors.
    fn describe(&self) -> String;
}

#[async_trait]
impl DocumentSource for Vec<Document> {
    async fn documents(&self) -> Result<Vec<Document>> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory corpus of {} documents", self.len())
    }
}

/// Reads every file with a given extension directly inside one directory.
///
/// Subdirectories are not searched. Documents are returned sorted by path
/// and named after the file stem, so `lectures/01_intro.md` becomes
/// `01_intro`.
///
/// # Example
///
/// ```rust,ignore
/// use tutor_rag::{DirectorySource, DocumentSource};
///
/// let source = DirectorySource::new("Lecture");
/// let documents = source.documents().await?;
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    /// Create a source over the markdown files in `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), extension: "md".to_string() }
    }

    /// Match files with `extension` (without the leading dot) instead of `md`.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Return the directory this source reads from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn discover(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            warn!(root = %self.root.display(), "document directory does not exist");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.map_err(|e| {
                warn!(root = %self.root.display(), error = %e, "failed to list documents");
                RagError::Io(e.into())
            })?;
            let matches_extension =
                entry.path().extension().is_some_and(|ext| ext == self.extension.as_str());
            if entry.file_type().is_file() && matches_extension {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn documents(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        for path in self.discover()? {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                warn!(path = %path.display(), error = %e, "failed to read document");
                RagError::Io(e)
            })?;
            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %path.display(), "document is not valid UTF-8, decoding lossily");
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };

            let id = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            debug!(document.id = %id, bytes = text.len(), "loaded document");

            documents.push(Document {
                id,
                text,
                source_uri: Some(path.display().to_string()),
            });
        }
        Ok(documents)
    }

    fn describe(&self) -> String {
        format!("{} (*.{})", self.root.display(), self.extension)
    }
}
