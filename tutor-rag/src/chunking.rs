//! Section-aware document chunking.
//!
//! This module provides the [`Chunker`] trait and [`SectionChunker`], which
//! treats every level-2 markdown heading (`## `) as a hard section boundary.

use crate::document::{Chunk, Document};

/// The level-2 heading marker used as the default section boundary.
pub const DEFAULT_SECTION_MARKER: &str = "## ";

/// Sections whose trimmed length is at or below this many characters are dropped.
pub const DEFAULT_MIN_CHUNK_LENGTH: usize = 100;

/// A strategy for splitting documents into chunks.
///
/// Chunking never fails. A document may contribute zero chunks, and callers
/// must tolerate that.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// A raw section of a document before trimming and length filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Index of the section in the split.
    pub ordinal: usize,
    /// Marker text re-prepended to this section, empty for the preamble.
    pub prefix: &'a str,
    /// Section body as it appears in the source after the marker.
    pub body: &'a str,
}

impl Section<'_> {
    /// The untrimmed section text, heading marker included.
    pub fn text(&self) -> String {
        format!("{}{}", self.prefix, self.body)
    }
}

/// Split `text` at every `"\n" + marker` occurrence.
///
/// The first section is the preamble before the first boundary. Every later
/// section carries `marker` as its prefix, so joining the section texts with
/// `"\n"` reproduces `text` exactly.
pub fn split_sections<'a>(text: &'a str, marker: &'a str) -> Vec<Section<'a>> {
    let boundary = format!("\n{marker}");
    text.split(boundary.as_str())
        .enumerate()
        .map(|(ordinal, body)| {
            let prefix = if ordinal == 0 { "" } else { marker };
            Section { ordinal, prefix, body }
        })
        .collect()
}

/// Splits documents at level-2 headings, one chunk per section.
///
/// Each non-preamble chunk starts with its own heading line so the heading
/// context is embedded with the body. Sections whose trimmed text has at
/// most `min_chunk_length` characters are discarded, but they still consume
/// an ordinal: `ordinal` reflects the structural position in the source.
///
/// # Example
///
/// ```rust,ignore
/// use tutor_rag::{Chunker, Document, SectionChunker};
///
/// let chunker = SectionChunker::default();
/// let chunks = chunker.chunk(&Document::new("intro", text));
/// ```
#[derive(Debug, Clone)]
pub struct SectionChunker {
    marker: String,
    min_chunk_length: usize,
}

impl SectionChunker {
    /// Create a new `SectionChunker`.
    ///
    /// # Arguments
    ///
    /// * `marker` — heading marker that opens a section, e.g. `"## "`
    /// * `min_chunk_length` — sections must be strictly longer than this many characters
    pub fn new(marker: impl Into<String>, min_chunk_length: usize) -> Self {
        Self { marker: marker.into(), min_chunk_length }
    }

    /// Return the minimum chunk length in characters.
    pub fn min_chunk_length(&self) -> usize {
        self.min_chunk_length
    }
}

impl Default for SectionChunker {
    fn default() -> Self {
        Self::new(DEFAULT_SECTION_MARKER, DEFAULT_MIN_CHUNK_LENGTH)
    }
}

impl Chunker for SectionChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        split_sections(&document.text, &self.marker)
            .into_iter()
            .filter_map(|section| {
                let text = section.text();
                let trimmed = text.trim();
                if trimmed.chars().count() <= self.min_chunk_length {
                    return None;
                }
                Some(Chunk {
                    text: trimmed.to_string(),
                    source_id: document.id.clone(),
                    ordinal: section.ordinal,
                })
            })
            .collect()
    }
}
