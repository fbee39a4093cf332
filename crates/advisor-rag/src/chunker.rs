//! Sliding-window document chunker

use serde::{Deserialize, Serialize};

use advisor_core::{Chunk, Error, Result, SourceDocument};

/// Configuration for document chunking, measured in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Splits documents into fixed-size overlapping windows
///
/// Windows never cross a document boundary and every chunk inherits the source
/// URL and domain of its parent document.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Create a chunker, rejecting an overlap that would stall the window
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(Error::Chunking("chunk_size must be at least 1".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(Error::Chunking(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> ChunkingConfig {
        self.config
    }

    /// Split every document, preserving document order
    pub fn split(&self, documents: &[SourceDocument]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|document| self.split_document(document))
            .collect()
    }

    /// Split a single document into chunks
    pub fn split_document(&self, document: &SourceDocument) -> Vec<Chunk> {
        self.windows(&document.text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Chunk {
                text,
                domain: document.domain,
                source_url: document.url.clone(),
                ordinal,
            })
            .collect()
    }

    fn windows(&self, content: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let chars: Vec<char> = content.chars().collect();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.config.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());

            if end >= chars.len() {
                break;
            }

            start = end - self.config.chunk_overlap;
        }

        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::Domain;

    fn document(text: &str) -> SourceDocument {
        SourceDocument::new("https://example.com/guide", text, Domain::Migration)
    }

    fn expected_count(len: usize) -> usize {
        if len <= 1000 { 1 } else { (len - 200).div_ceil(800) }
    }

    /// Drop the leading overlap of every chunk after the first and concatenate
    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                if i == 0 {
                    chunk.text.clone()
                } else {
                    chunk.text.chars().skip(overlap).collect()
                }
            })
            .collect()
    }

    #[test]
    fn test_chunk_count_and_reconstruction() {
        let chunker = Chunker::default();
        for len in [1, 999, 1000, 1001, 1800, 1801, 2600, 5000, 12_345] {
            let text: String = (0..len)
                .map(|i| char::from(b'a' + (i % 26) as u8))
                .collect();
            let chunks = chunker.split_document(&document(&text));

            let expected = expected_count(len);
            assert!(
                chunks.len().abs_diff(expected) <= 1,
                "len {}: got {} chunks, expected about {}",
                len,
                chunks.len(),
                expected
            );
            assert_eq!(reconstruct(&chunks, 200), text, "len {}", len);
            assert!(chunks.iter().all(|c| c.text.chars().count() <= 1000));
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text: String = "0123456789".repeat(250);
        let chunks = Chunker::default().split_document(&document(&text));
        assert_eq!(chunks.len(), 3);

        let tail: String = chunks[0].text.chars().skip(800).collect();
        let head: String = chunks[1].text.chars().take(200).collect();
        assert_eq!(tail, head);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "é".repeat(1500);
        let chunks = Chunker::default().split_document(&document(&text));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.chars().count(), 1000);
        assert_eq!(chunks[1].text.chars().count(), 700);
    }

    #[test]
    fn test_metadata_inherited_and_no_boundary_crossing() {
        let docs = vec![
            SourceDocument::new("https://a.example/one", "a".repeat(1500), Domain::Costing),
            SourceDocument::new("https://b.example/two", "b".repeat(300), Domain::Costing),
        ];
        let chunks = Chunker::default().split(&docs);

        assert_eq!(chunks.len(), 3);
        assert!(chunks[..2].iter().all(|c| c.source_url == "https://a.example/one"));
        assert!(chunks[..2].iter().all(|c| c.text.chars().all(|ch| ch == 'a')));
        assert_eq!(chunks[2].source_url, "https://b.example/two");
        assert_eq!(chunks[2].text, "b".repeat(300));
        assert_eq!(chunks[2].ordinal, 0);
        assert!(chunks.iter().all(|c| c.domain == Domain::Costing));
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        assert!(Chunker::default().split_document(&document("")).is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 100,
        };
        assert!(matches!(Chunker::new(config), Err(Error::Chunking(_))));

        let config = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        };
        assert!(Chunker::new(config).is_err());
    }
}
