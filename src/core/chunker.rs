//! Sentence splitting and chunk grouping for model input limits

use regex::Regex;
use std::sync::LazyLock;

use crate::core::config::DEFAULT_CHUNK_SIZE;

// Terminal punctuation followed by a whitespace run. Abbreviations and
// decimals are not special-cased.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Split trimmed text into sentences.
///
/// The punctuation stays with its sentence, the whitespace run after it is
/// dropped. Text without a boundary is a single sentence; blank text has none.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // the punctuation is a single ASCII byte
        sentences.push(&text[start..boundary.start() + 1]);
        start = boundary.end();
    }
    sentences.push(&text[start..]);
    sentences
}

/// Groups consecutive sentences into fixed-size chunks
#[derive(Debug, Clone, Copy)]
pub struct SentenceChunker {
    chunk_size: usize,
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl SentenceChunker {
    /// Create a chunker; a size of 0 is treated as 1
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Maximum sentences per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunks in input order, each chunk's sentences joined by one space.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        split_sentences(text)
            .chunks(self.chunk_size)
            .map(|sentences| sentences.join(" "))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_sentences(n: usize) -> String {
        (1..=n)
            .map(|i| format!("Sentence number {i}."))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_no_terminal_punctuation_is_one_chunk() {
        let chunks = SentenceChunker::default().chunk("  just some words without an end \n");
        assert_eq!(chunks, vec!["just some words without an end".to_string()]);
    }

    #[test]
    fn test_blank_text_has_no_chunks() {
        assert!(split_sentences("   \t\n").is_empty());
        assert!(SentenceChunker::default().chunk("").is_empty());
    }

    #[test]
    fn test_split_on_each_terminator() {
        let sentences = split_sentences("Hello there! How are you?\tFine.\n\nGood");
        assert_eq!(sentences, vec!["Hello there!", "How are you?", "Fine.", "Good"]);
    }

    #[test]
    fn test_punctuation_without_whitespace_does_not_split() {
        assert_eq!(split_sentences("Version 3.14 is out.Really"), vec!["Version 3.14 is out.Really"]);
        // abbreviations are split, that imprecision is accepted
        assert_eq!(split_sentences("Dr. Who"), vec!["Dr.", "Who"]);
    }

    #[test]
    fn test_chunk_counts() {
        let chunker = SentenceChunker::new(10);
        for n in [1, 9, 10, 11, 20, 25] {
            let chunks = chunker.chunk(&numbered_sentences(n));
            assert_eq!(chunks.len(), n.div_ceil(10), "n = {n}");

            let sizes: Vec<usize> = chunks.iter().map(|c| split_sentences(c).len()).collect();
            for size in &sizes[..sizes.len() - 1] {
                assert_eq!(*size, 10);
            }
            assert_eq!(sizes.iter().sum::<usize>(), n);
        }
    }

    #[test]
    fn test_chunks_preserve_order() {
        let chunks = SentenceChunker::new(2).chunk("A. B. C. D. E.");
        assert_eq!(chunks, vec!["A. B.", "C. D.", "E."]);
    }

    #[test]
    fn test_joined_chunks_reconstruct_normalized_text() {
        let text = "  One.   Two!\nThree?  Four five.\t\tSix  ";
        let chunks = SentenceChunker::new(4).chunk(text);
        assert_eq!(chunks.join(" "), "One. Two! Three? Four five. Six");
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let chunker = SentenceChunker::new(0);
        assert_eq!(chunker.chunk_size(), 1);
        assert_eq!(chunker.chunk("A. B.").len(), 2);
    }
}
