//! Splits raw source text into bounded, ordered spans for embedding.
//!
//! Splitting is grapheme-cluster aware so multibyte text is never cut inside
//! a visible character. Concatenating the output reproduces the input
//! exactly; no trimming or normalization happens here.

use unicode_segmentation::UnicodeSegmentation;

/// Splits `text` into consecutive non-overlapping spans of at most `size`
/// grapheme clusters, preserving original order. The final span may be
/// shorter. Empty input (or a zero size) yields no chunks.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    if size == 0 || text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for grapheme in text.graphemes(true) {
        current.push_str(grapheme);
        count += 1;
        if count == size {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Returns the longest prefix of `text` holding at most `max` grapheme
/// clusters. Used to bound crawled page text before chunking and the
/// assembled context before prompting.
pub fn truncate_graphemes(text: &str, max: usize) -> &str {
    match text.grapheme_indices(true).nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_reconstruct_input() {
        let text = "The quick brown fox jumps over the lazy dog";
        let chunks = chunk_text(text, 7);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn all_chunks_but_last_are_full() {
        let chunks = chunk_text("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let chunks = chunk_text("abcdef", 3);
        assert_eq!(chunks, vec!["abc", "def"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_text("", 500).is_empty());
    }

    #[test]
    fn zero_size_yields_no_chunks() {
        assert!(chunk_text("abc", 0).is_empty());
    }

    #[test]
    fn never_splits_a_grapheme_cluster() {
        // "e" followed by a combining acute accent forms one cluster.
        let text = "ae\u{301}io";
        let chunks = chunk_text(text, 2);
        assert_eq!(chunks, vec!["ae\u{301}", "io"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn truncate_bounds_by_graphemes() {
        assert_eq!(truncate_graphemes("abcdef", 4), "abcd");
        assert_eq!(truncate_graphemes("abc", 10), "abc");
        assert_eq!(truncate_graphemes("ae\u{301}io", 2), "ae\u{301}");
    }
}
