//! Property tests for the chunker: splitting never loses or reorders text,
//! and every chunk but the last is exactly full.

use proptest::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

use ragfolio::chunker::{chunk_text, truncate_graphemes};

proptest! {
    #[test]
    fn concatenating_chunks_reconstructs_the_input(
        text in "\\PC{0,200}",
        size in 1usize..64,
    ) {
        let chunks = chunk_text(&text, size);
        prop_assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn every_chunk_but_the_last_is_exactly_full(
        text in "\\PC{0,200}",
        size in 1usize..64,
    ) {
        let chunks = chunk_text(&text, size);
        for chunk in chunks.iter().take(chunks.len().saturating_sub(1)) {
            prop_assert_eq!(chunk.graphemes(true).count(), size);
        }
        if let Some(last) = chunks.last() {
            let len = last.graphemes(true).count();
            prop_assert!(len > 0 && len <= size);
        }
    }

    #[test]
    fn truncation_is_a_prefix_within_the_bound(
        text in "\\PC{0,200}",
        max in 0usize..64,
    ) {
        let truncated = truncate_graphemes(&text, max);
        prop_assert!(text.starts_with(truncated));
        prop_assert!(truncated.graphemes(true).count() <= max);
    }
}
