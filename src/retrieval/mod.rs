//! Ranks cached chunk records against a query embedding and assembles a
//! bounded, reading-ordered context string.
//!
//! The engine only ever sees an in-memory corpus snapshot; it never touches
//! persisted storage. Scoring is a linear scan: the corpus is a single
//! portfolio's worth of chunks, so no index structure is kept.

pub mod similarity;

pub use similarity::cosine_similarity;

use crate::chunker::truncate_graphemes;
use crate::types::{Corpus, RagError};

/// Tuning knobs for retrieval. The defaults mirror the production
/// deployment: top-quartile dynamic threshold floored at 0.7, three
/// snippets, 8000-character context window.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Query tokens must be strictly longer than this to participate in the
    /// keyword pre-filter.
    pub min_token_len: usize,
    /// Percentile rank (0.0 = best score) used as the dynamic threshold.
    pub threshold_percentile: f64,
    /// Floor applied to the dynamic threshold so small or uniformly
    /// dissimilar corpora never surface weak matches.
    pub min_similarity: f32,
    /// Maximum number of chunk contents assembled into the context.
    pub max_snippets: usize,
    /// Maximum context length in grapheme clusters.
    pub max_context_len: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            threshold_percentile: 0.25,
            min_similarity: 0.7,
            max_snippets: 3,
            max_context_len: 8000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Scored {
    /// Index into the corpus record slice.
    index: usize,
    similarity: f32,
}

/// Similarity-ranking engine over a corpus snapshot.
#[derive(Debug, Clone, Default)]
pub struct RetrievalEngine {
    config: RetrievalConfig,
}

impl RetrievalEngine {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Produces the context window for `query`: keyword pre-filter, cosine
    /// scoring, dynamic thresholding, reading-order assembly. An empty
    /// result means no record was relevant enough; the caller decides how
    /// to respond to that.
    pub fn retrieve(
        &self,
        query: &str,
        query_embedding: &[f32],
        corpus: &Corpus,
    ) -> Result<String, RagError> {
        if corpus.is_empty() {
            return Ok(String::new());
        }

        let candidates = self.keyword_prefilter(query, corpus);

        let mut scored = Vec::with_capacity(candidates.len());
        for index in candidates {
            let record = &corpus.records()[index];
            if record.embedding.len() != query_embedding.len() {
                return Err(RagError::DimensionMismatch {
                    expected: record.embedding.len(),
                    actual: query_embedding.len(),
                });
            }
            scored.push(Scored {
                index,
                similarity: cosine_similarity(query_embedding, &record.embedding),
            });
        }

        let threshold = self.dynamic_threshold(&scored);
        let mut selected: Vec<Scored> = scored
            .into_iter()
            .filter(|entry| entry.similarity >= threshold)
            .collect();

        if selected.is_empty() {
            return Ok(String::new());
        }

        order_for_reading(corpus, &mut selected);

        let mut context = selected
            .iter()
            .take(self.config.max_snippets)
            .map(|entry| corpus.records()[entry.index].content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let bounded_len = truncate_graphemes(&context, self.config.max_context_len).len();
        context.truncate(bounded_len);

        tracing::debug!(
            threshold = %threshold,
            selected = selected.len(),
            context_len = context.len(),
            "context assembled"
        );

        Ok(context)
    }

    /// Keeps records whose content contains at least one sufficiently long
    /// query token (case-insensitive). Falls back to the full corpus when
    /// nothing matches: the pre-filter is a precision aid, never a gate.
    fn keyword_prefilter(&self, query: &str, corpus: &Corpus) -> Vec<usize> {
        let lowered = query.to_lowercase();
        let keywords: Vec<&str> = lowered
            .split_whitespace()
            .filter(|word| word.chars().count() > self.config.min_token_len)
            .collect();

        let matches: Vec<usize> = corpus
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                let content = record.content.to_lowercase();
                keywords.iter().any(|keyword| content.contains(keyword))
            })
            .map(|(index, _)| index)
            .collect();

        if matches.is_empty() {
            (0..corpus.len()).collect()
        } else {
            matches
        }
    }

    /// Similarity at the configured percentile rank of the descending-sorted
    /// scores, floored at `min_similarity`.
    fn dynamic_threshold(&self, scored: &[Scored]) -> f32 {
        let mut similarities: Vec<f32> = scored.iter().map(|entry| entry.similarity).collect();
        similarities.sort_by(|a, b| b.total_cmp(a));

        let rank = ((similarities.len() as f64) * self.config.threshold_percentile) as usize;
        let rank = rank.min(similarities.len().saturating_sub(1));

        similarities
            .get(rank)
            .copied()
            .unwrap_or(self.config.min_similarity)
            .max(self.config.min_similarity)
    }
}

/// Orders selected records for assembly: source groups ranked by their best
/// similarity descending, chunks within a group by ascending `chunk_index`
/// so multi-chunk passages keep their reading continuity. Remaining ties
/// fall back to original corpus order.
fn order_for_reading(corpus: &Corpus, selected: &mut [Scored]) {
    use std::collections::HashMap;

    let records = corpus.records();

    // Best similarity and first appearance per source group.
    let mut groups: HashMap<_, (f32, usize)> = HashMap::new();
    for entry in selected.iter() {
        let key = records[entry.index].group_key();
        let slot = groups.entry(key).or_insert((entry.similarity, entry.index));
        if entry.similarity > slot.0 {
            slot.0 = entry.similarity;
        }
        if entry.index < slot.1 {
            slot.1 = entry.index;
        }
    }

    let mut ranked: Vec<_> = groups.into_iter().collect();
    ranked.sort_by(|(_, (sim_a, first_a)), (_, (sim_b, first_b))| {
        sim_b.total_cmp(sim_a).then(first_a.cmp(first_b))
    });
    let rank: HashMap<_, usize> = ranked
        .into_iter()
        .enumerate()
        .map(|(position, (key, _))| (key, position))
        .collect();

    selected.sort_by(|a, b| {
        let record_a = &records[a.index];
        let record_b = &records[b.index];
        rank[&record_a.group_key()]
            .cmp(&rank[&record_b.group_key()])
            .then(record_a.chunk_index.cmp(&record_b.chunk_index))
            .then(a.index.cmp(&b.index))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkRecord;

    fn engine() -> RetrievalEngine {
        RetrievalEngine::new(RetrievalConfig::default())
    }

    /// Unit vector whose cosine similarity against the [1, 0] query is the
    /// given value.
    fn vector_with_similarity(similarity: f32) -> Vec<f32> {
        vec![similarity, (1.0 - similarity * similarity).sqrt()]
    }

    const QUERY: [f32; 2] = [1.0, 0.0];

    #[test]
    fn empty_corpus_yields_empty_context() {
        let context = engine()
            .retrieve("anything at all", &QUERY, &Corpus::default())
            .unwrap();
        assert!(context.is_empty());
    }

    #[test]
    fn strong_match_selected_weak_match_dropped() {
        let corpus = Corpus::new(vec![
            ChunkRecord::cv("strong match", vector_with_similarity(0.9), 0),
            ChunkRecord::cv("weak match", vector_with_similarity(0.5), 1),
        ]);

        let context = engine().retrieve("xy", &QUERY, &corpus).unwrap();
        assert_eq!(context, "strong match");
    }

    #[test]
    fn reading_order_wins_over_similarity_within_a_source() {
        // Second chunk scores higher but must still follow the first.
        let corpus = Corpus::new(vec![
            ChunkRecord::url("first passage", vector_with_similarity(0.8), "https://x", 0),
            ChunkRecord::url("second passage", vector_with_similarity(0.95), "https://x", 1),
        ]);

        let config = RetrievalConfig {
            threshold_percentile: 1.0,
            ..RetrievalConfig::default()
        };
        let context = RetrievalEngine::new(config)
            .retrieve("xy", &QUERY, &corpus)
            .unwrap();
        assert_eq!(context, "first passage\n\nsecond passage");
    }

    #[test]
    fn groups_ordered_by_best_similarity() {
        let corpus = Corpus::new(vec![
            ChunkRecord::url("from site a", vector_with_similarity(0.85), "https://a", 0),
            ChunkRecord::url("from site b", vector_with_similarity(0.99), "https://b", 0),
        ]);

        let config = RetrievalConfig {
            threshold_percentile: 1.0,
            ..RetrievalConfig::default()
        };
        let context = RetrievalEngine::new(config)
            .retrieve("xy", &QUERY, &corpus)
            .unwrap();
        assert_eq!(context, "from site b\n\nfrom site a");
    }

    #[test]
    fn keyword_prefilter_narrows_candidates() {
        let corpus = Corpus::new(vec![
            ChunkRecord::cv("experience with rust services", vector_with_similarity(0.75), 0),
            ChunkRecord::cv("painting and gardening", vector_with_similarity(0.99), 1),
        ]);

        // "rust" only appears in the first record, so the second never
        // reaches scoring despite its higher similarity.
        let context = engine()
            .retrieve("tell me about rust", &QUERY, &corpus)
            .unwrap();
        assert_eq!(context, "experience with rust services");
    }

    #[test]
    fn prefilter_falls_back_to_full_corpus() {
        let corpus = Corpus::new(vec![ChunkRecord::cv(
            "completely unrelated words",
            vector_with_similarity(0.9),
            0,
        )]);

        let context = engine()
            .retrieve("zzzzzz nothing matches", &QUERY, &corpus)
            .unwrap();
        assert_eq!(context, "completely unrelated words");
    }

    #[test]
    fn short_tokens_are_ignored_by_prefilter() {
        let corpus = Corpus::new(vec![ChunkRecord::cv(
            "the cat sat",
            vector_with_similarity(0.9),
            0,
        )]);

        // Every query token is three characters or fewer, so the filter
        // keeps nothing and the full corpus is scored.
        let context = engine().retrieve("the cat", &QUERY, &corpus).unwrap();
        assert_eq!(context, "the cat sat");
    }

    #[test]
    fn raising_the_floor_never_selects_more() {
        let corpus = Corpus::new(vec![
            ChunkRecord::cv("alpha", vector_with_similarity(0.95), 0),
            ChunkRecord::cv("beta", vector_with_similarity(0.80), 1),
            ChunkRecord::cv("gamma", vector_with_similarity(0.60), 2),
        ]);

        let count_selected = |floor: f32| {
            let config = RetrievalConfig {
                min_similarity: floor,
                threshold_percentile: 1.0,
                ..RetrievalConfig::default()
            };
            let context = RetrievalEngine::new(config)
                .retrieve("xy", &QUERY, &corpus)
                .unwrap();
            if context.is_empty() {
                0
            } else {
                context.split("\n\n").count()
            }
        };

        let mut previous = usize::MAX;
        for floor in [0.0, 0.5, 0.7, 0.9, 0.99] {
            let selected = count_selected(floor);
            assert!(selected <= previous, "floor {floor} selected more");
            previous = selected;
        }
    }

    #[test]
    fn context_is_capped_at_three_snippets() {
        let records: Vec<ChunkRecord> = (0..5)
            .map(|i| ChunkRecord::cv(format!("snippet {i}"), vector_with_similarity(0.9), i))
            .collect();
        let corpus = Corpus::new(records);

        let config = RetrievalConfig {
            threshold_percentile: 1.0,
            ..RetrievalConfig::default()
        };
        let context = RetrievalEngine::new(config)
            .retrieve("xy", &QUERY, &corpus)
            .unwrap();
        assert_eq!(context.split("\n\n").count(), 3);
    }

    #[test]
    fn context_is_truncated_to_the_length_bound() {
        let corpus = Corpus::new(vec![ChunkRecord::cv(
            "a".repeat(100),
            vector_with_similarity(0.9),
            0,
        )]);

        let config = RetrievalConfig {
            max_context_len: 40,
            ..RetrievalConfig::default()
        };
        let context = RetrievalEngine::new(config)
            .retrieve("xy", &QUERY, &corpus)
            .unwrap();
        assert_eq!(context.len(), 40);
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let corpus = Corpus::new(vec![ChunkRecord::cv("abc", vec![1.0, 0.0, 0.0], 0)]);

        let err = engine().retrieve("xy", &QUERY, &corpus).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn zero_query_vector_selects_nothing() {
        let corpus = Corpus::new(vec![ChunkRecord::cv("abc", vec![1.0, 0.0], 0)]);

        let context = engine().retrieve("xy", &[0.0, 0.0], &corpus).unwrap();
        assert!(context.is_empty());
    }

    #[test]
    fn ties_break_by_corpus_order() {
        let corpus = Corpus::new(vec![
            ChunkRecord::url("earlier", vector_with_similarity(0.9), "https://a", 0),
            ChunkRecord::url("later", vector_with_similarity(0.9), "https://b", 0),
        ]);

        let config = RetrievalConfig {
            threshold_percentile: 1.0,
            ..RetrievalConfig::default()
        };
        let context = RetrievalEngine::new(config)
            .retrieve("xy", &QUERY, &corpus)
            .unwrap();
        assert_eq!(context, "earlier\n\nlater");
    }
}
