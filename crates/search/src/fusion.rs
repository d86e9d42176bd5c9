//! Score fusion: merges the semantic and lexical candidate lists into one
//! deterministic ranking.
//!
//! Pipeline, in order:
//!
//! 1. Union of both lists. A passage missing from one list takes that list's
//!    minimum observed raw score (0 if the list is empty).
//! 2. Per-list min-max normalization into `[0, 1]`. A list with a single
//!    distinct value normalizes to 1.0, so an empty list (all zeros after the
//!    fill) contributes 1.0 to every candidate.
//! 3. `combined = semantic_weight * semantic_norm + lexical_weight * lexical_norm`.
//! 4. One multiplicative `boost_factor` per distinct extracted term found in the
//!    passage text (case-insensitive).
//! 5. Drop candidates whose boosted score is below `min_similarity`.
//! 6. Sort by score, then semantic rank, then passage id. Ranks are dense from 1.
//! 7. Truncate to `top_k`.
//!
//! Boosted scores are not clamped and may exceed 1.0; they are only meaningful
//! relative to each other.

use crate::config::RetrievalConfig;
use crate::error::{Result, SearchError};
use regscope_corpus::{Passage, PassageStore};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Raw evidence for one passage before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub passage_id: String,
    pub semantic_raw: Option<f32>,
    pub lexical_raw: Option<f32>,
    /// Zero-based position in the semantic list
    pub semantic_rank: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredResult {
    pub passage: Passage,
    pub semantic_norm: f32,
    pub lexical_norm: f32,
    pub combined_score: f32,
    pub boost_multiplier: f32,
    pub final_score: f32,
    pub rank: u32,
    /// Extracted terms found in the passage, in query order
    pub matched_terms: Vec<String>,
}

/// Weighted, boosted, thresholded fusion of two candidate lists
#[derive(Debug, Clone)]
pub struct ScoreFusion {
    config: RetrievalConfig,
}

impl ScoreFusion {
    pub fn new(config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Fuse `(passage_id, raw_score)` lists into at most `top_k` ranked results.
    ///
    /// Fails only when a candidate id is missing from `passages`.
    pub fn fuse(
        &self,
        semantic: &[(String, f32)],
        lexical: &[(String, f32)],
        extracted_terms: &[String],
        passages: &dyn PassageStore,
    ) -> Result<Vec<ScoredResult>> {
        let candidates = union_candidates(semantic, lexical);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let semantic_norm = normalize_side(&candidates, |c| c.semantic_raw);
        let lexical_norm = normalize_side(&candidates, |c| c.lexical_raw);
        let terms = distinct_terms(extracted_terms);

        let mut ranked: Vec<(ScoredResult, Option<usize>)> = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            let passage = passages
                .get(&candidate.passage_id)
                .ok_or_else(|| SearchError::MissingPassage(candidate.passage_id.clone()))?;

            let combined_score = self.config.semantic_weight * semantic_norm[i]
                + self.config.lexical_weight * lexical_norm[i];

            let mut boost_multiplier = 1.0f32;
            let mut matched_terms = Vec::new();
            for term in &terms {
                if passage.contains_term(term) {
                    boost_multiplier *= self.config.boost_factor;
                    matched_terms.push(term.clone());
                }
            }
            let final_score = combined_score * boost_multiplier;

            if final_score < self.config.min_similarity {
                continue;
            }

            ranked.push((
                ScoredResult {
                    passage: passage.clone(),
                    semantic_norm: semantic_norm[i],
                    lexical_norm: lexical_norm[i],
                    combined_score,
                    boost_multiplier,
                    final_score,
                    rank: 0,
                    matched_terms,
                },
                candidate.semantic_rank,
            ));
        }

        ranked.sort_by(|(a, a_rank), (b, b_rank)| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| cmp_semantic_rank(*a_rank, *b_rank))
                .then_with(|| a.passage.id.cmp(&b.passage.id))
        });
        ranked.truncate(self.config.top_k);

        let results: Vec<ScoredResult> = ranked
            .into_iter()
            .enumerate()
            .map(|(i, (mut result, _))| {
                #[allow(clippy::cast_possible_truncation)]
                let rank = (i + 1) as u32;
                result.rank = rank;
                result
            })
            .collect();

        log::debug!(
            "Fused {} candidates into {} results (min_similarity={})",
            candidates.len(),
            results.len(),
            self.config.min_similarity
        );
        Ok(results)
    }
}

/// Semantic candidates first in list order, then lexical-only ones.
/// Non-finite raw scores count as missing; repeated ids keep their first score.
fn union_candidates(semantic: &[(String, f32)], lexical: &[(String, f32)]) -> Vec<CandidateScore> {
    let mut candidates: Vec<CandidateScore> = Vec::new();
    let mut slot_by_id: HashMap<&str, usize> = HashMap::new();

    for (rank, (id, score)) in semantic.iter().enumerate() {
        if slot_by_id.contains_key(id.as_str()) {
            continue;
        }
        slot_by_id.insert(id.as_str(), candidates.len());
        candidates.push(CandidateScore {
            passage_id: id.clone(),
            semantic_raw: score.is_finite().then_some(*score),
            lexical_raw: None,
            semantic_rank: Some(rank),
        });
    }

    let mut seen_lexical: HashSet<&str> = HashSet::new();
    for (id, score) in lexical {
        if !seen_lexical.insert(id.as_str()) {
            continue;
        }
        let raw = score.is_finite().then_some(*score);
        match slot_by_id.get(id.as_str()) {
            Some(&slot) => candidates[slot].lexical_raw = raw,
            None => {
                slot_by_id.insert(id.as_str(), candidates.len());
                candidates.push(CandidateScore {
                    passage_id: id.clone(),
                    semantic_raw: None,
                    lexical_raw: raw,
                    semantic_rank: None,
                });
            }
        }
    }

    candidates
}

/// Default-fill missing values with the side's minimum, then min-max scale
fn normalize_side(
    candidates: &[CandidateScore],
    raw: impl Fn(&CandidateScore) -> Option<f32>,
) -> Vec<f32> {
    let fill = candidates
        .iter()
        .filter_map(&raw)
        .reduce(f32::min)
        .unwrap_or(0.0);

    let filled: Vec<f32> = candidates
        .iter()
        .map(|c| raw(c).unwrap_or(fill))
        .collect();

    let min = filled.iter().copied().fold(f32::INFINITY, f32::min);
    let max = filled.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    // Only exactly equal values take the single-value rule
    if max <= min {
        return vec![1.0; filled.len()];
    }

    let range = max - min;
    filled.into_iter().map(|v| (v - min) / range).collect()
}

/// Terms deduplicated case-insensitively, first casing kept, empties dropped
fn distinct_terms(terms: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .cloned()
        .collect()
}

fn cmp_semantic_rank(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
