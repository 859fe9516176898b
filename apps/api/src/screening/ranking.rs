#![allow(dead_code)]

//! Ranking Engine — combines per-candidate sub-scores into a total and orders the pool.
//!
//! Stateless: every function takes the job, the candidates and the weights as
//! arguments. `rank_parallel` fans candidate scoring out over the blocking pool
//! and fans back in to the sort.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::debug;

use crate::models::candidate::{Candidate, ScoreSet, ScreeningResult};
use crate::models::job::JobPosting;
use crate::screening::similarity::SimilarityScorer;
use crate::screening::ScreeningError;

/// Weights applied to the two sub-scores. Not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub skill_overlap: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            skill_overlap: 0.4,
        }
    }
}

/// |job ∩ candidate| / max(1, |job|). Always in [0.0, 1.0].
pub fn compute_skill_overlap(job_skills: &[String], candidate_skills: &[String]) -> f64 {
    if job_skills.is_empty() {
        return 0.0;
    }
    let candidate: HashSet<&str> = candidate_skills.iter().map(String::as_str).collect();
    let job: HashSet<&str> = job_skills.iter().map(String::as_str).collect();
    let shared = job.iter().filter(|s| candidate.contains(*s)).count();
    shared as f64 / job.len().max(1) as f64
}

pub fn compute_total(weights: &ScoringWeights, similarity: f64, skill_overlap: f64) -> f64 {
    weights.similarity * similarity + weights.skill_overlap * skill_overlap
}

pub fn score_candidate(
    job: &JobPosting,
    candidate: &Candidate,
    scorer: &dyn SimilarityScorer,
    weights: &ScoringWeights,
) -> ScreeningResult {
    let similarity = scorer.score(&job.text, &candidate.text);
    let skill_overlap = compute_skill_overlap(&job.skills, &candidate.skills);
    let total = compute_total(weights, similarity, skill_overlap);

    debug!(
        candidate_id = candidate.id,
        similarity, skill_overlap, total, "Scored candidate"
    );

    ScreeningResult::new(
        candidate,
        ScoreSet {
            similarity,
            skill_overlap,
            total,
        },
    )
}

/// Total descending, then candidate id ascending.
pub fn sort_results(results: &mut [ScreeningResult]) {
    results.sort_by(|a, b| match b.scores.total.total_cmp(&a.scores.total) {
        Ordering::Equal => a.id.cmp(&b.id),
        other => other,
    });
}

/// Scores every candidate on the calling thread.
pub fn rank(
    job: &JobPosting,
    candidates: &[Arc<Candidate>],
    scorer: &dyn SimilarityScorer,
    weights: &ScoringWeights,
) -> Vec<ScreeningResult> {
    let mut results: Vec<ScreeningResult> = candidates
        .iter()
        .map(|c| score_candidate(job, c, scorer, weights))
        .collect();
    sort_results(&mut results);
    results
}

/// Scores candidates on the blocking pool in roughly one chunk per core.
///
/// The final order does not depend on which worker finishes first.
pub async fn rank_parallel(
    job: Arc<JobPosting>,
    candidates: Vec<Arc<Candidate>>,
    scorer: Arc<dyn SimilarityScorer>,
    weights: ScoringWeights,
) -> Result<Vec<ScreeningResult>, ScreeningError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let chunk_size = candidates.len().div_ceil(workers).max(1);

    let mut tasks = JoinSet::new();
    for chunk in candidates.chunks(chunk_size) {
        let chunk = chunk.to_vec();
        let job = Arc::clone(&job);
        let scorer = Arc::clone(&scorer);
        tasks.spawn_blocking(move || {
            chunk
                .iter()
                .map(|c| score_candidate(&job, c, scorer.as_ref(), &weights))
                .collect::<Vec<_>>()
        });
    }

    let mut results = Vec::with_capacity(candidates.len());
    while let Some(joined) = tasks.join_next().await {
        let batch = joined.map_err(|e| ScreeningError::Worker(e.to_string()))?;
        results.extend(batch);
    }

    sort_results(&mut results);
    Ok(results)
}
