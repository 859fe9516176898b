#![allow(dead_code)]

//! Screening Session — the active job, the candidate pool and the last scores.
//!
//! Passed around explicitly (the HTTP layer keeps one behind a `tokio::sync::RwLock`).
//! Screening never runs while the session is borrowed: callers take a
//! `snapshot`, release the lock, score, then `record_run` the outcome.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::candidate::{Candidate, CandidateDraft, ScoreSet};
use crate::models::job::JobPosting;
use crate::screening::{ScreeningContext, ScreeningEngine, ScreeningError, ScreeningRun};

#[derive(Debug)]
pub struct ScreeningSession {
    job: Option<Arc<JobPosting>>,
    candidates: Vec<Arc<Candidate>>,
    /// Scores from the last run against the current job, by candidate id.
    scores: HashMap<u64, ScoreSet>,
    next_job_id: u64,
    next_candidate_id: u64,
}

impl Default for ScreeningSession {
    fn default() -> Self {
        Self {
            job: None,
            candidates: Vec::new(),
            scores: HashMap::new(),
            next_job_id: 1,
            next_candidate_id: 1,
        }
    }
}

impl ScreeningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(&self) -> Option<&Arc<JobPosting>> {
        self.job.as_ref()
    }

    /// Candidates in admission (id) order.
    pub fn candidates(&self) -> &[Arc<Candidate>] {
        &self.candidates
    }

    pub fn scores_for(&self, candidate_id: u64) -> Option<ScoreSet> {
        self.scores.get(&candidate_id).copied()
    }

    /// Replaces the active job. Scores computed against the previous job are dropped.
    pub fn set_job(
        &mut self,
        engine: &ScreeningEngine,
        description: &str,
    ) -> Result<Arc<JobPosting>, ScreeningError> {
        let job = Arc::new(engine.build_job(self.next_job_id, description)?);
        self.next_job_id += 1;
        self.scores.clear();
        self.job = Some(Arc::clone(&job));

        info!(job_id = job.id, skills = job.skills.len(), "Active job set");
        Ok(job)
    }

    /// Assigns ids to extracted resumes and adds them to the pool.
    pub fn admit(&mut self, drafts: Vec<CandidateDraft>) -> Vec<Arc<Candidate>> {
        let admitted: Vec<Arc<Candidate>> = drafts
            .into_iter()
            .map(|draft| {
                let id = self.next_candidate_id;
                self.next_candidate_id += 1;
                Arc::new(draft.into_candidate(id))
            })
            .collect();

        self.candidates.extend(admitted.iter().cloned());
        info!(
            admitted = admitted.len(),
            pool = self.candidates.len(),
            "Candidates admitted"
        );
        admitted
    }

    pub fn snapshot(&self) -> ScreeningContext {
        ScreeningContext {
            job: self.job.clone(),
            candidates: self.candidates.clone(),
        }
    }

    /// Stores a run's scores. A run against a job that has since been replaced
    /// is discarded; returns whether the scores were kept.
    pub fn record_run(&mut self, run: &ScreeningRun) -> bool {
        let current = self.job.as_ref().map(|job| job.id);
        if current != Some(run.job.id) {
            debug!(run_id = %run.run_id, "Discarding scores for a replaced job");
            return false;
        }
        for result in &run.results {
            self.scores.insert(result.id, result.scores);
        }
        true
    }
}
