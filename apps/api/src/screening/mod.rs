//! Screening engine — turns a job description and a pool of resumes into a ranked shortlist.
//!
//! `ScreeningEngine` owns the long-lived, shared pieces (skill lexicon, similarity
//! scorer, weights). Per-session state (active job, candidate pool) lives in
//! `session::ScreeningSession` and is handed to `screen` as a snapshot.

pub mod export;
pub mod handlers;
pub mod lexicon;
pub mod ranking;
pub mod session;
pub mod similarity;
pub mod skills;
pub mod tokenizer;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{Config, LexiconMode};
use crate::extraction::{extract_with_deadline, ExtractionError, UploadedFile};
use crate::models::candidate::{Candidate, CandidateDraft, ScreeningResult};
use crate::models::job::JobPosting;
use crate::screening::lexicon::{LexiconError, MergeSummary, SkillEntry, SkillLexicon};
use crate::screening::ranking::{rank_parallel, ScoringWeights};
use crate::screening::similarity::SimilarityScorer;
use crate::screening::skills::extract_skills;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("Set a job description before screening")]
    EmptyJob,

    #[error("Job description is blank")]
    BlankDescription,

    #[error("Scoring worker failed: {0}")]
    Worker(String),
}

/// What a screening run sees: the active job and the candidate pool, frozen
/// at the moment the run starts.
#[derive(Debug, Clone, Default)]
pub struct ScreeningContext {
    pub job: Option<Arc<JobPosting>>,
    pub candidates: Vec<Arc<Candidate>>,
}

/// A file from an upload batch that could not be turned into a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadFailure {
    pub filename: String,
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct PreparedBatch {
    pub drafts: Vec<CandidateDraft>,
    pub failures: Vec<UploadFailure>,
}

#[derive(Debug, Clone)]
pub struct ScreeningRun {
    pub run_id: Uuid,
    pub job: Arc<JobPosting>,
    pub results: Vec<ScreeningResult>,
}

pub struct ScreeningEngine {
    lexicon: RwLock<Arc<SkillLexicon>>,
    scorer: Arc<dyn SimilarityScorer>,
    weights: ScoringWeights,
    extraction_timeout: Duration,
}

impl ScreeningEngine {
    pub fn new(
        lexicon: SkillLexicon,
        scorer: Arc<dyn SimilarityScorer>,
        weights: ScoringWeights,
        extraction_timeout: Duration,
    ) -> Self {
        Self {
            lexicon: RwLock::new(Arc::new(lexicon)),
            scorer,
            weights,
            extraction_timeout,
        }
    }

    /// Builds the engine from configuration, loading the skill table from disk
    /// when `SKILL_LEXICON_PATH` is set.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let lexicon = match (&config.lexicon_path, config.lexicon_mode) {
            (None, _) => SkillLexicon::builtin().context("built-in skill lexicon is invalid")?,
            (Some(path), LexiconMode::Replace) => SkillLexicon::from_path(path)
                .with_context(|| format!("loading skill lexicon {}", path.display()))?,
            (Some(path), LexiconMode::Extend) => {
                let mut lexicon =
                    SkillLexicon::builtin().context("built-in skill lexicon is invalid")?;
                let summary = lexicon
                    .merge_path(path)
                    .with_context(|| format!("merging skill lexicon {}", path.display()))?;
                info!(
                    path = %path.display(),
                    skills_added = summary.skills_added,
                    aliases_added = summary.aliases_added,
                    "Extended built-in skill lexicon"
                );
                lexicon
            }
        };

        info!(
            skills = lexicon.len(),
            aliases = lexicon.alias_count(),
            backend = %config.similarity_backend,
            "Screening engine ready"
        );

        Ok(Self::new(
            lexicon,
            config.similarity_backend.build(config.max_features),
            config.weights,
            config.extraction_timeout,
        ))
    }

    /// Current lexicon snapshot. Later merges do not affect a snapshot already taken.
    pub fn lexicon(&self) -> Arc<SkillLexicon> {
        self.lexicon
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Merges entries into a copy of the lexicon and swaps it in.
    pub fn extend_lexicon(
        &self,
        entries: Vec<SkillEntry>,
    ) -> Result<MergeSummary, LexiconError> {
        let mut guard = self.lexicon.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = (**guard).clone();
        let summary = next.merge(entries)?;
        *guard = Arc::new(next);
        info!(
            skills_added = summary.skills_added,
            aliases_added = summary.aliases_added,
            conflicts = summary.conflicts,
            "Skill lexicon extended"
        );
        Ok(summary)
    }

    pub fn scorer(&self) -> Arc<dyn SimilarityScorer> {
        Arc::clone(&self.scorer)
    }

    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        extract_skills(&self.lexicon(), text)
    }

    /// Builds a job posting from a raw description. Blank descriptions are rejected.
    pub fn build_job(&self, id: u64, description: &str) -> Result<JobPosting, ScreeningError> {
        if description.trim().is_empty() {
            return Err(ScreeningError::BlankDescription);
        }
        let skills = self.extract_skills(description);
        Ok(JobPosting::new(id, description.to_string(), skills))
    }

    /// Extracts a resume's text and skills. `name` and `email` given by the
    /// uploader win over the ones detected in the document; the filename is
    /// the last-resort name.
    pub async fn prepare_candidate(
        &self,
        file: UploadedFile,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<CandidateDraft, ExtractionError> {
        let filename = file.filename.clone();
        let document = extract_with_deadline(file, self.extraction_timeout).await?;
        let skills = self.extract_skills(&document.text);

        let name = name
            .or(document.contact.name)
            .or_else(|| Some(filename.clone()));
        let email = email.or(document.contact.email);

        Ok(CandidateDraft {
            name,
            email,
            filename,
            text: document.text,
            skills,
        })
    }

    /// Extracts a batch of uploads concurrently. Drafts keep upload order; a
    /// file that fails is reported in `failures` and does not affect the rest.
    pub async fn prepare_batch(
        self: &Arc<Self>,
        files: Vec<UploadedFile>,
        name: Option<String>,
        email: Option<String>,
    ) -> PreparedBatch {
        let mut tasks = JoinSet::new();
        for (index, file) in files.into_iter().enumerate() {
            let engine = Arc::clone(self);
            let (name, email) = (name.clone(), email.clone());
            tasks.spawn(async move {
                let filename = file.filename.clone();
                let outcome = engine.prepare_candidate(file, name, email).await;
                (index, filename, outcome)
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => error!("Upload worker failed: {e}"),
            }
        }
        outcomes.sort_by_key(|(index, _, _)| *index);

        let mut batch = PreparedBatch::default();
        for (_, filename, outcome) in outcomes {
            match outcome {
                Ok(draft) => batch.drafts.push(draft),
                Err(e) => {
                    warn!(filename = %filename, code = e.code(), "Resume extraction failed: {e}");
                    batch.failures.push(UploadFailure {
                        filename,
                        code: e.code(),
                        error: e.to_string(),
                    });
                }
            }
        }
        batch
    }

    /// Scores and ranks every candidate in the context against its job.
    pub async fn screen(&self, context: ScreeningContext) -> Result<ScreeningRun, ScreeningError> {
        let job = context.job.ok_or(ScreeningError::EmptyJob)?;
        let run_id = Uuid::new_v4();
        let span = info_span!("screening", %run_id, job_id = job.id);

        async move {
            let count = context.candidates.len();
            let results = rank_parallel(
                Arc::clone(&job),
                context.candidates,
                self.scorer(),
                self.weights,
            )
            .await?;

            info!(
                candidates = count,
                top_total = results.first().map(|r| r.scores.total),
                "Screening complete"
            );

            Ok::<_, ScreeningError>(ScreeningRun {
                run_id,
                job,
                results,
            })
        }
        .instrument(span)
        .await
    }
}
