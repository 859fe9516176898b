use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded resume after text extraction. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: u64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub filename: String,
    #[serde(skip)]
    pub text: String,
    pub skills: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl Candidate {
    pub fn new(
        id: u64,
        name: Option<String>,
        email: Option<String>,
        filename: String,
        text: String,
        skills: Vec<String>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            filename,
            text,
            skills,
            uploaded_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub similarity: f64,    // 0.0 – 1.0
    pub skill_overlap: f64, // 0.0 – 1.0
    pub total: f64,         // weighted sum, not clamped
}

/// One row of a screening: candidate summary plus its scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub id: u64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub filename: String,
    pub scores: ScoreSet,
    pub skills: Vec<String>,
}

impl ScreeningResult {
    pub fn new(candidate: &Candidate, scores: ScoreSet) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            filename: candidate.filename.clone(),
            scores,
            skills: candidate.skills.clone(),
        }
    }
}

/// A resume that has been extracted but not yet admitted to a session.
/// Admission assigns the id.
#[derive(Debug, Clone)]
pub struct CandidateDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub filename: String,
    pub text: String,
    pub skills: Vec<String>,
}

impl CandidateDraft {
    pub fn into_candidate(self, id: u64) -> Candidate {
        Candidate::new(id, self.name, self.email, self.filename, self.text, self.skills)
    }
}
