use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extraction::normalize;

/// The active job description. Replaced wholesale when a new one is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: u64,
    pub description: String,
    /// Normalized description, the form the similarity scorer sees.
    #[serde(skip)]
    pub text: String,
    /// Canonical skills in first-occurrence order.
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn new(id: u64, description: String, skills: Vec<String>) -> Self {
        let text = normalize(&description);
        Self {
            id,
            description,
            text,
            skills,
            created_at: Utc::now(),
        }
    }
}
