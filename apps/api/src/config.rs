use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::screening::ranking::ScoringWeights;
use crate::screening::similarity::SimilarityBackend;

/// How a lexicon file on disk combines with the built-in skill table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexiconMode {
    Extend,
    Replace,
}

/// Application configuration loaded from environment variables.
/// Every setting has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub weights: ScoringWeights,
    pub similarity_backend: SimilarityBackend,
    pub max_features: usize,
    pub screen_timeout: Duration,
    pub extraction_timeout: Duration,
    pub max_upload_bytes: usize,
    pub lexicon_path: Option<PathBuf>,
    pub lexicon_mode: LexiconMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            weights: ScoringWeights::default(),
            similarity_backend: SimilarityBackend::TfIdf,
            max_features: 5000,
            screen_timeout: Duration::from_secs(30),
            extraction_timeout: Duration::from_secs(10),
            max_upload_bytes: 10 * 1024 * 1024,
            lexicon_path: None,
            lexicon_mode: LexiconMode::Extend,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        let weights = ScoringWeights {
            similarity: parse_env("SIMILARITY_WEIGHT", defaults.weights.similarity)?,
            skill_overlap: parse_env("SKILL_OVERLAP_WEIGHT", defaults.weights.skill_overlap)?,
        };
        validate_weights(&weights)?;

        let similarity_backend = match std::env::var("SIMILARITY_BACKEND") {
            Ok(raw) => raw
                .parse::<SimilarityBackend>()
                .map_err(anyhow::Error::msg)
                .context("SIMILARITY_BACKEND must be 'tfidf' or 'jaccard'")?,
            Err(_) => defaults.similarity_backend,
        };

        let lexicon_mode = match std::env::var("SKILL_LEXICON_MODE")
            .unwrap_or_else(|_| "extend".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "extend" => LexiconMode::Extend,
            "replace" => LexiconMode::Replace,
            other => bail!("SKILL_LEXICON_MODE must be 'extend' or 'replace', got '{other}'"),
        };

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            weights,
            similarity_backend,
            max_features: parse_env("MAX_FEATURES", defaults.max_features)?,
            screen_timeout: Duration::from_secs(parse_env("SCREEN_TIMEOUT_SECS", 30u64)?),
            extraction_timeout: Duration::from_secs(parse_env("EXTRACTION_TIMEOUT_SECS", 10u64)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            lexicon_path: std::env::var("SKILL_LEXICON_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            lexicon_mode,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn validate_weights(weights: &ScoringWeights) -> Result<()> {
    for (name, value) in [
        ("SIMILARITY_WEIGHT", weights.similarity),
        ("SKILL_OVERLAP_WEIGHT", weights.skill_overlap),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("{name} must be a finite, non-negative number (got {value})");
        }
    }
    Ok(())
}
