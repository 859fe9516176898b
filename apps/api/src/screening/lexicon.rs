#![allow(dead_code)]

//! Skill Lexicon — canonical skill names and the surface forms that resolve to them.
//!
//! The table is data, not code: a JSON document (`{"skills": [{"canonical", "aliases"}]}`)
//! embedded at build time, optionally replaced or extended from disk at startup,
//! and extendable at runtime. Alias lookup is a single hash probe on the
//! normalized phrase.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::screening::tokenizer::phrase_key;

const BUILTIN_LEXICON: &str = include_str!("default_lexicon.json");

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Failed to read skill lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed skill lexicon: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid skill entry: {0}")]
    InvalidEntry(String),
}

/// One row of the lexicon table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub canonical: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LexiconDocument {
    skills: Vec<SkillEntry>,
}

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub skills_added: usize,
    pub aliases_added: usize,
    pub conflicts: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SkillLexicon {
    /// Display names, indexed by skill id.
    canonical: Vec<String>,
    /// Normalized canonical name → skill id.
    canonical_index: HashMap<String, usize>,
    /// Normalized alias phrase → skill id.
    aliases: HashMap<String, usize>,
    /// Longest alias, in tokens. Bounds the phrase window during extraction.
    max_phrase_tokens: usize,
}

impl SkillLexicon {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table shipped with the binary.
    pub fn builtin() -> Result<Self, LexiconError> {
        Self::from_json(BUILTIN_LEXICON)
    }

    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let doc: LexiconDocument = serde_json::from_str(json)?;
        Self::from_entries(doc.skills)
    }

    pub fn from_path(path: &Path) -> Result<Self, LexiconError> {
        let json = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = SkillEntry>,
    ) -> Result<Self, LexiconError> {
        let mut lexicon = Self::empty();
        lexicon.merge(entries)?;
        Ok(lexicon)
    }

    /// Reads a JSON table from disk and merges it into this lexicon.
    pub fn merge_path(&mut self, path: &Path) -> Result<MergeSummary, LexiconError> {
        let other = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: LexiconDocument = serde_json::from_str(&other)?;
        self.merge(doc.skills)
    }

    /// Merges entries into the table. Entries naming an existing canonical skill
    /// (case-insensitively) add aliases to it. An alias already owned by another
    /// skill stays with its first owner.
    ///
    /// Validation runs before any mutation, so a rejected batch leaves the table untouched.
    pub fn merge(
        &mut self,
        entries: impl IntoIterator<Item = SkillEntry>,
    ) -> Result<MergeSummary, LexiconError> {
        let entries: Vec<SkillEntry> = entries.into_iter().collect();
        for entry in &entries {
            if phrase_key(&entry.canonical).is_empty() {
                return Err(LexiconError::InvalidEntry(format!(
                    "canonical name '{}' has no word characters",
                    entry.canonical
                )));
            }
        }

        let mut summary = MergeSummary::default();
        for entry in entries {
            let canonical_key = phrase_key(&entry.canonical);
            let id = match self.canonical_index.get(&canonical_key) {
                Some(&id) => id,
                None => {
                    let id = self.canonical.len();
                    self.canonical.push(entry.canonical.trim().to_string());
                    self.canonical_index.insert(canonical_key.clone(), id);
                    summary.skills_added += 1;
                    id
                }
            };

            let surface_forms = if entry.aliases.is_empty() {
                vec![entry.canonical.clone()]
            } else {
                entry.aliases
            };

            for alias in surface_forms {
                let key = phrase_key(&alias);
                if key.is_empty() {
                    warn!(canonical = %entry.canonical, alias = %alias, "Skipping alias with no word characters");
                    continue;
                }
                match self.aliases.get(&key) {
                    Some(&owner) if owner == id => {}
                    Some(&owner) => {
                        summary.conflicts += 1;
                        warn!(
                            alias = %key,
                            owner = %self.canonical[owner],
                            rejected = %self.canonical[id],
                            "Alias already belongs to another skill"
                        );
                    }
                    None => {
                        let tokens = key.split(' ').count();
                        self.max_phrase_tokens = self.max_phrase_tokens.max(tokens);
                        self.aliases.insert(key, id);
                        summary.aliases_added += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Resolves any surface form (any case, any spacing) to its canonical name.
    pub fn lookup(&self, alias: &str) -> Option<&str> {
        self.lookup_key(&phrase_key(alias))
            .map(|id| self.canonical[id].as_str())
    }

    /// Resolves an already-normalized phrase key to a skill id.
    pub(crate) fn lookup_key(&self, key: &str) -> Option<usize> {
        self.aliases.get(key).copied()
    }

    pub(crate) fn canonical_name(&self, id: usize) -> &str {
        &self.canonical[id]
    }

    pub fn max_phrase_tokens(&self) -> usize {
        self.max_phrase_tokens
    }

    /// Number of canonical skills.
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}
