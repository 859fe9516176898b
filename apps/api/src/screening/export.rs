//! CSV export of the candidate pool with the scores from the last screening.

use crate::models::candidate::ScoreSet;
use crate::screening::session::ScreeningSession;

pub const EXPORT_FILENAME: &str = "screening_results.csv";

const HEADER: [&str; 8] = [
    "id",
    "name",
    "email",
    "filename",
    "similarity",
    "skill_overlap",
    "total",
    "skills",
];

/// One row per candidate in id order. Score cells stay blank for candidates
/// not screened against the current job.
pub fn render_csv(session: &ScreeningSession) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for candidate in session.candidates() {
        let scores = session.scores_for(candidate.id);
        let score = |pick: fn(&ScoreSet) -> f64| {
            scores
                .as_ref()
                .map(|s| format!("{:.3}", pick(s)))
                .unwrap_or_default()
        };

        writer.write_record([
            candidate.id.to_string(),
            candidate.name.clone().unwrap_or_default(),
            candidate.email.clone().unwrap_or_default(),
            candidate.filename.clone(),
            score(|s| s.similarity),
            score(|s| s.skill_overlap),
            score(|s| s.total),
            candidate.skills.join("; "),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::models::candidate::CandidateDraft;
    use crate::screening::lexicon::SkillLexicon;
    use crate::screening::ranking::ScoringWeights;
    use crate::screening::similarity::JaccardScorer;
    use crate::screening::ScreeningEngine;

    fn draft(filename: &str, name: Option<&str>, text: &str, skills: &[&str]) -> CandidateDraft {
        CandidateDraft {
            name: name.map(str::to_string),
            email: None,
            filename: filename.to_string(),
            text: text.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn read_rows(bytes: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_export_rows_and_formatting() {
        let engine = ScreeningEngine::new(
            SkillLexicon::builtin().unwrap(),
            Arc::new(JaccardScorer),
            ScoringWeights::default(),
            Duration::from_secs(5),
        );
        let mut session = ScreeningSession::new();
        session.set_job(&engine, "python aws").unwrap();
        session.admit(vec![
            draft("a.txt", Some("Doe, Jane"), "python aws", &["Python", "AWS"]),
            draft("b.txt", None, "pastry", &[]),
        ]);
        let run = engine.screen(session.snapshot()).await.unwrap();
        session.record_run(&run);
        session.admit(vec![draft("late.txt", None, "python", &["Python"])]);

        let rows = read_rows(&render_csv(&session).unwrap());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], HEADER.map(str::to_string).to_vec());
        assert_eq!(
            rows[1],
            vec!["1", "Doe, Jane", "", "a.txt", "1.000", "1.000", "1.000", "Python; AWS"]
        );
        assert_eq!(rows[2], vec!["2", "", "", "b.txt", "0.000", "0.000", "0.000", ""]);
        assert_eq!(rows[3], vec!["3", "", "", "late.txt", "", "", "", "Python"]);
    }

    #[test]
    fn test_export_empty_pool_is_header_only() {
        let session = ScreeningSession::new();
        let bytes = render_csv(&session).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap().trim_end(), HEADER.join(","));
    }
}
