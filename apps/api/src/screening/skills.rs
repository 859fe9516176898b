//! Skill Extractor — finds canonical skills mentioned in a text.
//!
//! Algorithm:
//! 1. Split the text into clauses, then normalize and tokenize each one (see
//!    `tokenizer` for boundary rules).
//! 2. At every token position, look up the phrase windows `tokens[i..i+n]`
//!    for n = max_phrase_tokens down to 1. Windows stay inside their clause.
//! 3. Record a skill the first time any of its aliases hits.
//!
//! Output order is the order of first occurrence in the text, so identical
//! input always yields identical output.

use std::collections::HashSet;

use crate::extraction::normalize;
use crate::screening::lexicon::SkillLexicon;
use crate::screening::tokenizer::{clauses, tokenize};

pub fn extract_skills(lexicon: &SkillLexicon, text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for clause in clauses(text) {
        let normalized = normalize(clause);
        match_clause(lexicon, &tokenize(&normalized), &mut seen, &mut found);
    }

    found
}

fn match_clause(
    lexicon: &SkillLexicon,
    tokens: &[&str],
    seen: &mut HashSet<usize>,
    found: &mut Vec<String>,
) {
    let mut phrase = String::new();

    for start in 0..tokens.len() {
        let window = lexicon.max_phrase_tokens().min(tokens.len() - start);
        for len in (1..=window).rev() {
            phrase.clear();
            for (i, token) in tokens[start..start + len].iter().enumerate() {
                if i > 0 {
                    phrase.push(' ');
                }
                phrase.push_str(token);
            }

            if let Some(id) = lexicon.lookup_key(&phrase) {
                if seen.insert(id) {
                    found.push(lexicon.canonical_name(id).to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::lexicon::SkillEntry;

    fn lexicon(entries: &[(&str, &[&str])]) -> SkillLexicon {
        SkillLexicon::from_entries(entries.iter().map(|(canonical, aliases)| SkillEntry {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }))
        .unwrap()
    }

    fn python_aws() -> SkillLexicon {
        lexicon(&[
            ("Python", &["python", "py"]),
            ("AWS", &["aws", "amazon web services"]),
        ])
    }

    #[test]
    fn test_job_example_order() {
        let skills = extract_skills(
            &python_aws(),
            "Looking for a Python developer with AWS experience",
        );
        assert_eq!(skills, vec!["Python", "AWS"]);
    }

    #[test]
    fn test_first_occurrence_order() {
        let skills = extract_skills(&python_aws(), "aws lambda in py, more python and aws");
        assert_eq!(skills, vec!["AWS", "Python"]);
    }

    #[test]
    fn test_hyphen_adjacent_matches() {
        assert_eq!(extract_skills(&python_aws(), "AWS-certified architect"), vec!["AWS"]);
    }

    #[test]
    fn test_substring_does_not_match() {
        assert!(extract_skills(&python_aws(), "SAWS and pythonic jigsaws").is_empty());
    }

    #[test]
    fn test_multi_word_alias_across_whitespace() {
        let skills = extract_skills(&python_aws(), "Amazon\t  Web   Services (EC2)");
        assert_eq!(skills, vec!["AWS"]);
    }

    #[test]
    fn test_multi_word_alias_stops_at_clause_breaks() {
        let builtin = SkillLexicon::builtin().unwrap();
        assert!(extract_skills(&builtin, "Worked at Amazon. Web services team lead").is_empty());
        assert!(extract_skills(&python_aws(), "Amazon, Web Services").is_empty());
        assert!(extract_skills(&python_aws(), "Amazon\nWeb Services").is_empty());
        assert_eq!(
            extract_skills(&python_aws(), "Amazon Web Services; later Python."),
            vec!["AWS", "Python"]
        );
    }

    #[test]
    fn test_overlapping_aliases_count_once() {
        let skills = extract_skills(&python_aws(), "amazon web services aws py python");
        assert_eq!(skills, vec!["AWS", "Python"]);
    }

    #[test]
    fn test_symbol_skills_respect_boundaries() {
        let lex = lexicon(&[
            ("C", &["c"]),
            ("C++", &["c++"]),
            ("C#", &["c#"]),
            (".NET", &[".net"]),
            ("Node.js", &["node.js"]),
        ]);
        assert_eq!(
            extract_skills(&lex, "Modern C++ and C#, some .NET; Node.js."),
            vec!["C++", "C#", ".NET", "Node.js"]
        );
        assert_eq!(extract_skills(&lex, "plain C (c99)"), vec!["C"]);
        assert!(extract_skills(&lex, "asp.net only").is_empty());
    }

    #[test]
    fn test_empty_text_yields_no_skills() {
        assert!(extract_skills(&python_aws(), "").is_empty());
        assert!(extract_skills(&SkillLexicon::empty(), "python aws").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let lex = SkillLexicon::builtin().unwrap();
        let text = "Kubernetes, Docker, Python, Spring Boot, spring, CI/CD and Terraform";
        let first = extract_skills(&lex, text);
        for _ in 0..10 {
            assert_eq!(extract_skills(&lex, text), first);
        }
        assert_eq!(
            first,
            vec!["Kubernetes", "Docker", "Python", "Spring Boot", "Spring", "CI/CD", "Terraform"]
        );
    }
}
