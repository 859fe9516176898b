//! Best-effort name / email detection on raw resume text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").expect("email regex is valid")
});

const NAME_MAX_CHARS: usize = 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub fn extract_contact(raw_text: &str) -> ContactInfo {
    ContactInfo {
        name: detect_name(raw_text),
        email: detect_email(raw_text),
    }
}

fn detect_email(raw_text: &str) -> Option<String> {
    EMAIL_RE
        .find(raw_text)
        .map(|m| m.as_str().to_lowercase())
}

/// A name heading is the first non-empty line when it is 2–4 capitalised words.
/// All-caps lines are section headings, not names.
fn detect_name(raw_text: &str) -> Option<String> {
    let line = raw_text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())?;

    if line.chars().count() > NAME_MAX_CHARS || !line.chars().any(char::is_lowercase) {
        return None;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return None;
    }

    let looks_like_name = words.iter().all(|w| {
        let mut chars = w.chars();
        let starts_upper = chars.next().is_some_and(|c| c.is_alphabetic() && c.is_uppercase());
        starts_upper && chars.all(|c| c.is_alphabetic() || matches!(c, '.' | '\'' | '-'))
    });

    looks_like_name.then(|| words.join(" "))
}
