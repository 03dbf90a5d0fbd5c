//! Slot extraction heuristics — regex matching over raw chat messages.
//!
//! Runs on every turn before the prompt decision to pull name, academic
//! year, and query text out of whatever the student typed, regardless of
//! which slot was actually asked for.

use regex::Regex;

/// Messages treated as greetings/noise rather than answers.
static GREETINGS: &[&str] = &[
    "hi",
    "hello",
    "hey",
    "hii",
    "hiii",
    "good morning",
    "good afternoon",
    "good evening",
];

/// Name captures that are regex artifacts, not names.
static NAME_STOPWORDS: &[&str] = &["in", "a", "an", "the", "not"];

/// Keywords that mark a short message as a plausible query.
static QUERY_HINT_KEYWORDS: &[&str] = &[
    "scholarship",
    "admission",
    "exam",
    "exams",
    "attendance",
    "grading",
    "hostel",
    "grievance",
    "grievances",
    "wellbeing",
    "internship",
    "placement",
    "skills",
    "fees",
    "subject",
    "fee",
];

/// Slot extractor with pre-compiled patterns.
pub struct MessageExtractor {
    punctuation: Regex,
    name_patterns: Vec<Regex>,
    year_tokens: Regex,
    query_prefix: Regex,
}

impl MessageExtractor {
    pub fn new() -> Self {
        Self {
            punctuation: Regex::new(r"[^a-z0-9\s]").unwrap(),
            name_patterns: vec![
                Regex::new(r"(?i)my name is ([A-Za-z ]{2,50})").unwrap(),
                Regex::new(r"(?i)^i am ([A-Za-z ]{2,50})").unwrap(),
                Regex::new(r"(?i)i'm ([A-Za-z ]{2,50})").unwrap(),
            ],
            // Longest alternatives first so "12th_pass" wins over "12"
            year_tokens: Regex::new(
                r"\b(12th_pass|12th|12|1st_year|1st|first|1|2nd_year|2nd|second|2|3rd|third|3|4th|fourth|4)\b",
            )
            .unwrap(),
            query_prefix: Regex::new(r"(?i)^\s*(my\s+query\s+is|query\s+is|question\s+is)\s*[:\-\s]*")
                .unwrap(),
        }
    }

    /// Whether the message is a greeting or single-token noise ("ok").
    pub fn is_greeting(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        let cleaned = self.punctuation.replace_all(&lowered, "");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return false;
        }
        if GREETINGS.contains(&cleaned) {
            return true;
        }
        cleaned.split_whitespace().count() == 1 && cleaned.len() <= 3
    }

    /// Remove a leading "my query is" / "query is" / "question is" prefix.
    pub fn strip_query_prefix<'a>(&self, text: &'a str) -> &'a str {
        match self.query_prefix.find(text) {
            Some(m) if m.start() == 0 => text[m.end()..].trim(),
            _ => text.trim(),
        }
    }

    /// Pull a name out of "my name is X" / "I am X" / "I'm X" phrasing.
    pub fn extract_name(&self, text: &str) -> Option<String> {
        for pattern in &self.name_patterns {
            if let Some(caps) = pattern.captures(text) {
                let name = caps.get(1)?.as_str().trim();
                if name.len() >= 2 && !NAME_STOPWORDS.contains(&name.to_lowercase().as_str()) {
                    return Some(name.to_string());
                }
            }
        }
        None
    }

    /// Normalize a mentioned academic year to its canonical form.
    pub fn extract_year(&self, text: &str) -> Option<&'static str> {
        let lowered = text.to_lowercase();
        let token = self.year_tokens.find(&lowered)?.as_str();
        canonical_year(token)
    }
}

impl Default for MessageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a matched year token to its canonical label.
fn canonical_year(token: &str) -> Option<&'static str> {
    match token {
        "12" | "12th" | "12th_pass" => Some("12th_pass"),
        "1" | "1st" | "first" | "1st_year" => Some("1st_year"),
        "2" | "2nd" | "second" | "2nd_year" => Some("2nd_year"),
        "3" | "3rd" | "third" => Some("3rd_year"),
        "4" | "4th" | "fourth" => Some("4th_year"),
        _ => None,
    }
}

/// Whether a message plausibly carries the student's actual query:
/// reasonably long, a question, or mentioning a known topic.
pub fn looks_like_query(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() > 10 || trimmed.contains('?') {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    QUERY_HINT_KEYWORDS.iter().any(|k| lowered.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greetings_detected() {
        let ex = MessageExtractor::new();
        assert!(ex.is_greeting("hi"));
        assert!(ex.is_greeting("Hello!"));
        assert!(ex.is_greeting("good morning"));
        // Single short token counts as noise
        assert!(ex.is_greeting("ok"));
        assert!(!ex.is_greeting("hello, my name is Alice"));
        assert!(!ex.is_greeting("when are the exams"));
        assert!(!ex.is_greeting(""));
    }

    #[test]
    fn name_extraction_variants() {
        let ex = MessageExtractor::new();
        assert_eq!(ex.extract_name("my name is Alice Smith").as_deref(), Some("Alice Smith"));
        assert_eq!(ex.extract_name("My Name Is Bob").as_deref(), Some("Bob"));
        assert_eq!(ex.extract_name("I am Charlie").as_deref(), Some("Charlie"));
        assert_eq!(ex.extract_name("i'm Dana Lee").as_deref(), Some("Dana Lee"));
        assert_eq!(ex.extract_name("when are the exams"), None);
    }

    #[test]
    fn name_stopwords_rejected() {
        let ex = MessageExtractor::new();
        // "I am in 2nd year" must not yield the name "in"
        assert_eq!(ex.extract_name("I am in 2nd year"), None);
    }

    #[test]
    fn year_normalization() {
        let ex = MessageExtractor::new();
        let cases = [
            ("I'm in 2nd year", "2nd_year"),
            ("second year", "2nd_year"),
            ("2", "2nd_year"),
            ("12th pass", "12th_pass"),
            ("12th_pass", "12th_pass"),
            ("1st", "1st_year"),
            ("first year", "1st_year"),
            ("3rd", "3rd_year"),
            ("third", "3rd_year"),
            ("fourth year", "4th_year"),
            ("4th", "4th_year"),
        ];
        for (input, expected) in cases {
            assert_eq!(ex.extract_year(input), Some(expected), "input: {input}");
        }
        assert_eq!(ex.extract_year("no year here"), None);
    }

    #[test]
    fn query_prefix_stripped() {
        let ex = MessageExtractor::new();
        assert_eq!(
            ex.strip_query_prefix("My query is about hostel fees"),
            "about hostel fees"
        );
        assert_eq!(ex.strip_query_prefix("Query is: exam dates"), "exam dates");
        assert_eq!(ex.strip_query_prefix("Question is - attendance"), "attendance");
        assert_eq!(ex.strip_query_prefix("plain text"), "plain text");
    }

    #[test]
    fn query_plausibility() {
        assert!(looks_like_query("when is the last date for admission"));
        assert!(looks_like_query("exams?"));
        assert!(looks_like_query("fee help"));
        assert!(!looks_like_query("Bob"));
        assert!(!looks_like_query("ok"));
    }
}
