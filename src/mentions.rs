/// How a transcript line that names a keyword is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKind {
    Mention,
    Question,
}

impl MentionKind {
    /// Label used in the mentions log.
    pub fn label(&self) -> &'static str {
        match self {
            MentionKind::Mention => "MENTION",
            MentionKind::Question => "QUESTION",
        }
    }
}

/// Result of classifying one transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionMatch {
    pub kind: MentionKind,
    pub keyword: String,
}

/// Phrases that mark a keyword line as a question even without a "?".
const QUESTION_PHRASES: &[&str] = &[
    "what do you think",
    "can you",
    "could you",
    "would you",
    "do you know",
    "what about",
];

/// Detects keyword mentions and questions in transcript text.
///
/// Pure and deterministic: same text and keywords always classify the
/// same way. Only the first matching keyword is reported.
#[derive(Debug, Clone)]
pub struct MentionDetector {
    keywords: Vec<String>,
}

impl MentionDetector {
    pub fn new(keywords: Vec<String>) -> Self {
        let keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        Self { keywords }
    }

    /// Case-insensitive substring match against the keyword list.
    ///
    /// A match is a `Question` when the text contains a literal `?`, any
    /// known question phrase, or a "hey <keyword>" address form.
    pub fn classify(&self, text: &str) -> Option<MentionMatch> {
        let lower = text.to_lowercase();

        for keyword in &self.keywords {
            if !lower.contains(keyword.as_str()) {
                continue;
            }

            let is_question = text.contains('?')
                || QUESTION_PHRASES.iter().any(|p| lower.contains(p))
                || lower.contains(&format!("hey {keyword}"));

            return Some(MentionMatch {
                kind: if is_question {
                    MentionKind::Question
                } else {
                    MentionKind::Mention
                },
                keyword: keyword.clone(),
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> MentionDetector {
        MentionDetector::new(vec!["claude".to_string(), "assistant".to_string()])
    }

    #[test]
    fn question_mark_classifies_as_question() {
        let found = detector()
            .classify("Hey Claude, can you summarize?")
            .expect("should match");
        assert_eq!(found.kind, MentionKind::Question);
        assert_eq!(found.keyword, "claude");
    }

    #[test]
    fn plain_keyword_classifies_as_mention() {
        let found = detector()
            .classify("claude is a nice name")
            .expect("should match");
        assert_eq!(found.kind, MentionKind::Mention);
        assert_eq!(found.keyword, "claude");
    }

    #[test]
    fn no_keyword_yields_none() {
        assert!(detector().classify("no keywords here").is_none());
    }

    #[test]
    fn question_phrase_without_question_mark() {
        let found = detector()
            .classify("Claude, what do you think about the plan")
            .expect("should match");
        assert_eq!(found.kind, MentionKind::Question);
    }

    #[test]
    fn hey_keyword_address_is_a_question() {
        let found = detector()
            .classify("hey assistant please take notes")
            .expect("should match");
        assert_eq!(found.kind, MentionKind::Question);
        assert_eq!(found.keyword, "assistant");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let found = detector()
            .classify("CLAUDE mentioned the roadmap")
            .expect("should match");
        assert_eq!(found.kind, MentionKind::Mention);
    }

    #[test]
    fn first_matching_keyword_wins() {
        let detector = MentionDetector::new(vec!["claude".to_string(), "ai".to_string()]);
        // "ai" is also a substring here, but "claude" is checked first
        let found = detector.classify("claude said hi").expect("should match");
        assert_eq!(found.keyword, "claude");
    }
}
