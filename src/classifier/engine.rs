//! Compiled classifier: tag rules as regexes, escalation phrases as
//! Aho-Corasick automata.

use super::rules::{
    Priority, Tag, FALLBACK_TAG, HIGH_TAGS, HIGH_TERMS, MEDIUM_TAGS, TAG_RULES, URGENT_PHRASES,
};
use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Failure to compile the rule tables. Only reachable if the tables are edited
/// into something unbuildable.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid keyword pattern for tag {tag}: {source}")]
    Pattern {
        tag: Tag,
        #[source]
        source: regex::Error,
    },

    #[error("failed to build priority phrase matcher: {0}")]
    Phrases(#[from] aho_corasick::BuildError),
}

/// Tags and priority computed for one piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Deduplicated, never empty. Emitted in rule-table order.
    pub tags: Vec<Tag>,
    pub priority: Priority,
}

impl ClassificationResult {
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Wire labels of the tags, for logging.
    pub fn tag_labels(&self) -> Vec<&'static str> {
        self.tags.iter().map(|tag| tag.label()).collect()
    }
}

#[derive(Debug)]
struct TagRule {
    tag: Tag,
    pattern: Regex,
}

/// Keyword classifier. Immutable once built; share it behind an `Arc`.
#[derive(Debug)]
pub struct Classifier {
    rules: Vec<TagRule>,
    urgent: AhoCorasick,
    escalate: AhoCorasick,
}

impl Classifier {
    /// Compile the built-in rule tables.
    pub fn new() -> Result<Self, BuildError> {
        let rules = TAG_RULES
            .iter()
            .map(|(tag, keywords)| {
                let alternation = keywords
                    .iter()
                    .map(|keyword| regex::escape(keyword))
                    .collect::<Vec<_>>()
                    .join("|");
                Regex::new(&alternation)
                    .map(|pattern| TagRule { tag: *tag, pattern })
                    .map_err(|source| BuildError::Pattern { tag: *tag, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            urgent: AhoCorasick::new(URGENT_PHRASES)?,
            escalate: AhoCorasick::new(HIGH_TERMS)?,
        })
    }

    /// Classify text into tags and a priority. Never fails.
    ///
    /// 1. Lowercases the input.
    /// 2. Attaches every tag whose rule matches.
    /// 3. Picks the priority from the escalation ladder.
    /// 4. Falls back to `General Inquiry` when no tag matched.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let lower = text.to_lowercase();

        let mut tags: Vec<Tag> = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if rule.pattern.is_match(&lower) && !tags.contains(&rule.tag) {
                tags.push(rule.tag);
            }
        }

        let priority = self.priority_for(&lower, &tags);

        if tags.is_empty() {
            tags.push(FALLBACK_TAG);
        }

        ClassificationResult { tags, priority }
    }

    /// First matching rung wins: Urgent, High, Medium, Low.
    fn priority_for(&self, lower: &str, tags: &[Tag]) -> Priority {
        let tagged = |wanted: &[Tag]| wanted.iter().any(|tag| tags.contains(tag));

        if self.urgent.is_match(lower) {
            Priority::Urgent
        } else if tagged(HIGH_TAGS) || self.escalate.is_match(lower) {
            Priority::High
        } else if tagged(MEDIUM_TAGS) {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_classifier() -> Classifier {
        Classifier::new().unwrap()
    }

    #[test]
    fn unmatched_text_falls_back_to_general_inquiry() {
        let result = make_classifier().classify("hello there, nice weather today");
        assert_eq!(result.tags, vec![Tag::GeneralInquiry]);
        assert_eq!(result.priority, Priority::Low);
    }

    #[test]
    fn empty_string_still_classifies() {
        let result = make_classifier().classify("");
        assert_eq!(result.tags, vec![Tag::GeneralInquiry]);
        assert_eq!(result.priority, Priority::Low);
    }

    #[test]
    fn urgent_wins_over_other_matches() {
        let result = make_classifier().classify("urgent feature request");
        assert_eq!(result.priority, Priority::Urgent);
        assert!(result.has_tag(Tag::FeatureRequest));
    }

    #[test]
    fn broken_login_is_high_complaint() {
        let result = make_classifier().classify("my login is broken");
        assert!(result.has_tag(Tag::Complaint));
        assert!(result.has_tag(Tag::AccountBilling));
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn password_question_is_medium() {
        let result = make_classifier().classify("how to reset password");
        assert!(result.has_tag(Tag::Question));
        assert!(result.has_tag(Tag::AccountBilling));
        assert_eq!(result.priority, Priority::Medium);
    }

    #[test]
    fn complaint_tag_alone_escalates_to_high() {
        let result = make_classifier().classify("I found a problem with the app");
        assert_eq!(result.tags, vec![Tag::Complaint]);
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn feature_idea_is_medium() {
        let result = make_classifier().classify("I have an idea for the dashboard");
        assert_eq!(result.tags, vec![Tag::FeatureRequest]);
        assert_eq!(result.priority, Priority::Medium);
    }

    #[test]
    fn account_tag_alone_stays_low() {
        let result = make_classifier().classify("PASSWORD RESET");
        assert_eq!(result.tags, vec![Tag::AccountBilling]);
        assert_eq!(result.priority, Priority::Low);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let result = make_classifier().classify("What Is The Refund Process?");
        assert_eq!(result.tags, vec![Tag::Question]);
        assert_eq!(result.priority, Priority::Medium);
    }

    #[test]
    fn urgent_phrases_each_escalate() {
        let classifier = make_classifier();
        for text in [
            "URGENT: please call",
            "need immediate help",
            "we have a security issue",
            "I cannot login",
        ] {
            assert_eq!(classifier.classify(text).priority, Priority::Urgent, "{text}");
        }
    }

    #[test]
    fn cannot_login_is_urgent_account_topic() {
        let result = make_classifier().classify("cannot login since yesterday");
        assert_eq!(result.priority, Priority::Urgent);
        assert!(result.has_tag(Tag::AccountBilling));
    }

    #[test]
    fn keywords_match_inside_words() {
        let result = make_classifier().classify("the thing I requested last week");
        assert!(result.has_tag(Tag::FeatureRequest));
    }

    #[test]
    fn repeated_keywords_produce_one_tag() {
        let result = make_classifier().classify("error error broken failed");
        assert_eq!(result.tags, vec![Tag::Complaint]);
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn all_rules_can_fire_together_in_table_order() {
        let result = make_classifier()
            .classify("Question about my invoice, it is broken and I suggest a fix");
        assert_eq!(
            result.tags,
            vec![
                Tag::Complaint,
                Tag::Question,
                Tag::FeatureRequest,
                Tag::AccountBilling
            ]
        );
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = make_classifier();
        let text = "Where is the billing page? It shows an error";
        assert_eq!(classifier.classify(text), classifier.classify(text));
    }

    #[test]
    fn tag_labels_follow_tags() {
        let result = make_classifier().classify("how to add a feature");
        assert_eq!(result.tag_labels(), vec!["Question", "Feature Request"]);
    }

    #[test]
    fn result_serializes_with_wire_labels() {
        let result = make_classifier().classify("my login is broken");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"tags": ["Complaint", "Account/Billing"], "priority": "High"})
        );
    }
}
