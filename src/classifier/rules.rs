//! Tag vocabulary, priority levels and the keyword tables that drive them.

use serde::{Deserialize, Serialize};

// ── Tags ─────────────────────────────────────────────────────────

/// Category label attached to classified text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    /// Something is broken or the sender is unhappy.
    #[serde(rename = "Complaint")]
    Complaint,
    /// The sender is asking how or where to do something.
    #[serde(rename = "Question")]
    Question,
    /// The sender wants new or changed functionality.
    #[serde(rename = "Feature Request")]
    FeatureRequest,
    /// Login, password, account or payment topics.
    #[serde(rename = "Account/Billing")]
    AccountBilling,
    /// Fallback when no keyword rule matched.
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
}

impl Tag {
    /// All tags, rule-driven ones first, fallback last.
    pub const ALL: &'static [Tag] = &[
        Tag::Complaint,
        Tag::Question,
        Tag::FeatureRequest,
        Tag::AccountBilling,
        Tag::GeneralInquiry,
    ];

    /// Wire label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Tag::Complaint => "Complaint",
            Tag::Question => "Question",
            Tag::FeatureRequest => "Feature Request",
            Tag::AccountBilling => "Account/Billing",
            Tag::GeneralInquiry => "General Inquiry",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Priority ─────────────────────────────────────────────────────

/// Urgency level. Ordered so `Low < Medium < High < Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: &'static [Priority] = &[
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Keyword tables ───────────────────────────────────────────────

/// Tag rules. Every rule is evaluated; a match on any keyword attaches the tag.
/// Keywords are lowercase and match as substrings.
pub const TAG_RULES: &[(Tag, &[&str])] = &[
    (
        Tag::Complaint,
        &[
            "complaint",
            "problem",
            "broken",
            "error",
            "issue",
            "unhappy",
            "not working",
            "failed",
        ],
    ),
    (
        Tag::Question,
        &["question", "how to", "where is", "can i get", "what is"],
    ),
    (
        Tag::FeatureRequest,
        &["feature", "suggest", "request", "wish", "idea", "should add"],
    ),
    (
        Tag::AccountBilling,
        &["login", "password", "account", "billing", "charge", "invoice"],
    ),
];

/// Phrases that force `Urgent` regardless of tags.
pub const URGENT_PHRASES: &[&str] = &["urgent", "immediate", "security issue", "cannot login"];

/// Terms that escalate to `High` even without the `Complaint` tag.
pub const HIGH_TERMS: &[&str] = &["error", "broken"];

/// Tags that escalate to `High`.
pub const HIGH_TAGS: &[Tag] = &[Tag::Complaint];

/// Tags that escalate to `Medium`.
pub const MEDIUM_TAGS: &[Tag] = &[Tag::FeatureRequest, Tag::Question];

/// Tag applied when no rule matched.
pub const FALLBACK_TAG: Tag = Tag::GeneralInquiry;
