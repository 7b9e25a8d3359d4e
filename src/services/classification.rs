//! Classification seam for data-governance tags on extracted fields.
//!
//! Tags come from a `Classifier`; the default leaves every tag pending until
//! a reviewer or an external policy service fills it in.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::field::{
    ClassificationTags, FieldCategory, FieldRecord, PolicyAction, TagState,
};

/// Assigns classification tags to a freshly extracted field.
pub trait Classifier: Send + Sync {
    fn classify(&self, field: &FieldRecord, from_json_object: bool) -> ClassificationTags;

    /// Short identifier reported by the readiness probe.
    fn name(&self) -> &str;
}

/// Leaves every tag pending.
#[derive(Debug, Default)]
pub struct PendingClassifier;

impl Classifier for PendingClassifier {
    fn classify(&self, _field: &FieldRecord, _from_json_object: bool) -> ClassificationTags {
        ClassificationTags::default()
    }

    fn name(&self) -> &str {
        "pending"
    }
}

/// Flags fields whose path mentions a sensitive keyword for review.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub const DEFAULT_KEYWORDS: &'static [&'static str] = &[
        "authorization",
        "cookie",
        "token",
        "password",
        "secret",
        "email",
        "ssn",
        "phone",
    ];

    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn is_sensitive(&self, field: &FieldRecord) -> bool {
        if field.category == FieldCategory::Cookie {
            return true;
        }
        let path = field.field_path.to_lowercase();
        self.keywords.iter().any(|k| path.contains(k.as_str()))
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        )
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, field: &FieldRecord, from_json_object: bool) -> ClassificationTags {
        let policy_action = if self.is_sensitive(field) {
            PolicyAction::Review
        } else {
            PolicyAction::Allow
        };

        ClassificationTags {
            has_schema: from_json_object,
            prod_tag: TagState::Pending,
            gcp_tag: TagState::Pending,
            decc_tag: TagState::Pending,
            policy_action,
            data_sovereignty: TagState::Pending,
        }
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Pick the classifier selected by configuration.
pub fn from_config(config: &AppConfig) -> Arc<dyn Classifier> {
    match &config.sensitive_keywords {
        Some(keywords) if keywords.is_empty() => Arc::new(KeywordClassifier::default()),
        Some(keywords) => Arc::new(KeywordClassifier::new(keywords.clone())),
        None => Arc::new(PendingClassifier),
    }
}
