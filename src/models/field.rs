//! Annotatable field records extracted from a captured request/response pair.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FieldSource {
    Request,
    Response,
}

impl FieldSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "Request",
            Self::Response => "Response",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Header,
    Query,
    Body,
    Cookie,
}

impl FieldCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "Header",
            Self::Query => "Query",
            Self::Body => "Body",
            Self::Cookie => "Cookie",
        }
    }
}

/// Tri-state marker for a classification tag that may not have been evaluated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TagState {
    #[default]
    Pending,
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PolicyAction {
    #[default]
    Pending,
    Allow,
    Review,
    Block,
}

impl PolicyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Allow => "Allow",
            Self::Review => "Review",
            Self::Block => "Block",
        }
    }
}

/// Data-governance tags attached to every field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClassificationTags {
    pub has_schema: bool,
    pub prod_tag: TagState,
    pub gcp_tag: TagState,
    pub decc_tag: TagState,
    pub policy_action: PolicyAction,
    pub data_sovereignty: TagState,
}

/// Reference to an item in the external compliance portal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct FindingLink {
    #[validate(length(min = 1, max = 200))]
    pub reference: String,
    #[validate(url)]
    pub url: Option<String>,
}

/// Free-text reviewer comment with references to supporting images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct FieldComment {
    #[validate(length(max = 2000))]
    pub text: String,
    #[serde(default)]
    #[validate(length(max = 10))]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, Validate)]
pub struct FieldAnnotation {
    #[validate(nested)]
    pub finding: Option<FindingLink>,
    #[validate(nested)]
    pub comment: Option<FieldComment>,
}

impl FieldAnnotation {
    pub fn is_empty(&self) -> bool {
        self.finding.is_none() && self.comment.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldRecord {
    pub id: String,
    pub field_path: String,
    pub source: FieldSource,
    pub category: FieldCategory,
    pub value: String,
    pub tags: ClassificationTags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<FieldAnnotation>,
}

impl FieldRecord {
    pub fn new(
        field_path: impl Into<String>,
        source: FieldSource,
        category: FieldCategory,
        value: impl Into<String>,
    ) -> Self {
        let field_path = field_path.into();
        Self {
            id: record_id(&field_path, source, category),
            field_path,
            source,
            category,
            value: value.into(),
            tags: ClassificationTags::default(),
            annotation: None,
        }
    }
}

/// Row key for a field: path, source and category joined by `-`.
pub fn record_id(field_path: &str, source: FieldSource, category: FieldCategory) -> String {
    format!("{field_path}-{}-{}", source.as_str(), category.as_str())
}

/// Field records partitioned into the six fixed buckets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FieldInventory {
    pub request_headers: Vec<FieldRecord>,
    pub request_query: Vec<FieldRecord>,
    pub request_body: Vec<FieldRecord>,
    pub response_headers: Vec<FieldRecord>,
    pub response_cookies: Vec<FieldRecord>,
    pub response_body: Vec<FieldRecord>,
}

impl FieldInventory {
    /// All records in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldRecord> {
        self.request_headers
            .iter()
            .chain(&self.request_query)
            .chain(&self.request_body)
            .chain(&self.response_headers)
            .chain(&self.response_cookies)
            .chain(&self.response_body)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FieldRecord> {
        self.request_headers
            .iter_mut()
            .chain(&mut self.request_query)
            .chain(&mut self.request_body)
            .chain(&mut self.response_headers)
            .chain(&mut self.response_cookies)
            .chain(&mut self.response_body)
    }

    pub fn len(&self) -> usize {
        self.request_headers.len()
            + self.request_query.len()
            + self.request_body.len()
            + self.response_headers.len()
            + self.response_cookies.len()
            + self.response_body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut FieldRecord> {
        self.iter_mut().find(|r| r.id == id)
    }
}
