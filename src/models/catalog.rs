//! Risk catalog: API entities, compliance risks and governance groups.

use serde::{Deserialize, Serialize};

use crate::models::traffic::HttpMethod;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeverityLevel {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// One (API path, HTTP method) pair owned by a PSM service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: String,
    pub psm: String,
    pub path: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub risk_ids: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Risk {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub severity: SeverityLevel,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GovernanceStatus {
    Open,
    #[serde(rename = "In_Progress")]
    InProgress,
    Remediated,
}

/// Remediation tracking unit linking one risk to a set of entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernanceGroup {
    pub id: String,
    pub name: String,
    pub risk_id: String,
    #[serde(default)]
    pub entity_ids: Vec<String>,
    /// Percentage of entities in compliance, 0 to 100.
    pub compliance_rate: f32,
    pub status: GovernanceStatus,
    #[serde(default)]
    pub owner: Option<String>,
}
