//! Risk catalog service: entities, risks and governance groups held in
//! memory after loading a JSON document at startup.
//!
//! The `fetch_*` operations mirror a remote catalog boundary and can be
//! slowed down with a configurable simulated latency.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::catalog::{Entity, GovernanceGroup, GovernanceStatus, Risk, SeverityLevel};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::traffic::HttpMethod;
use crate::services::listing::{contains_ci, filter_page, matches_opt, RecordFilter};

/// On-disk catalog layout. Every collection is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub governance_groups: Vec<GovernanceGroup>,
}

/// Filters for listing entities.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EntityFilters {
    /// Matches path or PSM.
    pub search: Option<String>,
    pub psm: Option<String>,
    pub method: Option<HttpMethod>,
    pub risk_id: Option<String>,
}

impl RecordFilter<Entity> for EntityFilters {
    fn matches(&self, entity: &Entity) -> bool {
        let search = self.search.as_deref().unwrap_or("");
        (contains_ci(&entity.path, search) || contains_ci(&entity.psm, search))
            && matches_opt(&self.psm, &entity.psm)
            && matches_opt(&self.method, &entity.method)
            && self
                .risk_id
                .as_ref()
                .is_none_or(|risk| entity.risk_ids.contains(risk))
    }
}

/// Filters for listing risks.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RiskFilters {
    pub search: Option<String>,
    pub severity: Option<SeverityLevel>,
}

impl RecordFilter<Risk> for RiskFilters {
    fn matches(&self, risk: &Risk) -> bool {
        let search = self.search.as_deref().unwrap_or("");
        (contains_ci(&risk.name, search)
            || risk
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, search)))
            && matches_opt(&self.severity, &risk.severity)
    }
}

/// Filters for listing governance groups.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GovernanceFilters {
    /// Matches group name or owner.
    pub search: Option<String>,
    pub risk_id: Option<String>,
    pub status: Option<GovernanceStatus>,
}

impl RecordFilter<GovernanceGroup> for GovernanceFilters {
    fn matches(&self, group: &GovernanceGroup) -> bool {
        let search = self.search.as_deref().unwrap_or("");
        (contains_ci(&group.name, search)
            || group
                .owner
                .as_deref()
                .is_some_and(|o| contains_ci(o, search)))
            && matches_opt(&self.risk_id, &group.risk_id)
            && matches_opt(&self.status, &group.status)
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    entities: Vec<Entity>,
    risks: Vec<Risk>,
    governance_groups: Vec<GovernanceGroup>,
    latency: Duration,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from a document after checking referential integrity.
    pub fn from_document(doc: CatalogDocument) -> Result<Self, AppError> {
        validate(&doc)?;
        Ok(Self {
            entities: doc.entities,
            risks: doc.risks,
            governance_groups: doc.governance_groups,
            latency: Duration::ZERO,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let doc: CatalogDocument = serde_json::from_str(raw)
            .map_err(|e| AppError::Catalog(format!("Invalid catalog JSON: {e}")))?;
        Self::from_document(doc)
    }

    /// Read and validate a catalog file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        let catalog = Self::from_json(&raw)
            .with_context(|| format!("Failed to load catalog file {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            entities = catalog.entities.len(),
            risks = catalog.risks.len(),
            governance_groups = catalog.governance_groups.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Delay applied before every `fetch_*` call returns.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    pub async fn fetch_entities(&self) -> Result<Vec<Entity>, AppError> {
        self.simulate_latency().await;
        Ok(self.entities.clone())
    }

    pub async fn fetch_risks(&self) -> Result<Vec<Risk>, AppError> {
        self.simulate_latency().await;
        Ok(self.risks.clone())
    }

    pub async fn fetch_governance_groups(&self) -> Result<Vec<GovernanceGroup>, AppError> {
        self.simulate_latency().await;
        Ok(self.governance_groups.clone())
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn risks(&self) -> &[Risk] {
        &self.risks
    }

    pub fn governance_groups(&self) -> &[GovernanceGroup] {
        &self.governance_groups
    }

    pub async fn list_entities(
        &self,
        filters: &EntityFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<Entity>, AppError> {
        let entities = self.fetch_entities().await?;
        Ok(filter_page(&entities, filters, pagination))
    }

    pub async fn list_risks(
        &self,
        filters: &RiskFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<Risk>, AppError> {
        let risks = self.fetch_risks().await?;
        Ok(filter_page(&risks, filters, pagination))
    }

    pub async fn list_governance_groups(
        &self,
        filters: &GovernanceFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<GovernanceGroup>, AppError> {
        let groups = self.fetch_governance_groups().await?;
        Ok(filter_page(&groups, filters, pagination))
    }

    pub fn find_entity(&self, id: &str) -> Result<Entity, AppError> {
        self.entities
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Entity '{id}' not found")))
    }

    pub fn find_risk(&self, id: &str) -> Result<Risk, AppError> {
        self.risks
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Risk '{id}' not found")))
    }

    pub fn find_governance_group(&self, id: &str) -> Result<GovernanceGroup, AppError> {
        self.governance_groups
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Governance group '{id}' not found")))
    }

    /// Entities exposed to a risk, in catalog order.
    pub fn entities_for_risk(&self, risk_id: &str) -> Result<Vec<Entity>, AppError> {
        self.find_risk(risk_id)?;
        Ok(self
            .entities
            .iter()
            .filter(|e| e.risk_ids.iter().any(|r| r == risk_id))
            .cloned()
            .collect())
    }
}

/// Reject duplicate ids, dangling references and out-of-range compliance rates.
pub fn validate(doc: &CatalogDocument) -> Result<(), AppError> {
    let entity_ids = unique_ids("entity", doc.entities.iter().map(|e| e.id.as_str()))?;
    let risk_ids = unique_ids("risk", doc.risks.iter().map(|r| r.id.as_str()))?;
    unique_ids(
        "governance group",
        doc.governance_groups.iter().map(|g| g.id.as_str()),
    )?;

    for entity in &doc.entities {
        if let Some(missing) = entity.risk_ids.iter().find(|r| !risk_ids.contains(r.as_str())) {
            return Err(AppError::Catalog(format!(
                "Entity '{}' references unknown risk '{missing}'",
                entity.id
            )));
        }
    }

    for group in &doc.governance_groups {
        if !risk_ids.contains(group.risk_id.as_str()) {
            return Err(AppError::Catalog(format!(
                "Governance group '{}' references unknown risk '{}'",
                group.id, group.risk_id
            )));
        }
        if !(0.0..=100.0).contains(&group.compliance_rate) {
            return Err(AppError::Catalog(format!(
                "Governance group '{}' has compliance rate {} outside 0-100",
                group.id, group.compliance_rate
            )));
        }
        if let Some(missing) = group
            .entity_ids
            .iter()
            .find(|e| !entity_ids.contains(e.as_str()))
        {
            return Err(AppError::Catalog(format!(
                "Governance group '{}' references unknown entity '{missing}'",
                group.id
            )));
        }
    }

    Ok(())
}

fn unique_ids<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, AppError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::Catalog(format!("Duplicate {kind} id '{id}'")));
        }
    }
    Ok(seen)
}
