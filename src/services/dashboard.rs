//! Dashboard statistics aggregated from the risk catalog.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::catalog::GovernanceStatus;
use crate::services::catalog::Catalog;

/// Aggregated statistics for the overview page.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub entity_count: usize,
    pub risk_count: usize,
    pub governance_group_count: usize,
    pub average_compliance_rate: f32,
    pub risk_exposure: Vec<RiskExposure>,
    pub top_psms: Vec<PsmEntityCount>,
    pub groups_by_status: GroupStatusCounts,
}

/// Number of entities exposed to a single risk.
#[derive(Debug, Serialize, PartialEq)]
pub struct RiskExposure {
    pub risk_id: String,
    pub risk_name: String,
    pub entity_count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PsmEntityCount {
    pub psm: String,
    pub entity_count: usize,
}

#[derive(Debug, Serialize, Default, PartialEq)]
pub struct GroupStatusCounts {
    pub open: usize,
    pub in_progress: usize,
    pub remediated: usize,
}

const TOP_PSM_LIMIT: usize = 5;

/// Fetch all three collections concurrently and aggregate them.
pub async fn get_stats(catalog: &Catalog) -> Result<DashboardStats, AppError> {
    let (entities, risks, groups) = tokio::try_join!(
        catalog.fetch_entities(),
        catalog.fetch_risks(),
        catalog.fetch_governance_groups(),
    )?;

    let average_compliance_rate = if groups.is_empty() {
        0.0
    } else {
        let sum: f32 = groups.iter().map(|g| g.compliance_rate).sum();
        // Round to 1 decimal
        (sum / groups.len() as f32 * 10.0).round() / 10.0
    };

    let mut risk_exposure: Vec<RiskExposure> = risks
        .iter()
        .map(|risk| RiskExposure {
            risk_id: risk.id.clone(),
            risk_name: risk.name.clone(),
            entity_count: entities
                .iter()
                .filter(|e| e.risk_ids.contains(&risk.id))
                .count(),
        })
        .collect();
    risk_exposure.sort_by(|a, b| {
        b.entity_count
            .cmp(&a.entity_count)
            .then_with(|| a.risk_name.cmp(&b.risk_name))
    });

    let mut psm_counts: HashMap<&str, usize> = HashMap::new();
    for entity in &entities {
        *psm_counts.entry(entity.psm.as_str()).or_default() += 1;
    }
    let mut top_psms: Vec<PsmEntityCount> = psm_counts
        .into_iter()
        .map(|(psm, entity_count)| PsmEntityCount {
            psm: psm.to_string(),
            entity_count,
        })
        .collect();
    top_psms.sort_by(|a, b| {
        b.entity_count
            .cmp(&a.entity_count)
            .then_with(|| a.psm.cmp(&b.psm))
    });
    top_psms.truncate(TOP_PSM_LIMIT);

    let mut groups_by_status = GroupStatusCounts::default();
    for group in &groups {
        match group.status {
            GovernanceStatus::Open => groups_by_status.open += 1,
            GovernanceStatus::InProgress => groups_by_status.in_progress += 1,
            GovernanceStatus::Remediated => groups_by_status.remediated += 1,
        }
    }

    Ok(DashboardStats {
        entity_count: entities.len(),
        risk_count: risks.len(),
        governance_group_count: groups.len(),
        average_compliance_rate,
        risk_exposure,
        top_psms,
        groups_by_status,
    })
}
