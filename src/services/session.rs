//! Analysis sessions: in-memory field inventories that reviewers annotate.
//!
//! Nothing here is persisted. Sessions live until deleted, until the process
//! exits, or until the store reaches capacity and evicts the oldest one.

use std::collections::{HashMap, VecDeque};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::field::{
    FieldAnnotation, FieldCategory, FieldInventory, FieldRecord, FieldSource, PolicyAction,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::traffic::{CapturedResponse, ParsedRequest};
use crate::services::listing::{contains_ci, filter_page, matches_opt, RecordFilter};

/// Filters for listing the fields of a session.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FieldFilters {
    /// Matches field path or value.
    pub search: Option<String>,
    pub source: Option<FieldSource>,
    pub category: Option<FieldCategory>,
    pub policy_action: Option<PolicyAction>,
    pub annotated: Option<bool>,
}

impl RecordFilter<FieldRecord> for FieldFilters {
    fn matches(&self, field: &FieldRecord) -> bool {
        let search = self.search.as_deref().unwrap_or("");
        (contains_ci(&field.field_path, search) || contains_ci(&field.value, search))
            && matches_opt(&self.source, &field.source)
            && matches_opt(&self.category, &field.category)
            && matches_opt(&self.policy_action, &field.tags.policy_action)
            && matches_opt(&self.annotated, &field.annotation.is_some())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub request: ParsedRequest,
    pub response: CapturedResponse,
    pub inventory: FieldInventory,
}

/// Compact listing entry for a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub field_count: usize,
    pub annotated_count: usize,
}

impl From<&AnalysisSession> for SessionSummary {
    fn from(session: &AnalysisSession) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            method: session.request.method.clone(),
            url: session.request.url.clone(),
            status: session.response.status,
            field_count: session.inventory.len(),
            annotated_count: session
                .inventory
                .iter()
                .filter(|f| f.annotation.is_some())
                .count(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<Uuid, AnalysisSession>,
    order: VecDeque<Uuid>,
}

/// Thread-safe bounded store of analysis sessions.
#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, AppError> {
        self.inner
            .read()
            .map_err(|_| AppError::Internal("session store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, AppError> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal("session store lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.sessions.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create(
        &self,
        request: ParsedRequest,
        response: CapturedResponse,
        inventory: FieldInventory,
    ) -> Result<AnalysisSession, AppError> {
        let session = AnalysisSession {
            id: Uuid::now_v7(),
            created_at: Utc::now(),
            request,
            response,
            inventory,
        };

        let mut inner = self.write()?;
        while inner.sessions.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            if inner.sessions.remove(&oldest).is_some() {
                tracing::warn!(session_id = %oldest, "Session store full, evicted oldest session");
            }
        }
        inner.order.push_back(session.id);
        inner.sessions.insert(session.id, session.clone());

        tracing::info!(
            session_id = %session.id,
            fields = session.inventory.len(),
            "Analysis session created"
        );
        Ok(session)
    }

    pub fn get(&self, id: Uuid) -> Result<AnalysisSession, AppError> {
        self.read()?
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| session_not_found(id))
    }

    pub fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut inner = self.write()?;
        if inner.sessions.remove(&id).is_none() {
            return Err(session_not_found(id));
        }
        inner.order.retain(|s| *s != id);
        Ok(())
    }

    /// Session summaries, newest first.
    pub fn list(&self) -> Result<Vec<SessionSummary>, AppError> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.sessions.get(id))
            .map(SessionSummary::from)
            .collect())
    }

    pub fn list_fields(
        &self,
        id: Uuid,
        filters: &FieldFilters,
        pagination: &Pagination,
    ) -> Result<PagedResult<FieldRecord>, AppError> {
        let inner = self.read()?;
        let session = inner.sessions.get(&id).ok_or_else(|| session_not_found(id))?;
        Ok(filter_page(session.inventory.iter(), filters, pagination))
    }

    /// Replace the annotation on one field; an empty annotation clears it.
    pub fn annotate(
        &self,
        id: Uuid,
        field_id: &str,
        annotation: FieldAnnotation,
    ) -> Result<FieldRecord, AppError> {
        annotation.validate()?;

        let mut inner = self.write()?;
        let session = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| session_not_found(id))?;
        let field = session
            .inventory
            .find_mut(field_id)
            .ok_or_else(|| AppError::NotFound(format!("Field '{field_id}' not found")))?;

        field.annotation = if annotation.is_empty() {
            None
        } else {
            Some(annotation)
        };
        Ok(field.clone())
    }

    /// Render every field of a session as CSV.
    pub fn export_csv(&self, id: Uuid) -> Result<String, AppError> {
        let session = self.get(id)?;
        let mut writer = csv::Writer::from_writer(Vec::new());
        let csv_err = |e: csv::Error| AppError::Internal(format!("CSV export failed: {e}"));

        writer
            .write_record([
                "id",
                "source",
                "category",
                "field_path",
                "value",
                "policy_action",
                "finding",
                "comment",
                "images",
            ])
            .map_err(csv_err)?;

        for field in session.inventory.iter() {
            let annotation = field.annotation.as_ref();
            let finding = annotation
                .and_then(|a| a.finding.as_ref())
                .map(|f| f.reference.as_str())
                .unwrap_or("");
            let comment = annotation.and_then(|a| a.comment.as_ref());
            let text = comment.map(|c| c.text.as_str()).unwrap_or("");
            let images = comment.map(|c| c.images.join(" ")).unwrap_or_default();

            writer
                .write_record([
                    field.id.as_str(),
                    field.source.as_str(),
                    field.category.as_str(),
                    field.field_path.as_str(),
                    field.value.as_str(),
                    field.tags.policy_action.as_str(),
                    finding,
                    text,
                    images.as_str(),
                ])
                .map_err(csv_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV export failed: {e}")))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV export failed: {e}")))
    }
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
