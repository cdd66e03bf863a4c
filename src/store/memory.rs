use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{DocumentStore, PendingFilter};
use crate::errors::AppError;
use crate::models::coordinator::Coordinator;
use crate::models::faculty::{Faculty, NewFaculty};
use crate::models::record::{NewRecord, Record, RecordKind, RecordPatch, ReviewStatus};

/// In-process store for local runs and tests. Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    faculty: RwLock<HashMap<String, Faculty>>,
    coordinators: RwLock<HashMap<String, Coordinator>>,
    records: RwLock<HashMap<(RecordKind, String), Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    records
}

fn stage_matches(record: &Record, stages: Option<&[&str]>) -> bool {
    match stages {
        None => true,
        Some(stages) => record
            .data
            .get("status")
            .and_then(|v| v.as_str())
            .is_some_and(|stage| stages.contains(&stage)),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn insert_faculty(&self, faculty: NewFaculty) -> Result<bool, AppError> {
        let mut map = self.faculty.write().await;
        if map.contains_key(&faculty.faculty_id) {
            return Ok(false);
        }
        map.insert(faculty.faculty_id.clone(), faculty.into_faculty(Utc::now()));
        Ok(true)
    }

    async fn find_faculty(&self, faculty_id: &str) -> Result<Option<Faculty>, AppError> {
        Ok(self.faculty.read().await.get(faculty_id).cloned())
    }

    async fn find_coordinator(&self, coordinator_id: &str) -> Result<Option<Coordinator>, AppError> {
        Ok(self.coordinators.read().await.get(coordinator_id).cloned())
    }

    async fn insert_coordinator(&self, coordinator: Coordinator) -> Result<bool, AppError> {
        let mut map = self.coordinators.write().await;
        if map.contains_key(&coordinator.coordinator_id) {
            return Ok(false);
        }
        map.insert(coordinator.coordinator_id.clone(), coordinator);
        Ok(true)
    }

    async fn insert_record(&self, record: NewRecord) -> Result<Record, AppError> {
        let mut map = self.records.write().await;
        let key = (record.kind, record.id.clone());
        if map.contains_key(&key) {
            return Err(AppError::Internal(format!("duplicate record id {}", record.id)));
        }
        let record = record.into_record(Utc::now());
        map.insert(key, record.clone());
        Ok(record)
    }

    async fn find_record(&self, kind: RecordKind, id: &str) -> Result<Option<Record>, AppError> {
        Ok(self.records.read().await.get(&(kind, id.to_string())).cloned())
    }

    async fn find_records_by_owner(&self, kind: RecordKind, owner_id: &str) -> Result<Vec<Record>, AppError> {
        let map = self.records.read().await;
        let found = map
            .values()
            .filter(|r| r.kind == kind && r.owner_id == owner_id)
            .cloned()
            .collect();
        Ok(oldest_first(found))
    }

    async fn find_pending_records(
        &self,
        kind: RecordKind,
        filter: PendingFilter<'_>,
    ) -> Result<Vec<Record>, AppError> {
        let map = self.records.read().await;
        let found = map
            .values()
            .filter(|r| {
                r.kind == kind
                    && r.department == filter.department
                    && r.status == ReviewStatus::Applied
                    && stage_matches(r, filter.stages)
            })
            .cloned()
            .collect();
        Ok(oldest_first(found))
    }

    async fn update_record(
        &self,
        kind: RecordKind,
        id: &str,
        patch: RecordPatch,
    ) -> Result<Option<Record>, AppError> {
        let mut map = self.records.write().await;
        Ok(map.get_mut(&(kind, id.to_string())).map(|record| {
            record.apply_patch(patch, Utc::now());
            record.clone()
        }))
    }

    async fn set_review(
        &self,
        kind: RecordKind,
        id: &str,
        status: ReviewStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Record>, AppError> {
        let mut map = self.records.write().await;
        let Some(record) = map.get_mut(&(kind, id.to_string())) else {
            return Ok(None);
        };
        record.status = record.status.transition(status)?;
        if let Some(reason) = rejection_reason {
            record.rejection_reason = Some(reason.to_string());
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn count_records(&self, kind: RecordKind, owner_id: &str) -> Result<i64, AppError> {
        let map = self.records.read().await;
        Ok(map
            .values()
            .filter(|r| r.kind == kind && r.owner_id == owner_id)
            .count() as i64)
    }
}
