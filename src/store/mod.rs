//! Document store abstraction shared by every service.
//!
//! Records are stored one document per submission, indexed by owner and by
//! department, so each mutation is a single-document atomic write.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::coordinator::Coordinator;
use crate::models::faculty::{Faculty, NewFaculty};
use crate::models::record::{NewRecord, Record, RecordKind, RecordPatch, ReviewStatus};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Review queue filter for one department.
#[derive(Debug, Clone, Copy)]
pub struct PendingFilter<'a> {
    pub department: &'a str,
    /// When set, the payload `status` stage must be one of these values.
    pub stages: Option<&'a [&'a str]>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Insert a faculty member unless the id is taken. Returns `false` on a
    /// duplicate id; the check and the insert are one atomic step.
    async fn insert_faculty(&self, faculty: NewFaculty) -> Result<bool, AppError>;

    async fn find_faculty(&self, faculty_id: &str) -> Result<Option<Faculty>, AppError>;

    async fn find_coordinator(&self, coordinator_id: &str) -> Result<Option<Coordinator>, AppError>;

    /// Insert a coordinator unless the id exists. Returns whether it was inserted.
    async fn insert_coordinator(&self, coordinator: Coordinator) -> Result<bool, AppError>;

    async fn insert_record(&self, record: NewRecord) -> Result<Record, AppError>;

    async fn find_record(&self, kind: RecordKind, id: &str) -> Result<Option<Record>, AppError>;

    /// All records of a kind for one owner, oldest first.
    async fn find_records_by_owner(&self, kind: RecordKind, owner_id: &str) -> Result<Vec<Record>, AppError>;

    /// Records still `Applied` in a department, oldest first.
    async fn find_pending_records(
        &self,
        kind: RecordKind,
        filter: PendingFilter<'_>,
    ) -> Result<Vec<Record>, AppError>;

    /// Merge a patch into one record. `None` when the record is absent.
    async fn update_record(
        &self,
        kind: RecordKind,
        id: &str,
        patch: RecordPatch,
    ) -> Result<Option<Record>, AppError>;

    /// Move a record to `status`, overwriting the reason when one is given.
    /// The transition check and the write are one atomic step: a record not
    /// in one of [`ReviewStatus::sources`] yields `InvalidTransition`.
    /// `None` when the record is absent.
    async fn set_review(
        &self,
        kind: RecordKind,
        id: &str,
        status: ReviewStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Record>, AppError>;

    async fn count_records(&self, kind: RecordKind, owner_id: &str) -> Result<i64, AppError>;
}
