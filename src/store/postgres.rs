use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;

use super::{DocumentStore, PendingFilter};
use crate::errors::AppError;
use crate::models::coordinator::Coordinator;
use crate::models::faculty::{Faculty, NewFaculty};
use crate::models::record::{NewRecord, Record, RecordKind, RecordPatch, ReviewStatus};

const RECORD_COLUMNS: &str = "kind, id, owner_id, department, review_status, rejection_reason, \
                              data, files, created_at, updated_at";

/// PostgreSQL backend: faculty, coordinators and records as JSONB documents.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Database migrations complete");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct FacultyRow {
    faculty_id: String,
    faculty_name: String,
    department: String,
    official_mail_id: String,
    password_hash: String,
    profile: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
}

impl From<FacultyRow> for Faculty {
    fn from(row: FacultyRow) -> Self {
        Faculty {
            faculty_id: row.faculty_id,
            faculty_name: row.faculty_name,
            department: row.department,
            official_mail_id: row.official_mail_id,
            password_hash: row.password_hash,
            profile: row.profile.0,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CoordinatorRow {
    coordinator_id: String,
    department: String,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    kind: String,
    id: String,
    owner_id: String,
    department: String,
    review_status: String,
    rejection_reason: Option<String>,
    data: Json<Map<String, Value>>,
    files: Json<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RecordRow> for Record {
    type Error = AppError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        Ok(Record {
            kind: row.kind.parse().map_err(AppError::Internal)?,
            status: row.review_status.parse().map_err(AppError::Internal)?,
            id: row.id,
            owner_id: row.owner_id,
            department: row.department,
            rejection_reason: row.rejection_reason,
            data: row.data.0,
            files: row.files.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_records(rows: Vec<RecordRow>) -> Result<Vec<Record>, AppError> {
    rows.into_iter().map(Record::try_from).collect()
}

#[async_trait]
impl DocumentStore for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn insert_faculty(&self, faculty: NewFaculty) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO faculty \
                 (faculty_id, faculty_name, department, official_mail_id, password_hash, profile) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (faculty_id) DO NOTHING",
        )
        .bind(&faculty.faculty_id)
        .bind(&faculty.faculty_name)
        .bind(&faculty.department)
        .bind(&faculty.official_mail_id)
        .bind(&faculty.password_hash)
        .bind(Json(&faculty.profile))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_faculty(&self, faculty_id: &str) -> Result<Option<Faculty>, AppError> {
        let row = sqlx::query_as::<_, FacultyRow>(
            "SELECT faculty_id, faculty_name, department, official_mail_id, password_hash, \
                    profile, created_at \
             FROM faculty WHERE faculty_id = $1",
        )
        .bind(faculty_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Faculty::from))
    }

    async fn find_coordinator(&self, coordinator_id: &str) -> Result<Option<Coordinator>, AppError> {
        let row = sqlx::query_as::<_, CoordinatorRow>(
            "SELECT coordinator_id, department, password_hash \
             FROM coordinators WHERE coordinator_id = $1",
        )
        .bind(coordinator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Coordinator {
            coordinator_id: r.coordinator_id,
            department: r.department,
            password_hash: r.password_hash,
        }))
    }

    async fn insert_coordinator(&self, coordinator: Coordinator) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO coordinators (coordinator_id, department, password_hash) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (coordinator_id) DO NOTHING",
        )
        .bind(&coordinator.coordinator_id)
        .bind(&coordinator.department)
        .bind(&coordinator.password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_record(&self, record: NewRecord) -> Result<Record, AppError> {
        let sql = format!(
            "INSERT INTO records (kind, id, owner_id, department, data, files) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {RECORD_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(record.kind.as_str())
            .bind(&record.id)
            .bind(&record.owner_id)
            .bind(&record.department)
            .bind(Json(&record.data))
            .bind(Json(&record.files))
            .fetch_one(&self.pool)
            .await?;

        Record::try_from(row)
    }

    async fn find_record(&self, kind: RecordKind, id: &str) -> Result<Option<Record>, AppError> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM records WHERE kind = $1 AND id = $2");
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Record::try_from).transpose()
    }

    async fn find_records_by_owner(&self, kind: RecordKind, owner_id: &str) -> Result<Vec<Record>, AppError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records \
             WHERE kind = $1 AND owner_id = $2 \
             ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(kind.as_str())
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    async fn find_pending_records(
        &self,
        kind: RecordKind,
        filter: PendingFilter<'_>,
    ) -> Result<Vec<Record>, AppError> {
        let stages: Option<Vec<String>> = filter
            .stages
            .map(|s| s.iter().map(|stage| stage.to_string()).collect());
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records \
             WHERE kind = $1 AND department = $2 AND review_status = 'applied' \
               AND ($3::text[] IS NULL OR data->>'status' = ANY($3)) \
             ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(kind.as_str())
            .bind(filter.department)
            .bind(stages)
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    async fn update_record(
        &self,
        kind: RecordKind,
        id: &str,
        patch: RecordPatch,
    ) -> Result<Option<Record>, AppError> {
        // Top-level key merge in one statement; concurrent patches of
        // different keys both survive.
        let sql = format!(
            "UPDATE records \
             SET data = data || $3, files = COALESCE($4, files), updated_at = NOW() \
             WHERE kind = $1 AND id = $2 \
             RETURNING {RECORD_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(kind.as_str())
            .bind(id)
            .bind(Json(&patch.data))
            .bind(patch.files.as_ref().map(Json))
            .fetch_optional(&self.pool)
            .await?;

        row.map(Record::try_from).transpose()
    }

    async fn set_review(
        &self,
        kind: RecordKind,
        id: &str,
        status: ReviewStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Record>, AppError> {
        let sources: Vec<String> = ReviewStatus::sources(status)
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        let sql = format!(
            "UPDATE records \
             SET review_status = $3, rejection_reason = COALESCE($4, rejection_reason), \
                 updated_at = NOW() \
             WHERE kind = $1 AND id = $2 AND review_status = ANY($5) \
             RETURNING {RECORD_COLUMNS}"
        );
        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(kind.as_str())
            .bind(id)
            .bind(status.as_str())
            .bind(rejection_reason)
            .bind(sources)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            return Record::try_from(row).map(Some);
        }

        // Nothing updated: either the record is gone or its status moved on
        match self.find_record(kind, id).await? {
            Some(current) => Err(AppError::InvalidTransition { from: current.status, to: status }),
            None => Ok(None),
        }
    }

    async fn count_records(&self, kind: RecordKind, owner_id: &str) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM records WHERE kind = $1 AND owner_id = $2",
        )
        .bind(kind.as_str())
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
