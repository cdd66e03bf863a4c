use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::kind::RecordKind;
use super::status::ReviewStatus;

/// A stored record: one document per submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub kind: RecordKind,
    pub owner_id: String,
    pub department: String,
    pub status: ReviewStatus,
    pub rejection_reason: Option<String>,
    pub data: Map<String, Value>,
    /// Paths relative to the upload root, e.g. `patents/<uuid>.pdf`.
    pub files: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new record, before the store stamps timestamps.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub id: String,
    pub kind: RecordKind,
    pub owner_id: String,
    pub department: String,
    pub data: Map<String, Value>,
    pub files: Vec<String>,
}

/// Partial update from the owner. Keys in `data` overwrite the stored keys;
/// `files`, when present, replaces the stored file list.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub data: Map<String, Value>,
    pub files: Option<Vec<String>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.files.is_none()
    }
}

impl NewRecord {
    pub fn into_record(self, now: DateTime<Utc>) -> Record {
        Record {
            id: self.id,
            kind: self.kind,
            owner_id: self.owner_id,
            department: self.department,
            status: ReviewStatus::Applied,
            rejection_reason: None,
            data: self.data,
            files: self.files,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public URL of a stored upload. Windows separators are normalized.
pub fn file_url(url_prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        url_prefix.trim_end_matches('/'),
        path.replace('\\', "/").trim_start_matches('/')
    )
}

impl Record {
    /// Merge a patch in place. Mirrors the store-side `data || patch` merge.
    pub fn apply_patch(&mut self, patch: RecordPatch, now: DateTime<Utc>) {
        for (key, value) in patch.data {
            self.data.insert(key, value);
        }
        if let Some(files) = patch.files {
            self.files = files;
        }
        self.updated_at = now;
    }

    /// Flat JSON view returned to clients: payload keys plus identity,
    /// review state and file URLs.
    pub fn to_json(&self, url_prefix: &str) -> Value {
        let mut out = self.data.clone();
        out.insert("id".into(), Value::from(self.id.clone()));
        out.insert(self.kind.id_field().into(), Value::from(self.id.clone()));
        out.insert("faculty_id".into(), Value::from(self.owner_id.clone()));
        out.insert("department".into(), Value::from(self.department.clone()));
        out.insert("reviewStatus".into(), Value::from(self.status.as_str()));
        out.insert(
            "reviewStatusLabel".into(),
            Value::from(self.kind.status_label(self.status)),
        );
        out.insert(
            "rejectionReason".into(),
            self.rejection_reason.clone().map(Value::from).unwrap_or(Value::Null),
        );

        if let Some(slot) = self.kind.file_slot() {
            let urls: Vec<Value> = self
                .files
                .iter()
                .map(|p| Value::from(file_url(url_prefix, p)))
                .collect();
            let files = if slot.max_files == 1 {
                urls.into_iter().next().unwrap_or(Value::Null)
            } else {
                Value::Array(urls)
            };
            out.insert(slot.field.into(), files);
        }

        out.insert("createdAt".into(), Value::from(self.created_at.to_rfc3339()));
        out.insert("updatedAt".into(), Value::from(self.updated_at.to_rfc3339()));
        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(kind: RecordKind, files: Vec<&str>) -> Record {
        let data = json!({"a": 1, "b": 2}).as_object().cloned().unwrap();
        NewRecord {
            id: "r1".into(),
            kind,
            owner_id: "F1".into(),
            department: "CSE".into(),
            data,
            files: files.into_iter().map(String::from).collect(),
        }
        .into_record(Utc::now())
    }

    #[test]
    fn patch_preserves_unspecified_keys() {
        let mut record = sample(RecordKind::Publication, vec![]);
        let patch = RecordPatch {
            data: json!({"a": 9}).as_object().cloned().unwrap(),
            files: None,
        };
        record.apply_patch(patch, Utc::now());
        assert_eq!(record.data.get("a"), Some(&json!(9)));
        assert_eq!(record.data.get("b"), Some(&json!(2)));
    }

    #[test]
    fn patch_files_replace_the_list() {
        let mut record = sample(RecordKind::SeedMoney, vec!["seedMoney/a.pdf", "seedMoney/b.pdf"]);
        record.apply_patch(
            RecordPatch { data: Map::new(), files: Some(vec!["seedMoney/c.pdf".into()]) },
            Utc::now(),
        );
        assert_eq!(record.files, vec!["seedMoney/c.pdf".to_string()]);
    }

    #[test]
    fn json_view_shapes_single_and_multi_file_kinds() {
        let patent = sample(RecordKind::Patent, vec!["patents\\x.pdf"]).to_json("/uploads");
        assert_eq!(patent["proofOfPatent"], json!("/uploads/patents/x.pdf"));
        assert_eq!(patent["patentId"], json!("r1"));
        assert_eq!(patent["reviewStatus"], json!("applied"));
        assert_eq!(patent["reviewStatusLabel"], json!("Applied"));

        let publication = sample(RecordKind::Publication, vec![]).to_json("/uploads");
        assert_eq!(publication["proofOfPublication"], Value::Null);

        let seed = sample(RecordKind::SeedMoney, vec!["seedMoney/a.pdf", "seedMoney/b.pdf"]).to_json("/uploads/");
        assert_eq!(seed["proof"], json!(["/uploads/seedMoney/a.pdf", "/uploads/seedMoney/b.pdf"]));

        let project = sample(RecordKind::FundedProject, vec![]).to_json("/uploads");
        assert!(project.get("proof").is_none());
        assert_eq!(project["department"], json!("CSE"));
    }

    #[test]
    fn json_view_shows_the_scoping_department() {
        let mut record = sample(RecordKind::SeedMoney, vec![]);
        record.data.insert("department".into(), json!("ECE"));
        assert_eq!(record.to_json("/uploads")["department"], json!("CSE"));
    }
}
