use serde_json::{Map, Value};

use crate::errors::AppError;
use super::kind::RecordKind;
use super::types::{NewRecord, RecordPatch};

/// Raw create/update input: form or JSON fields plus the upload paths the
/// request has already written to disk.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub fields: Map<String, Value>,
    pub files: Vec<String>,
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

impl Submission {
    /// The submitting faculty id, if present and non-blank.
    pub fn owner_id(&self) -> Option<String> {
        match self.fields.get("faculty_id") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }

    /// Keep the kind's payload keys and decode JSON-encoded sub-fields.
    fn payload(&self, kind: RecordKind) -> Result<Map<String, Value>, AppError> {
        let mut payload = Map::new();
        for key in kind.fields() {
            let Some(value) = self.fields.get(*key) else { continue };
            let value = match value {
                Value::String(raw) if kind.json_fields().contains(key) => {
                    serde_json::from_str(raw).map_err(|_| {
                        AppError::Validation(format!("Invalid JSON format for {key}."))
                    })?
                }
                other => other.clone(),
            };
            payload.insert((*key).to_string(), value);
        }
        Ok(payload)
    }

    /// Validate a create request and assemble the record to insert.
    pub fn into_new_record(
        self,
        kind: RecordKind,
        id: String,
        department: String,
    ) -> Result<NewRecord, AppError> {
        let owner_id = self
            .owner_id()
            .ok_or_else(|| AppError::Validation("Faculty ID is required".to_string()))?;

        let mut errors: Vec<String> = kind
            .required_fields()
            .iter()
            .filter(|key| is_blank(self.fields.get(**key)))
            .map(|key| format!("{key} is required"))
            .collect();
        if let Some(slot) = kind.file_slot() {
            if slot.required && self.files.is_empty() {
                errors.push(format!("{} file is required", slot.field));
            }
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors.join("; ")));
        }

        let mut data = self.payload(kind)?;
        for (key, value) in kind.defaults() {
            if is_blank(data.get(key)) {
                data.insert(key.to_string(), value);
            }
        }

        Ok(NewRecord {
            id,
            kind,
            owner_id,
            department,
            data,
            files: self.files,
        })
    }

    /// Validate an update request. Only keys the caller sent are touched.
    pub fn into_patch(self, kind: RecordKind) -> Result<RecordPatch, AppError> {
        let data = self.payload(kind)?;
        let files = if self.files.is_empty() { None } else { Some(self.files) };
        let patch = RecordPatch { data, files };
        if patch.is_empty() {
            return Err(AppError::Validation(
                "Invalid data. Please provide fields to update.".to_string(),
            ));
        }
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(fields: Value, files: &[&str]) -> Submission {
        Submission {
            fields: fields.as_object().cloned().unwrap(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn owner_id_is_required() {
        let err = submission(json!({"titleOfPaper": "x"}), &[])
            .into_new_record(RecordKind::Publication, "id".into(), "CSE".into())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn patent_requires_a_file() {
        let err = submission(json!({"faculty_id": "F1"}), &[])
            .into_new_record(RecordKind::Patent, "id".into(), "CSE".into())
            .unwrap_err();
        assert_eq!(err.to_string(), "proofOfPatent file is required");
    }

    #[test]
    fn patent_inventors_are_decoded_and_defaults_applied() {
        let record = submission(
            json!({"faculty_id": "F1", "inventors": "[{\"name\":\"A\"}]", "status": "filed", "bogus": 1}),
            &["patents/p.pdf"],
        )
        .into_new_record(RecordKind::Patent, "id".into(), "CSE".into())
        .unwrap();
        assert_eq!(record.data["inventors"], json!([{"name": "A"}]));
        assert_eq!(record.data["numOfInventors"], json!(0));
        assert_eq!(record.data["dateOfGranted"], Value::Null);
        assert!(!record.data.contains_key("bogus"));
        assert!(!record.data.contains_key("faculty_id"));
    }

    #[test]
    fn malformed_inventors_are_rejected() {
        let err = submission(json!({"faculty_id": "F1", "inventors": "[not json"}), &["patents/p.pdf"])
            .into_new_record(RecordKind::Patent, "id".into(), "CSE".into())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON format for inventors.");
    }

    #[test]
    fn funded_project_lists_every_missing_field() {
        let err = submission(json!({"faculty_id": "F1", "title": "  "}), &[])
            .into_new_record(RecordKind::FundedProject, "id".into(), "CSE".into())
            .unwrap_err();
        let msg = err.to_string();
        for key in ["title", "agency", "startDate", "status"] {
            assert!(msg.contains(key), "{msg}");
        }
    }

    #[test]
    fn empty_patch_is_rejected() {
        let err = submission(json!({"faculty_id": "F1", "unknown": "x"}), &[])
            .into_patch(RecordKind::Publication)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn patch_carries_only_sent_keys() {
        let patch = submission(json!({"titleOfPaper": "New"}), &[])
            .into_patch(RecordKind::Publication)
            .unwrap();
        assert_eq!(patch.data.len(), 1);
        assert!(patch.files.is_none());
    }
}
