use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Signup fields kept in the faculty profile document. Identity, contact
/// and credential fields live in their own columns.
pub const PROFILE_FIELDS: &[&str] = &[
    "institute_name",
    "designation",
    "research_domain",
    "major_specialization",
    "research_skills",
    "qualification",
    "phd_status",
    "phd_registration_date",
    "phd_university",
    "phd_completed_year",
    "guide_name",
    "guide_phone_number",
    "guide_mail_id",
    "guide_department",
    "date_of_joining_svecw",
    "experience_in_svecw",
    "previous_teaching_experience",
    "total_experience",
    "industry_experience",
    "ratified",
    "phone_number",
    "course_network_id",
    "faculty_profile_weblink",
    "scopus_id",
    "orcid",
    "google_scholar_id",
    "vidwan_portal",
];

/// Profile fields stored as null rather than an empty string when omitted.
const NULLABLE_PROFILE_FIELDS: &[&str] = &[
    "phd_registration_date",
    "phd_university",
    "phd_completed_year",
];

#[derive(Debug, Clone)]
pub struct Faculty {
    pub faculty_id: String,
    pub faculty_name: String,
    pub department: String,
    pub official_mail_id: String,
    pub password_hash: String,
    pub profile: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFaculty {
    pub faculty_id: String,
    pub faculty_name: String,
    pub department: String,
    pub official_mail_id: String,
    pub password_hash: String,
    pub profile: Map<String, Value>,
}

impl NewFaculty {
    pub fn into_faculty(self, now: DateTime<Utc>) -> Faculty {
        Faculty {
            faculty_id: self.faculty_id,
            faculty_name: self.faculty_name,
            department: self.department,
            official_mail_id: self.official_mail_id,
            password_hash: self.password_hash,
            profile: self.profile,
            created_at: now,
        }
    }
}

/// Body of `POST /signup`. Everything beyond the core fields is collected
/// into `extra` and filtered through [`profile_from`].
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub faculty_id: String,
    #[serde(default)]
    pub faculty_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub official_mail_id: String,
    #[serde(default, alias = "password1")]
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub faculty_id: String,
    #[serde(default, alias = "password1")]
    pub password: String,
}

/// Keep the known profile keys; blank nullable ones become null.
pub fn profile_from(extra: &Map<String, Value>) -> Map<String, Value> {
    let mut profile = Map::new();
    for key in PROFILE_FIELDS {
        let value = extra.get(*key).cloned().unwrap_or(Value::Null);
        let blank = matches!(&value, Value::String(s) if s.trim().is_empty());
        let value = if blank && NULLABLE_PROFILE_FIELDS.contains(key) {
            Value::Null
        } else {
            value
        };
        profile.insert((*key).to_string(), value);
    }
    profile
}
