use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::status::ReviewStatus;

/// The four record types faculty can submit for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Patent,
    Publication,
    SeedMoney,
    FundedProject,
}

/// Upload slot accepted by a record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSlot {
    pub field: &'static str,
    pub max_files: usize,
    pub required: bool,
}

/// HTTP paths for one record kind.
#[derive(Debug, Clone, Copy)]
pub struct KindRoutes {
    pub create: &'static str,
    pub list: &'static str,
    pub update: &'static str,
    pub review: &'static str,
    pub approve: &'static str,
    pub reject: &'static str,
}

const PATENT_FIELDS: &[&str] = &[
    "category",
    "iprType",
    "applicationNumber",
    "applicantName",
    "filingDate",
    "inventionTitle",
    "numOfInventors",
    "inventors",
    "status",
    "dateOfPublished",
    "dateOfGranted",
];

const PUBLICATION_FIELDS: &[&str] = &[
    "natureOfPublication",
    "typeOfPublication",
    "titleOfPaper",
    "nameOfJournalConference",
    "titleofChapter",
    "nameofbook",
    "nameOfPublisher",
    "issnIsbn",
    "authorStatus",
    "firstAuthorName",
    "firstAuthorAffiliation",
    "coAuthors",
    "indexed",
    "quartile",
    "impactFactor",
    "doi",
    "linkOfPaper",
    "scopusLink",
    "volume",
    "pageNo",
    "monthYear",
    "citeAs",
];

const SEED_MONEY_FIELDS: &[&str] = &[
    "financialYear",
    "facultyName",
    "numStudents",
    "projectTitle",
    "amountSanctioned",
    "amountReceived",
    "objectives",
    "outcomes",
];

const FUNDED_PROJECT_FIELDS: &[&str] = &[
    "financialYear",
    "applicationNumber",
    "agency",
    "scheme",
    "piName",
    "piDept",
    "piContact",
    "piEmail",
    "copiName",
    "copiDept",
    "copiContact",
    "copiEmail",
    "duration",
    "title",
    "status",
    "startDate",
    "objectives",
    "outcomes",
    "amountApplied",
    "amountReceived",
    "amountSanctioned",
];

/// Patent stages that put a patent in the coordinator's queue.
const PATENT_PENDING_STAGES: &[&str] = &["filed", "granted", "published"];

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Patent,
        RecordKind::Publication,
        RecordKind::SeedMoney,
        RecordKind::FundedProject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Patent => "patent",
            RecordKind::Publication => "publication",
            RecordKind::SeedMoney => "seed_money",
            RecordKind::FundedProject => "funded_project",
        }
    }

    /// Human-readable name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Patent => "Patent",
            RecordKind::Publication => "Publication",
            RecordKind::SeedMoney => "SeedMoney record",
            RecordKind::FundedProject => "Funded project",
        }
    }

    /// Key under which the generated id is echoed in record JSON.
    pub fn id_field(&self) -> &'static str {
        match self {
            RecordKind::Patent => "patentId",
            RecordKind::Publication => "publicationId",
            RecordKind::SeedMoney => "seedMoneyId",
            RecordKind::FundedProject => "projectId",
        }
    }

    /// Directory under the upload root that holds this kind's files.
    pub fn upload_dir(&self) -> &'static str {
        match self {
            RecordKind::Patent => "patents",
            RecordKind::Publication => "publications",
            RecordKind::SeedMoney => "seedMoney",
            RecordKind::FundedProject => "fundedProjects",
        }
    }

    pub fn file_slot(&self) -> Option<FileSlot> {
        match self {
            RecordKind::Patent => Some(FileSlot { field: "proofOfPatent", max_files: 1, required: true }),
            RecordKind::Publication => Some(FileSlot { field: "proofOfPublication", max_files: 1, required: false }),
            RecordKind::SeedMoney => Some(FileSlot { field: "proof", max_files: 5, required: true }),
            RecordKind::FundedProject => None,
        }
    }

    /// Payload keys accepted for this kind. Anything else is dropped,
    /// including `department`, which always comes from the owner's profile.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Patent => PATENT_FIELDS,
            RecordKind::Publication => PUBLICATION_FIELDS,
            RecordKind::SeedMoney => SEED_MONEY_FIELDS,
            RecordKind::FundedProject => FUNDED_PROJECT_FIELDS,
        }
    }

    /// Payload keys that must be present and non-blank on create
    /// (the owner id is always required on top of these).
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            RecordKind::FundedProject => &["title", "agency", "startDate", "status"],
            _ => &[],
        }
    }

    /// Payload keys whose multipart value is a JSON document.
    pub fn json_fields(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Patent => &["inventors"],
            _ => &[],
        }
    }

    /// Values filled in on create when the submitter leaves a key out.
    pub fn defaults(&self) -> Vec<(&'static str, Value)> {
        match self {
            RecordKind::Patent => vec![
                ("numOfInventors", Value::from(0)),
                ("dateOfPublished", Value::Null),
                ("dateOfGranted", Value::Null),
            ],
            RecordKind::FundedProject => [
                "copiName",
                "copiDept",
                "copiContact",
                "copiEmail",
                "objectives",
                "outcomes",
                "amountApplied",
                "amountReceived",
                "amountSanctioned",
            ]
            .into_iter()
            .map(|k| (k, Value::Null))
            .collect(),
            _ => Vec::new(),
        }
    }

    /// Extra constraint on the payload `status` stage for the review queue.
    pub fn pending_stages(&self) -> Option<&'static [&'static str]> {
        match self {
            RecordKind::Patent => Some(PATENT_PENDING_STAGES),
            _ => None,
        }
    }

    /// Display text for a review status. Publications historically used a
    /// different spelling of the coordinator title.
    pub fn status_label(&self, status: ReviewStatus) -> &'static str {
        match (self, status) {
            (_, ReviewStatus::Applied) => "Applied",
            (RecordKind::Publication, ReviewStatus::Approved) => "Approved by department RandD Coordinator",
            (RecordKind::Publication, ReviewStatus::Rejected) => "Rejected by department RandD Coordinator",
            (_, ReviewStatus::Approved) => "Approved by Department R&D Coordinator",
            (_, ReviewStatus::Rejected) => "Rejected by Department R&D Coordinator",
        }
    }

    pub fn routes(&self) -> KindRoutes {
        match self {
            RecordKind::Patent => KindRoutes {
                create: "/addPatent",
                list: "/getPatents/{owner}",
                update: "/update-patent/{id}",
                review: "/getAllPatents",
                approve: "/approvePatent/{id}",
                reject: "/rejectPatent/{id}",
            },
            RecordKind::Publication => KindRoutes {
                create: "/addPublication",
                list: "/getPublications/{owner}",
                update: "/update-publication/{id}",
                review: "/getPublicationsByDepartment",
                approve: "/approvePublication/{id}",
                reject: "/rejectPublication/{id}",
            },
            RecordKind::SeedMoney => KindRoutes {
                create: "/addSeedMoney",
                list: "/getSeedMoney/{owner}",
                update: "/update-seedMoney/{id}",
                review: "/getSeedMoneyByDepartment",
                approve: "/approveSeedMoney/{id}",
                reject: "/rejectSeedMoney/{id}",
            },
            RecordKind::FundedProject => KindRoutes {
                create: "/addFundedProject",
                list: "/getFundedProjects/{owner}",
                update: "/updateFundedProject/{id}",
                review: "/getFundedProjectsByDepartment",
                approve: "/approveFundedProject/{id}",
                reject: "/rejectFundedProject/{id}",
            },
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown record kind '{s}'"))
    }
}
