pub mod kind;
pub mod status;
pub mod submission;
pub mod types;

pub use kind::{FileSlot, KindRoutes, RecordKind};
pub use status::ReviewStatus;
pub use submission::Submission;
pub use types::{NewRecord, Record, RecordPatch, file_url};
