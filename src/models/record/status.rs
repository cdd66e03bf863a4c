use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// Review lifecycle of a record. Every record starts `Applied`; only a
/// coordinator moves it to `Approved` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Applied,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Applied => "applied",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    /// States a record may be in for a coordinator to move it to `to`.
    /// Repeating the decision already taken is allowed (approve is
    /// idempotent, re-reject replaces the reason); flipping a decided record
    /// or returning it to `Applied` is not.
    pub fn sources(to: ReviewStatus) -> &'static [ReviewStatus] {
        match to {
            ReviewStatus::Applied => &[],
            ReviewStatus::Approved => &[ReviewStatus::Applied, ReviewStatus::Approved],
            ReviewStatus::Rejected => &[ReviewStatus::Applied, ReviewStatus::Rejected],
        }
    }

    /// Validate a coordinator decision against [`ReviewStatus::sources`].
    pub fn transition(self, to: ReviewStatus) -> Result<ReviewStatus, AppError> {
        if Self::sources(to).contains(&self) {
            Ok(to)
        } else {
            Err(AppError::InvalidTransition { from: self, to })
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ReviewStatus::Applied),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(format!("unknown review status '{other}'")),
        }
    }
}
