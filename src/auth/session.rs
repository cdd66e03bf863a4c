use actix_session::Session;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const ACCOUNT_KEY: &str = "account_id";
const ROLE_KEY: &str = "role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Faculty,
    Coordinator,
}

/// The account bound to the current session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAccount {
    pub id: String,
    pub role: Role,
}

/// Start a fresh session for a freshly authenticated account.
pub fn sign_in(session: &Session, id: &str, role: Role) -> Result<(), AppError> {
    session.renew();
    session.insert(ACCOUNT_KEY, id)?;
    session.insert(ROLE_KEY, role)?;
    Ok(())
}

pub fn current_account(session: &Session) -> Result<Option<SessionAccount>, AppError> {
    let id = session.get::<String>(ACCOUNT_KEY)?;
    let role = session.get::<Role>(ROLE_KEY)?;
    Ok(match (id, role) {
        (Some(id), Some(role)) => Some(SessionAccount { id, role }),
        _ => None,
    })
}

pub fn require_account(session: &Session) -> Result<SessionAccount, AppError> {
    current_account(session)?.ok_or_else(|| AppError::Unauthorized("Login required".to_string()))
}

/// The logged-in faculty id; coordinators are refused.
pub fn require_faculty(session: &Session) -> Result<String, AppError> {
    let account = require_account(session)?;
    match account.role {
        Role::Faculty => Ok(account.id),
        Role::Coordinator => Err(AppError::PermissionDenied(
            "Faculty login required".to_string(),
        )),
    }
}

/// The logged-in coordinator id; faculty are refused.
pub fn require_coordinator(session: &Session) -> Result<String, AppError> {
    let account = require_account(session)?;
    match account.role {
        Role::Coordinator => Ok(account.id),
        Role::Faculty => Err(AppError::PermissionDenied(
            "Coordinator login required".to_string(),
        )),
    }
}

/// Owner-scoped calls may only touch the session faculty's own records.
pub fn require_owner(session: &Session, owner_id: &str) -> Result<String, AppError> {
    let faculty_id = require_faculty(session)?;
    if faculty_id == owner_id {
        Ok(faculty_id)
    } else {
        Err(AppError::PermissionDenied(
            "Records belong to another faculty member".to_string(),
        ))
    }
}
