use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct Coordinator {
    pub coordinator_id: String,
    pub department: String,
    pub password_hash: String,
}

/// Body of `POST /coordinatorlogin`.
#[derive(Debug, Deserialize)]
pub struct CoordinatorLoginRequest {
    #[serde(default)]
    pub coordinatorid: String,
    #[serde(default, alias = "password1")]
    pub password: String,
    #[serde(default)]
    pub department: String,
}

/// One entry of the coordinator seed file. The password is hashed before
/// it reaches the store.
#[derive(Debug, Deserialize)]
pub struct CoordinatorSeed {
    pub coordinator_id: String,
    pub department: String,
    pub password: String,
}
