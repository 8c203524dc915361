use serde::Serialize;
use uuid::Uuid;

/// Caller's own record as returned by `GET /user`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub name: String,
    pub is_admin: bool,
}
