use serde::{Deserialize, Serialize};

/// Body of `PUT /update-profile`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub biography: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub image_url: String,
}
