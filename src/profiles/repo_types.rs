use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_NAME: &str = "Your Name";
pub const DEFAULT_AGE: i32 = 18;
pub const DEFAULT_BIOGRAPHY: &str = "This user hasn't added a bio yet.";
pub const DEFAULT_LINK: &str = "This user hasn't added a Photo yet.";

/// Per-user presentation data. One per user by convention only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub biography: String,
    pub link: String, // avatar URL or the placeholder text
}

impl Profile {
    pub fn with_defaults(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: DEFAULT_NAME.into(),
            age: DEFAULT_AGE,
            biography: DEFAULT_BIOGRAPHY.into(),
            link: DEFAULT_LINK.into(),
        }
    }
}
