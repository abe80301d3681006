use serde::{Deserialize, Serialize};
use chrono::Utc;

pub const NEW_REQUEST: &str = "newRequest";
pub const NEW_MATCH: &str = "newMatch";
pub const NEW_BUDDY: &str = "newBuddy";

pub const CODES: [&str; 3] = [NEW_REQUEST, NEW_MATCH, NEW_BUDDY];

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPref {
    pub id: i64,
    pub user_id: i64,
    pub code: String,
    pub email: bool,
    pub sms: bool,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
pub struct NotificationSetting {
    pub code: String,
    pub email: bool,
    pub sms: bool,
}
